//! Names the Expression Rewriter must leave alone because they are
//! provided directly by the host runtime (`spec.md` GLOSSARY,
//! "Host-builtin callable").

use once_cell::sync::Lazy;
use std::collections::HashSet;

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // casts
        "boolval", "intval", "floatval", "strval",
        // reflection
        "get_defined_vars", "get_resource_type", "gettype",
        // inspection
        "var_dump", "var_export", "print_r", "debug_zval_dump",
        // state checks
        "isset", "empty", "unset", "settype",
        // (de)serialization
        "serialize", "unserialize",
    ]
    .into_iter()
    .collect()
});

/// `is_*` type predicates (`is_array`, `is_string`, `is_numeric`, ...)
/// are a prefix family rather than an enumerable list.
pub fn is_builtin(name: &str) -> bool {
    name.starts_with("is_") || BUILTINS.contains(name)
}
