//! The known-boolean and two-form attribute tables consulted by the
//! Attribute Compiler's `s-bind:<attr>` rules. Grounded in the same
//! shape as a DOM element schema registry: a small static table keyed
//! by attribute name, looked up once per `s-bind` classification rather
//! than recomputed.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Attributes with a single canonical boolean form: present or absent,
/// e.g. `disabled`.
static SINGLE_FORM: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "async", "autofocus", "autoplay", "checked", "compact", "controls",
        "default", "defer", "disabled", "hidden", "indeterminate", "ismap",
        "loop", "multiple", "muted", "nohref", "noshade", "novalidate",
        "nowrap", "open", "readonly", "required", "reversed", "scoped",
        "seamless", "selected", "sortable", "formnovalidate", "noresize",
    ]
    .into_iter()
    .collect()
});

/// Attributes that take one of two literal string forms depending on a
/// boolean expression, e.g. `autocomplete="on|off"`.
static TWO_FORM: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    [
        ("autocomplete", ("on", "off")),
        ("border", ("1", "0")),
        ("contenteditable", ("true", "false")),
        ("frameborder", ("1", "0")),
        ("spellcheck", ("true", "false")),
        ("translate", ("yes", "no")),
    ]
    .into_iter()
    .collect()
});

pub fn is_single_form_boolean(attr: &str) -> bool {
    SINGLE_FORM.contains(attr.to_ascii_lowercase().as_str())
}

/// Returns `(enabled_value, disabled_value)` for a two-form boolean
/// attribute, if `attr` is one.
pub fn two_form_values(attr: &str) -> Option<(&'static str, &'static str)> {
    TWO_FORM.get(attr.to_ascii_lowercase().as_str()).copied()
}
