//! Static tables the Expression Rewriter and Attribute Compiler consult:
//! host-builtin callables that must never be rewritten, and the
//! boolean/two-form HTML attributes `s-bind` treats specially.

pub mod boolean_attributes;
pub mod host_builtins;
