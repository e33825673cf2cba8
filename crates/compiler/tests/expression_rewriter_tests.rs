//! Expression Rewriter tests (`spec.md` §4.1, §8).

use pretty_assertions::assert_eq;
use s_template_compiler::expression_rewriter::{rewrite, DISPATCH_PREFIX};

#[test]
fn rewrites_a_bare_call_at_the_start_of_an_expression() {
    assert_eq!(rewrite("foo(5, 2) + 1"), format!("{DISPATCH_PREFIX}foo(5, 2) + 1"));
}

#[test]
fn leaves_a_method_call_untouched() {
    assert_eq!(rewrite("bar->baz(1)"), "bar->baz(1)");
}

#[test]
fn rewrites_a_call_preceded_by_the_html_comment_close_token() {
    assert_eq!(rewrite("x-->foo(1)"), format!("x-->{DISPATCH_PREFIX}foo(1)"));
}

#[test]
fn leaves_a_namespaced_call_untouched() {
    assert_eq!(rewrite(r"\App\Helpers\baz(1)"), r"\App\Helpers\baz(1)");
}

#[test]
fn rewrites_calls_after_arithmetic_and_logical_operators() {
    assert_eq!(rewrite("$a + foo(1)"), format!("$a + {DISPATCH_PREFIX}foo(1)"));
    assert_eq!(rewrite("$a && bar(1)"), format!("$a && {DISPATCH_PREFIX}bar(1)"));
    assert_eq!(rewrite("$a and baz(1)"), format!("$a and {DISPATCH_PREFIX}baz(1)"));
    assert_eq!(rewrite("$a ?? qux(1)"), format!("$a ?? {DISPATCH_PREFIX}qux(1)"));
}

#[test]
fn rewrites_calls_after_ternary_and_colon_tokens() {
    assert_eq!(rewrite("$a ? foo(1) : bar(2)"), format!("$a ? {DISPATCH_PREFIX}foo(1) : {DISPATCH_PREFIX}bar(2)"));
}

#[test]
fn leaves_host_builtin_callables_untouched() {
    assert_eq!(rewrite("is_array($x)"), "is_array($x)");
    assert_eq!(rewrite("isset($x)"), "isset($x)");
    assert_eq!(rewrite("gettype($x)"), "gettype($x)");
    assert_eq!(rewrite("intval($x)"), "intval($x)");
}

#[test]
fn does_not_rewrite_calls_inside_string_literals() {
    assert_eq!(rewrite("'foo(1)'"), "'foo(1)'");
    assert_eq!(rewrite(r#""bar(2)""#), r#""bar(2)""#);
}

#[test]
fn rewrites_calls_that_follow_a_string_literal() {
    // The preceding token is `.` (string concat), which qualifies.
    assert_eq!(rewrite("'x' . foo(1)"), format!("'x' . {DISPATCH_PREFIX}foo(1)"));
}

#[test]
fn rewrites_multiple_calls_right_to_left_preserving_earlier_offsets() {
    let out = rewrite("foo(1) + bar(2)");
    assert_eq!(out, format!("{DISPATCH_PREFIX}foo(1) + {DISPATCH_PREFIX}bar(2)"));
}

#[test]
fn handles_nested_parentheses_in_arguments() {
    assert_eq!(rewrite("foo(bar(1), 2)"), format!("{DISPATCH_PREFIX}foo({DISPATCH_PREFIX}bar(1), 2)"));
}

#[test]
fn skips_a_call_whose_identifier_is_empty() {
    assert_eq!(rewrite("(1 + 2)"), "(1 + 2)");
}

#[test]
fn is_idempotent() {
    let once = rewrite("foo(1) + bar->baz(2)");
    let twice = rewrite(&once);
    assert_eq!(once, twice);
}

#[test]
fn never_fails_on_unbalanced_parentheses() {
    // Pure function; worst case is "no match found", never a panic.
    assert_eq!(rewrite("foo(1"), "foo(1");
}

#[test]
fn rewrites_inside_an_is_prefixed_but_not_actually_builtin_name() {
    // `is_` prefix family is builtin-by-prefix; a name that merely starts
    // with `is` but isn't `is_`-prefixed is not part of that family.
    assert_eq!(rewrite("island(1)"), format!("{DISPATCH_PREFIX}island(1)"));
}
