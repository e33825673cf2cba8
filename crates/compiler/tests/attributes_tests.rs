//! Attribute Compiler tests (`spec.md` §4.3, §8).

use pretty_assertions::assert_eq;
use s_template_compiler::ast::{Enclosure, RawAttribute};
use s_template_compiler::attributes::{compile_attributes, CompiledAttribute};
use s_template_compiler::context::ControlFlow;

fn render_all(attrs: &[CompiledAttribute]) -> String {
    attrs.iter().map(|a| a.render()).collect()
}

#[test]
fn plain_attribute_passes_through_verbatim() {
    let attrs = vec![RawAttribute::plain("id", "main", Enclosure::Double)];
    let result = compile_attributes("div", &attrs, None).unwrap();
    assert_eq!(render_all(&result.emitted), " id=\"main\"");
    assert!(result.control_flow.is_empty());
}

#[test]
fn s_bind_single_form_boolean_emits_a_conditional_echo() {
    let attrs = vec![RawAttribute::directive("s-bind", Some("disabled"), "$isDisabled", Enclosure::Double)];
    let result = compile_attributes("input", &attrs, None).unwrap();
    assert_eq!(render_all(&result.emitted), " <?php if($isDisabled) echo \" disabled\"; ?>");
}

#[test]
fn s_bind_two_form_boolean_emits_a_ternary() {
    let attrs = vec![RawAttribute::directive("s-bind", Some("spellcheck"), "$flag", Enclosure::Double)];
    let result = compile_attributes("input", &attrs, None).unwrap();
    assert_eq!(
        render_all(&result.emitted),
        " spellcheck=\"<?php echo ($flag) ? 'true' : 'false'; ?>\""
    );
}

#[test]
fn s_bind_class_merges_with_plain_class_and_suppresses_nothing_else() {
    let attrs = vec![
        RawAttribute::plain("class", "static", Enclosure::Double),
        RawAttribute::directive("s-bind", Some("class"), "['active' => true, 'hidden' => false]", Enclosure::Double),
    ];
    let result = compile_attributes("div", &attrs, None).unwrap();
    let rendered = render_all(&result.emitted);
    // Exactly one `class=` attribute is emitted (no duplicate plain one).
    assert_eq!(rendered.matches("class=").count(), 1);
    assert!(rendered.contains("mergeTokens(['static']"));
}

#[test]
fn s_bind_style_uses_semicolon_delimiter() {
    let attrs = vec![RawAttribute::directive("s-bind", Some("style"), "['color:red' => true]", Enclosure::Double)];
    let result = compile_attributes("div", &attrs, None).unwrap();
    assert!(render_all(&result.emitted).contains("'; '"));
}

#[test]
fn s_bind_without_a_type_is_a_missing_bind_type_error() {
    let attrs = vec![RawAttribute::directive("s-bind", None, "$x", Enclosure::Double)];
    let err = compile_attributes("div", &attrs, None).unwrap_err();
    assert!(err.to_string().contains("s-bind"));
}

#[test]
fn a_bound_attribute_suppresses_its_plain_counterpart() {
    let attrs = vec![
        RawAttribute::plain("title", "literal", Enclosure::Double),
        RawAttribute::directive("s-bind", Some("title"), "$dynamic", Enclosure::Double),
    ];
    let result = compile_attributes("div", &attrs, None).unwrap();
    let rendered = render_all(&result.emitted);
    assert_eq!(rendered.matches("title=").count(), 1);
    assert!(rendered.contains("htmlentities"));
}

#[test]
fn s_bind_default_rule_escapes_the_rendered_value() {
    let attrs = vec![RawAttribute::directive("s-bind", Some("data-x"), "$v", Enclosure::Single)];
    let result = compile_attributes("div", &attrs, None).unwrap();
    assert!(render_all(&result.emitted).contains("htmlentities((string) ($v), ENT_QUOTES, 'UTF-8')"));
}

#[test]
fn s_for_numeric_literal_stages_a_counted_loop() {
    let attrs = vec![RawAttribute::plain("s-for", "$i in 10", Enclosure::Double)];
    let result = compile_attributes("li", &attrs, None).unwrap();
    assert_eq!(result.control_flow.len(), 1);
    assert!(matches!(result.control_flow[0], ControlFlow::ForCounted { .. }));
}

#[test]
fn s_for_with_index_stages_a_key_value_loop() {
    let attrs = vec![RawAttribute::plain("s-for", "($item, $index) in $items", Enclosure::Double)];
    let result = compile_attributes("li", &attrs, None).unwrap();
    assert_eq!(result.control_flow.len(), 1);
    assert!(matches!(result.control_flow[0], ControlFlow::ForKeyValue { .. }));
}

#[test]
fn s_for_value_only_stages_a_value_loop() {
    let attrs = vec![RawAttribute::plain("s-for", "$item in $items", Enclosure::Double)];
    let result = compile_attributes("li", &attrs, None).unwrap();
    assert!(matches!(result.control_flow[0], ControlFlow::ForValue { .. }));
}

#[test]
fn control_flow_directives_are_reordered_regardless_of_source_order() {
    // `s-for` written before `s-if` in source still sorts after it.
    let attrs = vec![
        RawAttribute::plain("s-for", "$item in $items", Enclosure::Double),
        RawAttribute::plain("s-if", "$cond", Enclosure::Double),
    ];
    let result = compile_attributes("li", &attrs, None).unwrap();
    assert!(matches!(result.control_flow[0], ControlFlow::If(_)));
    assert!(matches!(result.control_flow[1], ControlFlow::ForValue { .. }));
}

#[test]
fn s_skip_opens_a_skip_scope_and_is_not_emitted() {
    let attrs = vec![RawAttribute::plain("s-skip", "", Enclosure::Double)];
    let result = compile_attributes("div", &attrs, None).unwrap();
    assert!(result.skip);
    assert!(result.emitted.is_empty());
}

#[test]
fn s_partial_plain_stages_a_partial_include_and_is_not_emitted() {
    let attrs = vec![RawAttribute::plain("s-partial", "partials/nav.sft", Enclosure::Double)];
    let result = compile_attributes("div", &attrs, None).unwrap();
    assert!(result.partial.is_some());
    assert!(result.emitted.is_empty());
}

#[test]
fn s_translate_opens_a_translation_scope_and_is_not_emitted() {
    let attrs = vec![RawAttribute::plain("s-translate", "['name' => $n]", Enclosure::Double)];
    let result = compile_attributes("p", &attrs, None).unwrap();
    assert!(result.translate_open.is_some());
    assert!(result.emitted.is_empty());
}

#[test]
fn s_translate_with_a_key_carries_the_key_through() {
    let attrs = vec![RawAttribute::directive("s-translate", Some("foo.bar"), "['name' => $n]", Enclosure::Double)];
    let result = compile_attributes("p", &attrs, None).unwrap();
    assert_eq!(result.translate_open.unwrap().key.as_deref(), Some("foo.bar"));
}

#[test]
fn opening_a_translation_scope_while_one_is_already_open_is_rejected() {
    let attrs = vec![RawAttribute::plain("s-translate", "[]", Enclosure::Double)];
    let err = compile_attributes("span", &attrs, Some("div")).unwrap_err();
    assert!(err.to_string().contains("nested"));
}
