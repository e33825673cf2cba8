//! Attribute Compiler (`spec.md` §4.3).
//!
//! Classifies a node's raw attribute list and produces the rewritten
//! per-attribute fragments plus the staged directive effects
//! (control-flow opens, skip/partial/translate) that the Node Compiler
//! applies around the element.
//!
//! Interpretation note on `s-translate`/`s-translate:<key>`: `spec.md`'s
//! classification table and its worked example (scenario 6, §8) read in
//! tension — the table's "emit `<attr>="..."` " phrasing would make
//! `s-translate:<key>` a plain attribute-translation helper, while
//! scenario 6 attaches `s-translate:foo.bar` directly to the blueprint
//! root shown in §4.4's prose. This implementation follows the worked
//! example and §4.4's prose as authoritative: both `s-translate` and
//! `s-translate:<key>` open a translation scope (key absent or present,
//! respectively); see DESIGN.md.

use crate::ast::{Enclosure, RawAttribute};
use crate::context::ControlFlow;
use crate::error::{CompileError, Result};
use crate::expression_rewriter::rewrite;
use crate::schema::boolean_attributes;
use crate::translation::TranslateOpen;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static FOR_WITH_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(\s*(\$[a-z0-9]+)\s*,\s*(\$*[a-z0-9]+)\s*\)\s+in\s+(.+)$").unwrap()
});
static FOR_VALUE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\$[a-z0-9]+)\s+in\s+(.+)$").unwrap());
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

/// A rewritten attribute fragment, ready for direct emission by the
/// Node Compiler.
#[derive(Debug, Clone)]
pub enum CompiledAttribute {
    Standard {
        name: String,
        enclosure: Enclosure,
        parsed: String,
    },
    /// A fully pre-rendered fragment (boolean-attribute conditionals,
    /// merged class/style, partial includes) emitted verbatim.
    Raw(String),
}

impl CompiledAttribute {
    pub fn render(&self) -> String {
        match self {
            CompiledAttribute::Standard { name, enclosure, parsed } => {
                format!(" {name}={enclosure}{parsed}{enclosure}")
            }
            CompiledAttribute::Raw(s) => format!(" {s}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PartialInclude {
    pub path_expr: String,
    pub is_dynamic: bool,
}

#[derive(Debug, Default)]
pub struct AttributeCompileResult {
    pub emitted: Vec<CompiledAttribute>,
    pub control_flow: Vec<ControlFlow>,
    pub skip: bool,
    pub partial: Option<PartialInclude>,
    pub translate_open: Option<TranslateOpen>,
}

fn control_flow_rank(cf: &ControlFlow) -> u8 {
    match cf {
        ControlFlow::If(_) => 0,
        ControlFlow::ElseIf(_) => 1,
        ControlFlow::Else => 2,
        ControlFlow::ForCounted { .. } | ControlFlow::ForKeyValue { .. } | ControlFlow::ForValue { .. } => 3,
    }
}

fn render_value_expr(rewritten_expr: &str, escape: bool) -> String {
    if escape {
        format!("htmlentities((string) ({rewritten_expr}), ENT_QUOTES, 'UTF-8')")
    } else {
        format!("({rewritten_expr})")
    }
}

fn parse_for_value(tag: &str, value: &str) -> Result<ControlFlow> {
    if let Some(caps) = FOR_WITH_INDEX.captures(value) {
        let item = caps[1].to_string();
        let index = caps[2].to_string();
        let items_expr = caps[3].trim().to_string();
        return Ok(ControlFlow::ForKeyValue { item, index, items_expr });
    }
    if let Some(caps) = FOR_VALUE_ONLY.captures(value) {
        let item = caps[1].to_string();
        let items_expr = caps[2].trim().to_string();
        if NUMERIC_LITERAL.is_match(&items_expr) {
            return Ok(ControlFlow::ForCounted { item, count_expr: items_expr });
        }
        return Ok(ControlFlow::ForValue { item, items_expr });
    }
    Err(CompileError::InvalidDirective {
        directive: "s-for".to_string(),
        tag: tag.to_string(),
        value: value.to_string(),
        reason: "expected `ITEM in ITEMS` or `(ITEM, INDEX) in ITEMS`".to_string(),
    })
}

/// Compiles the raw attribute list of one node. `open_translation_owner`
/// is `Some(owner_tag)` when a translation scope is already active
/// (mirroring the Attribute Compiler's documented `in-translation-scope`
/// boolean input, with the owning tag name carried along for error
/// reporting).
pub fn compile_attributes(
    tag: &str,
    attrs: &[RawAttribute],
    open_translation_owner: Option<&str>,
) -> Result<AttributeCompileResult> {
    let in_translation_scope = open_translation_owner.is_some();
    let mut result = AttributeCompileResult::default();

    // First pass: gather plain attrs (for class/style merge and the
    // co-existence suppression rule) and s-bind attrs by type.
    let mut plain_class: Option<&RawAttribute> = None;
    let mut plain_style: Option<&RawAttribute> = None;
    let mut bind_class: Option<&RawAttribute> = None;
    let mut bind_style: Option<&RawAttribute> = None;
    let mut suppressed_plain: HashSet<String> = HashSet::new();

    for attr in attrs {
        if attr.key == "s-bind" {
            let Some(t) = &attr.r#type else {
                return Err(CompileError::MissingBindType {
                    attr_name: attr.name.clone(),
                });
            };
            match t.as_str() {
                "class" => bind_class = Some(attr),
                "style" => bind_style = Some(attr),
                other => {
                    suppressed_plain.insert(other.to_ascii_lowercase());
                }
            }
        } else if attr.r#type.is_none() {
            match attr.key.to_ascii_lowercase().as_str() {
                "class" => plain_class = Some(attr),
                "style" => plain_style = Some(attr),
                _ => {}
            }
        }
    }

    // Second pass: classify every attribute, in source order, honoring
    // the directive ordering invariant (if < elseif < else < for <
    // everything else) by staging control-flow separately from the
    // `emitted` vector, which the Node Compiler places after control
    // flow regardless of source order.
    for attr in attrs {
        match (attr.key.as_str(), attr.r#type.as_deref()) {
            // Whether this actually succeeds in opening a scope (as
            // opposed to raising `NestedTranslation`) is decided by the
            // caller, which alone holds the real owning tag name of any
            // already-open scope; `in_translation_scope` only gates
            // whether we *stage* the open here at all.
            ("s-translate", None) if !in_translation_scope => {
                result.translate_open = Some(TranslateOpen {
                    key: None,
                    params_expr: attr.value.clone(),
                });
            }
            ("s-translate", Some(key)) if !in_translation_scope => {
                result.translate_open = Some(TranslateOpen {
                    key: Some(key.to_string()),
                    params_expr: attr.value.clone(),
                });
            }
            ("s-translate", _) => {
                return Err(CompileError::NestedTranslation {
                    outer_tag: open_translation_owner.unwrap_or_default().to_string(),
                    inner_tag: tag.to_string(),
                });
            }
            ("s-partial-var", _) => {
                // Reserved; never emitted, and carries no independent
                // effect here (the compiled effect lives on whichever
                // `s-bind:s-partial` produced it).
            }
            ("s-skip", None) => {
                result.skip = true;
            }
            ("s-partial", None) => {
                result.partial = Some(PartialInclude {
                    path_expr: format!("'{}'", attr.value.replace('\'', "\\'")),
                    is_dynamic: false,
                });
            }
            ("s-for", None) => {
                result.control_flow.push(parse_for_value(tag, &attr.value)?);
            }
            ("s-if", None) => result.control_flow.push(ControlFlow::If(attr.value.clone())),
            ("s-elseif", None) => result.control_flow.push(ControlFlow::ElseIf(attr.value.clone())),
            ("s-else", None) => result.control_flow.push(ControlFlow::Else),
            ("s-bind", Some(t)) => match t {
                "class" | "style" => {} // handled by the merge step below
                "s-partial" => {
                    result.partial = Some(PartialInclude {
                        path_expr: rewrite(&attr.value),
                        is_dynamic: true,
                    });
                }
                other => {
                    result.emitted.push(compile_bind(other, &attr.value, attr.enclosure)?);
                }
            },
            ("class", None) if bind_class.is_some() => {
                // Deferred to the merge step below.
            }
            ("style", None) if bind_style.is_some() => {
                // Deferred to the merge step below.
            }
            _ => {
                // Plain pass-through, unless suppressed by a co-existing
                // `s-bind:<same-name>` (class/style handled above).
                let lower = attr.key.to_ascii_lowercase();
                if attr.r#type.is_none() && suppressed_plain.contains(&lower) {
                    // suppressed: a bound attribute of the same name wins
                } else {
                    result.emitted.push(CompiledAttribute::Standard {
                        name: attr.name.clone(),
                        enclosure: attr.enclosure,
                        parsed: attr.value.clone(),
                    });
                }
            }
        }
    }

    // Enforced ordering invariant (`spec.md` §4.3): `s-if < s-elseif <
    // s-else < s-for`, regardless of source order, so control-flow
    // wrappers nest the same way no matter how the directives were
    // written on the tag.
    result.control_flow.sort_by_key(control_flow_rank);

    if bind_class.is_some() {
        let merged = merge_list(plain_class, bind_class, " ");
        result.emitted.push(CompiledAttribute::Raw(format!(
            "class=\"<?php echo {merged}; ?>\""
        )));
    }
    if bind_style.is_some() {
        let merged = merge_list(plain_style, bind_style, "; ");
        result.emitted.push(CompiledAttribute::Raw(format!(
            "style=\"<?php echo {merged}; ?>\""
        )));
    }

    Ok(result)
}

/// Builds the host call used to merge a plain `class`/`style` literal
/// with a bound array expression: joins truthy array entries (and any
/// plain literal token list) with `delimiter`, plain tokens first, then
/// bound truthy tokens, dropping empties and duplicates (`spec.md` §8
/// scenario 5).
fn merge_list(plain: Option<&RawAttribute>, bound: Option<&RawAttribute>, delimiter: &str) -> String {
    let plain_expr = plain
        .map(|a| format!("['{}']", a.value.split_whitespace().collect::<Vec<_>>().join("', '")))
        .unwrap_or_else(|| "[]".to_string());
    let bound_expr = bound.map(|a| rewrite(&a.value)).unwrap_or_else(|| "[]".to_string());
    format!("$this->mergeTokens({plain_expr}, {bound_expr}, '{delimiter}')")
}

fn compile_bind(attr: &str, value: &str, enclosure: Enclosure) -> Result<CompiledAttribute> {
    if boolean_attributes::is_single_form_boolean(attr) {
        let expr = rewrite(value);
        return Ok(CompiledAttribute::Raw(format!(
            "<?php if({expr}) echo \" {attr}\"; ?>"
        )));
    }
    if let Some((on, off)) = boolean_attributes::two_form_values(attr) {
        let expr = rewrite(value);
        return Ok(CompiledAttribute::Standard {
            name: attr.to_string(),
            enclosure,
            parsed: format!("<?php echo ({expr}) ? '{on}' : '{off}'; ?>"),
        });
    }
    let expr = rewrite(value);
    Ok(CompiledAttribute::Standard {
        name: attr.to_string(),
        enclosure,
        parsed: format!("<?php echo {}; ?>", render_value_expr(&expr, true)),
    })
}
