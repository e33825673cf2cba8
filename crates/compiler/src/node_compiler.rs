//! Node Compiler (`spec.md` §4.5). Drives the whole pipeline: walks the
//! AST depth-first, consults the Attribute Compiler, opens/closes
//! control-flow blocks, and hands off to the Translation Weaver and
//! skip-scope handling.

use crate::ast::{Arena, NodeKind};
use crate::attributes::{compile_attributes, CompiledAttribute};
use crate::config::CompilerConfig;
use crate::context::CompileContext;
use crate::error::Result;
use crate::expression_rewriter::rewrite;
use crate::interpolation::scan;

const TRANSPARENT_TAG: &str = "s-tag";

/// Compiles one already-parsed tree into PHP-flavored template source,
/// using a fresh `CompileContext`.
pub fn compile_tree(arena: &Arena, config: &CompilerConfig) -> Result<String> {
    let mut ctx = CompileContext::new();
    for &root in arena.roots() {
        compile_node(arena, root, &mut ctx, config)?;
    }
    Ok(ctx.finish())
}

/// Compiles one root node into an already-live `CompileContext`. Used by
/// `compiler::compile_partial_tree` to weave a partial's nodes into a
/// freshly-scoped child context (`spec.md` §5), as opposed to
/// `compile_tree`'s own top-level, self-contained context.
pub fn compile_root_for(arena: &Arena, idx: usize, ctx: &mut CompileContext, config: &CompilerConfig) -> Result<()> {
    compile_node(arena, idx, ctx, config)
}

fn compile_node(arena: &Arena, idx: usize, ctx: &mut CompileContext, config: &CompilerConfig) -> Result<()> {
    match arena.get(idx) {
        NodeKind::Element(_) => compile_element(arena, idx, ctx, config),
        NodeKind::Text(text) => {
            compile_text(text, ctx, config);
            Ok(())
        }
        NodeKind::Comment(comment) => {
            if ctx.skip_active() || (!config.skip_comments && !comment.suppress) {
                ctx.emit(&comment.value);
            }
            Ok(())
        }
    }
}

fn compile_text(text: &str, ctx: &mut CompileContext, config: &CompilerConfig) {
    if ctx.skip_active() {
        ctx.emit(text);
        return;
    }
    let spans = scan(text, config.interpolation_open_close_must_match);
    if spans.is_empty() {
        ctx.emit(text);
        return;
    }

    let mut cursor = 0usize;
    let mut pieces: Vec<(String, bool)> = Vec::new(); // (literal-or-expr, is_expr)
    for span in &spans {
        if span.begin > cursor {
            pieces.push((text[cursor..span.begin].to_string(), false));
        }
        let rewritten = rewrite(&span.content);
        let value_expr = if span.escape {
            format!("htmlentities((string) ({rewritten}), ENT_QUOTES, 'UTF-8')")
        } else {
            format!("({rewritten})")
        };
        // Inside a translation scope the buffered fragment is a bare PHP
        // value expression that `TranslationScope::render_blueprint`
        // parenthesizes and concatenates itself (`spec.md` §4.4); outside
        // one it is a full `<?php echo ...; ?>` statement emitted as-is.
        let rendered = if ctx.in_translation_scope() {
            value_expr
        } else {
            format!("<?php echo {value_expr}; ?>")
        };
        pieces.push((rendered, true));
        cursor = span.end;
    }
    if cursor < text.len() {
        pieces.push((text[cursor..].to_string(), false));
    }

    for (piece, is_expr) in pieces {
        if is_expr {
            ctx.emit_expr_value(&piece);
        } else {
            ctx.emit(&piece);
        }
    }
}

fn compile_element(arena: &Arena, idx: usize, ctx: &mut CompileContext, config: &CompilerConfig) -> Result<()> {
    let element = arena.get(idx).as_element().expect("compile_element on non-element");

    // Step 1: skip-scope pass-through for non-root descendants.
    if ctx.skip_active() && !ctx.is_skip_owner(idx) {
        ctx.emit(&element.raw);
        return Ok(());
    }

    // Step 2/3: classify attributes, stage control-flow.
    let open_owner_tag = ctx
        .translation_owner()
        .and_then(|owner| arena.get(owner).as_element())
        .map(|e| e.tag.name.as_str());
    let attrs = compile_attributes(&element.tag.name, &element.attrs, open_owner_tag)?;

    let opened_here = attrs.control_flow.len();
    for cf in attrs.control_flow {
        ctx.emit(&cf.open_fragment(rewrite));
        ctx.push_control_flow(cf);
    }

    if attrs.skip {
        ctx.open_skip(idx);
    }
    if let Some(open) = attrs.translate_open {
        // `compile_attributes` already rejected the nested case above
        // using the same `open_owner_tag`; this can only succeed here.
        ctx.open_translation(idx, open, open_owner_tag.unwrap_or(""), &element.tag.name)?;
    }

    let is_transparent = element.tag.name == TRANSPARENT_TAG;
    let is_translation_root = ctx.is_translation_owner(idx);

    // Step 4: open tag.
    if !is_transparent {
        let mut open_tag = format!("<{}", element.tag.name);
        for attr in &attrs.emitted {
            open_tag.push_str(&attr.render());
        }
        open_tag.push_str(if element.tag.is_self_closing { "/>" } else { ">" });
        if is_translation_root {
            ctx.emit_direct(&open_tag);
        } else {
            ctx.emit(&open_tag);
        }
    }

    // Step 5: partial include.
    if let Some(partial) = &attrs.partial {
        ctx.emit(&format!("<?php echo $this->includePartial({}); ?>", partial.path_expr));
    }

    // Step 6: recurse into children.
    for &child in &element.children {
        compile_node(arena, child, ctx, config)?;
    }

    // Step 7: close translation scope if this node owns it.
    if is_translation_root {
        let scope = ctx.close_translation();
        ctx.emit_direct(&scope.render_call(rewrite));
    }

    // Step 8: close tag.
    if element.tag.should_have_closing_tag && !is_transparent {
        let close_tag = format!("</{}>", element.tag.name);
        if is_translation_root {
            ctx.emit_direct(&close_tag);
        } else {
            ctx.emit(&close_tag);
        }
    }

    // Step 9: clear skip scope if this node owns it.
    if ctx.is_skip_owner(idx) {
        ctx.close_skip();
    }

    // Step 10: pop and close the control-flow entries opened in step 3,
    // in LIFO order (innermost wrapper closes first).
    let mut popped = Vec::with_capacity(opened_here);
    for _ in 0..opened_here {
        popped.push(ctx.pop_control_flow().expect("directive stack underflow"));
    }

    let next_sibling_starts_chain = arena
        .next_sibling(idx)
        .and_then(|sib| arena.get(sib).as_element())
        .map(|e| {
            e.attrs
                .iter()
                .any(|a| matches!(a.key.as_str(), "s-elseif" | "s-else") && a.r#type.is_none())
        })
        .unwrap_or(false);

    for cf in popped {
        if let Some(closer) = cf.close_fragment() {
            ctx.emit(closer);
        } else if cf.is_if_chain_member() && !next_sibling_starts_chain {
            ctx.emit("<?php endif; ?>");
        }
    }

    Ok(())
}
