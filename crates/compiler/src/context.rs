//! The per-compile threaded state (`spec.md` §3 Invariants, §9 "Global
//! state per compile"). Everything the Node Compiler touches while
//! walking one template lives here, explicitly, rather than as
//! module-level globals.

use crate::error::{CompileError, Result};
use crate::translation::{BlueprintFragment, TranslateOpen, TranslationScope};

/// One opened control-flow block, staged by the Attribute Compiler and
/// closed by the Node Compiler in LIFO order.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    If(String),
    ElseIf(String),
    Else,
    ForCounted { item: String, count_expr: String },
    ForKeyValue { item: String, index: String, items_expr: String },
    ForValue { item: String, items_expr: String },
}

impl ControlFlow {
    pub fn is_if_chain_member(&self) -> bool {
        matches!(self, ControlFlow::If(_) | ControlFlow::ElseIf(_) | ControlFlow::Else)
    }

    /// The PHP block this entry opens with, after running `rewrite` over
    /// any embedded condition/iterable expressions.
    pub fn open_fragment(&self, rewrite: impl Fn(&str) -> String) -> String {
        match self {
            ControlFlow::If(cond) => format!("<?php if({}): ?>", rewrite(cond)),
            ControlFlow::ElseIf(cond) => format!("<?php elseif({}): ?>", rewrite(cond)),
            ControlFlow::Else => "<?php else: ?>".to_string(),
            ControlFlow::ForCounted { item, count_expr } => format!(
                "<?php for({item} = 0; {item} < {}; {item}++): ?>",
                rewrite(count_expr)
            ),
            ControlFlow::ForKeyValue { item, index, items_expr } => {
                format!("<?php foreach({} as {index} => {item}): ?>", rewrite(items_expr))
            }
            ControlFlow::ForValue { item, items_expr } => {
                format!("<?php foreach({} as {item}): ?>", rewrite(items_expr))
            }
        }
    }

    /// The always-emitted closer for loop forms; `None` for if-chain
    /// members, whose `endif` is conditionally suppressed by the Node
    /// Compiler based on the next sibling (see `spec.md` §4.5 step 10).
    pub fn close_fragment(&self) -> Option<&'static str> {
        match self {
            ControlFlow::If(_) | ControlFlow::ElseIf(_) | ControlFlow::Else => None,
            ControlFlow::ForCounted { .. } => Some("<?php endfor; ?>"),
            ControlFlow::ForKeyValue { .. } | ControlFlow::ForValue { .. } => {
                Some("<?php endforeach; ?>")
            }
        }
    }
}

#[derive(Debug)]
pub struct SkipScope {
    pub owner: usize,
}

/// The explicit, threaded per-compile state: emission buffer, directive
/// scope stack, and the (mutually exclusive-ish) translation/skip
/// scopes. A partial include starts a fresh `CompileContext`, sharing
/// only the translate-table/cache-directory handles of its parent
/// (modeled here as `shared`), per `spec.md` §5.
pub struct CompileContext {
    buffer: String,
    directive_stack: Vec<ControlFlow>,
    translation: Option<TranslationScope>,
    skip: Option<SkipScope>,
}

impl CompileContext {
    pub fn new() -> Self {
        CompileContext {
            buffer: String::new(),
            directive_stack: Vec::new(),
            translation: None,
            skip: None,
        }
    }

    /// A fresh context for a partial include, inheriting the parent's
    /// current skip root (a partial rendered inside `s-skip` is itself
    /// literal text) but starting with empty directive/translation
    /// state, per `spec.md` §5.
    pub fn child_for_partial(&self) -> Self {
        let mut child = CompileContext::new();
        if let Some(skip) = &self.skip {
            child.skip = Some(SkipScope { owner: skip.owner });
        }
        child
    }

    pub fn finish(self) -> String {
        debug_assert!(self.directive_stack.is_empty());
        self.buffer
    }

    // --- emission -------------------------------------------------

    /// Appends `s` to the currently active destination: the translation
    /// buffer if a translation scope is open, otherwise the main
    /// emission buffer.
    pub fn emit(&mut self, s: &str) {
        if let Some(scope) = &mut self.translation {
            scope.buffer.push(BlueprintFragment::Literal(s.to_string()));
        } else {
            self.buffer.push_str(s);
        }
    }

    pub fn emit_expr_value(&mut self, rendered_value_expr: &str) {
        if let Some(scope) = &mut self.translation {
            scope.buffer.push(BlueprintFragment::Expr(rendered_value_expr.to_string()));
        } else {
            self.buffer.push_str(rendered_value_expr);
        }
    }

    /// Appends `s` directly to the main output, bypassing translation
    /// redirection. Used for the owning node's own open/close tags,
    /// which are emitted to normal output even while buffering its
    /// children (`spec.md` §4.4).
    pub fn emit_direct(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    // --- directive scope stack -------------------------------------

    pub fn push_control_flow(&mut self, cf: ControlFlow) {
        self.directive_stack.push(cf);
    }

    pub fn pop_control_flow(&mut self) -> Option<ControlFlow> {
        self.directive_stack.pop()
    }

    pub fn open_directive_count(&self) -> usize {
        self.directive_stack.len()
    }

    // --- translation scope -------------------------------------------

    pub fn in_translation_scope(&self) -> bool {
        self.translation.is_some()
    }

    pub fn open_translation(&mut self, owner: usize, open: TranslateOpen, owner_tag: &str, inner_tag: &str) -> Result<()> {
        if self.translation.is_some() {
            return Err(CompileError::NestedTranslation {
                outer_tag: owner_tag.to_string(),
                inner_tag: inner_tag.to_string(),
            });
        }
        self.translation = Some(TranslationScope::new(owner, open));
        Ok(())
    }

    pub fn translation_owner(&self) -> Option<usize> {
        self.translation.as_ref().map(|s| s.owner)
    }

    pub fn is_translation_owner(&self, idx: usize) -> bool {
        matches!(&self.translation, Some(scope) if scope.owner == idx)
    }

    /// Closes the currently open translation scope and returns it for
    /// rendering. Panics if called when no scope is open; callers must
    /// check `is_translation_owner` first.
    pub fn close_translation(&mut self) -> TranslationScope {
        self.translation.take().expect("no open translation scope")
    }

    // --- skip scope --------------------------------------------------

    pub fn skip_active(&self) -> bool {
        self.skip.is_some()
    }

    pub fn open_skip(&mut self, owner: usize) {
        self.skip = Some(SkipScope { owner });
    }

    pub fn is_skip_owner(&self, idx: usize) -> bool {
        matches!(&self.skip, Some(s) if s.owner == idx)
    }

    pub fn close_skip(&mut self) {
        self.skip = None;
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}
