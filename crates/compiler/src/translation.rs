//! Translation Weaver (`spec.md` §4.4).
//!
//! Owns the shape of an open translation scope and how its buffered
//! children are rendered into the final `translate(...)` call emitted
//! at scope close. The open/close state machine itself (idle -> open ->
//! close) is driven by the Node Compiler through `CompileContext`,
//! since it has to interleave with the directive scope stack and skip
//! scope while walking the tree; this module is the part that is pure
//! data plus rendering.

/// One piece of a translation blueprint: either literal markup/text (to
/// be single-quoted) or an embedded value expression (concatenated in
/// as a PHP operand).
#[derive(Debug, Clone)]
pub enum BlueprintFragment {
    Literal(String),
    Expr(String),
}

/// Escapes `'` the way a string destined for a single-quoted PHP
/// literal must be, without double-escaping occurrences that are
/// already escaped.
pub fn escape_single_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(&next) = chars.peek() {
                    out.push(next);
                    chars.next();
                }
            }
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out
}

/// One parsed plural-range selector, as found in a translation string's
/// `{n,m}`-style plural branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralSelector {
    Exact(i64),
    Range { from: i64, to: i64 },
    AtLeast(i64),
    AtMost(i64),
}

/// Parses a plural-range selector of the form `from`, `from,to`,
/// `from,`, or `,to` and reports whether `n` matches it.
///
/// This is render-time behavior (performed by the host's translation
/// runtime against a selected translation string), modeled here for
/// testability. The source's bound-swap — matching an empty `from`
/// against `match.from` instead of `match.to` — is not reproduced:
/// an empty lower bound with a present upper bound is `AtMost(to)`, and
/// symmetrically an empty upper bound with a present lower bound is
/// `AtLeast(from)`.
pub fn parse_plural_selector(raw: &str) -> Option<PluralSelector> {
    match raw.split_once(',') {
        None => raw.trim().parse::<i64>().ok().map(PluralSelector::Exact),
        Some((from, to)) => {
            let from = from.trim();
            let to = to.trim();
            match (from.is_empty(), to.is_empty()) {
                (true, true) => None,
                (false, true) => from.parse().ok().map(PluralSelector::AtLeast),
                (true, false) => to.parse().ok().map(PluralSelector::AtMost),
                (false, false) => match (from.parse(), to.parse()) {
                    (Ok(from), Ok(to)) => Some(PluralSelector::Range { from, to }),
                    _ => None,
                },
            }
        }
    }
}

impl PluralSelector {
    pub fn matches(&self, n: i64) -> bool {
        match *self {
            PluralSelector::Exact(v) => n == v,
            PluralSelector::Range { from, to } => n >= from && n <= to,
            PluralSelector::AtLeast(from) => n >= from,
            PluralSelector::AtMost(to) => n <= to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateOpen {
    pub key: Option<String>,
    pub params_expr: String,
}

/// An active translation scope: the node that opened it, its params
/// expression, and the accumulating blueprint buffer.
#[derive(Debug)]
pub struct TranslationScope {
    pub owner: usize,
    pub key: Option<String>,
    pub params_expr: String,
    pub buffer: Vec<BlueprintFragment>,
}

impl TranslationScope {
    pub fn new(owner: usize, open: TranslateOpen) -> Self {
        TranslationScope {
            owner,
            key: open.key,
            params_expr: open.params_expr,
            buffer: Vec::new(),
        }
    }

    /// Renders the accumulated buffer as a single PHP concatenation
    /// expression suitable as the blueprint argument to `translate()`.
    pub fn render_blueprint(&self) -> String {
        if self.buffer.is_empty() {
            return "''".to_string();
        }
        self.buffer
            .iter()
            .map(|f| match f {
                BlueprintFragment::Literal(s) => format!("'{}'", escape_single_quotes(s)),
                BlueprintFragment::Expr(s) => format!("({s})"),
            })
            .collect::<Vec<_>>()
            .join(" . ")
    }

    /// The final `<?php echo $this->translate(...); ?>` call emitted
    /// into normal output at scope close.
    pub fn render_call(&self, rewrite: impl Fn(&str) -> String) -> String {
        let blueprint = self.render_blueprint();
        let params = rewrite(&self.params_expr);
        match &self.key {
            Some(key) => format!(
                "<?php echo $this->translate('{}', {blueprint}, {params}); ?>",
                escape_single_quotes(key)
            ),
            None => format!("<?php echo $this->translate({blueprint}, {params}); ?>"),
        }
    }
}
