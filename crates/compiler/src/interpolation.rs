//! Interpolation Scanner (`spec.md` §4.2).
//!
//! Extracts `{{ expr }}` (HTML-escaped) and `{!! expr !!}` (raw) spans
//! from a text fragment in a single forward pass.

/// One interpolation span found in a text fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationSpan {
    /// Byte offset of the opening delimiter.
    pub begin: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    pub content: String,
    /// `end - begin`.
    pub length: usize,
    /// `true` for `{{ ... }}`, `false` for `{!! ... !!}`.
    pub escape: bool,
}

/// Scans `text` for interpolation spans.
///
/// Per `spec.md` §9's first open question, this adopts the documented
/// source behavior rather than the stricter alternative: a close
/// delimiter of *either* style (`}}` or `!!}`) terminates whichever open
/// delimiter is currently pending, when `strict_close_match` is `false`.
/// With `strict_close_match: true`, a span whose close doesn't match its
/// open style is treated the same as an unbalanced span and dropped.
///
/// Quote-state tracking is intentionally not applied here: interpolation
/// delimiters are recognized even inside quoted regions, as specified.
pub fn scan(text: &str, strict_close_match: bool) -> Vec<InterpolationSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut open: Option<(usize, usize, bool)> = None; // (begin, content_start, escape)
    let mut i = 0;
    while i < bytes.len() {
        if let Some((begin, content_start, escape)) = open {
            if bytes[i..].starts_with(b"}}") {
                if !strict_close_match || escape {
                    spans.push(InterpolationSpan {
                        begin,
                        end: i + 2,
                        content: text[content_start..i].to_string(),
                        length: (i + 2) - begin,
                        escape,
                    });
                    open = None;
                    i += 2;
                    continue;
                }
            } else if bytes[i..].starts_with(b"!!}") {
                if !strict_close_match || !escape {
                    spans.push(InterpolationSpan {
                        begin,
                        end: i + 3,
                        content: text[content_start..i].to_string(),
                        length: (i + 3) - begin,
                        escape,
                    });
                    open = None;
                    i += 3;
                    continue;
                }
            }
            i += 1;
        } else if bytes[i..].starts_with(b"{{") {
            open = Some((i, i + 2, true));
            i += 2;
        } else if bytes[i..].starts_with(b"{!!") {
            open = Some((i, i + 3, false));
            i += 3;
        } else {
            i += 1;
        }
    }
    // A dangling open delimiter with no matching close produces no span.
    spans
}
