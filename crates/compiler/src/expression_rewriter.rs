//! Expression Rewriter (`spec.md` §4.1).
//!
//! Rewrites bare function invocations `name(args)` found in an
//! expression string into host-method dispatch calls, so the compiled
//! template invokes the host's registered-function table instead of a
//! free global. Used as a subroutine by every later stage that touches
//! expression text (interpolation contents, `s-bind` values, directive
//! conditions, `s-for` iterables).

use crate::schema::host_builtins;

/// Textual token meaning "resolve the following identifier against the
/// compiled template's runtime function table" in the emitted output.
/// Concretely: the host evaluator for this templating system is the
/// compiled template's own object instance, so a rewritten call reads
/// as a method call on `$this`.
pub const DISPATCH_PREFIX: &str = "$this->";

const ALLOWED_WORD_OPERATORS: [&str; 4] = ["and", "or", "xor", "in"];

/// Longest-match-first list of non-word preceding tokens that qualify a
/// call for rewriting. Checked before the single-character fallbacks.
const ALLOWED_MULTI_CHAR: [&str; 16] = [
    "<=>", "===", "!==", "**=", "&&", "||", "==", "!=", "<>", "<=", ">=",
    ".=", "+=", "-=", "*=", "/=",
];

const ALLOWED_SINGLE_CHAR: [char; 11] = [
    '+', '-', '*', '/', '%', '=', '.', '!', '<', '>', '(',
];

const OTHER_ALLOWED_TOKENS: [&str; 2] = [":", "?"];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A quote-state mask: `mask[i]` is `true` when `chars[i]` falls inside
/// a single- or double-quoted string. All detection rules below are
/// suspended on masked positions.
fn quote_mask(chars: &[char]) -> Vec<bool> {
    let mut mask = vec![false; chars.len()];
    let mut open: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match open {
            None => {
                if c == '\'' || c == '"' {
                    open = Some(c);
                    mask[i] = true;
                }
            }
            Some(q) => {
                mask[i] = true;
                if c == '\\' && i + 1 < chars.len() {
                    mask[i + 1] = true;
                    i += 1;
                } else if c == q {
                    open = None;
                }
            }
        }
        i += 1;
    }
    mask
}

struct Call {
    /// Position (in `chars`) the rewritten dispatch prefix is inserted at.
    name_start: usize,
}

fn find_matching_close(chars: &[char], mask: &[bool], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = open + 1;
    while i < chars.len() {
        if !mask[i] {
            match chars[i] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Returns `true` if the text immediately before `name_start` (skipping
/// whitespace) qualifies the call for rewriting, per `spec.md` §4.1's
/// allowed/disallowed preceding-token rules.
fn preceded_by_qualifying_token(chars: &[char], name_start: usize) -> bool {
    let mut p = name_start;
    while p > 0 && chars[p - 1].is_whitespace() {
        p -= 1;
    }
    if p == 0 {
        return true;
    }

    for kw in ALLOWED_WORD_OPERATORS {
        let kw_chars: Vec<char> = kw.chars().collect();
        let len = kw_chars.len();
        if p >= len && chars[p - len..p] == kw_chars[..] {
            let boundary_ok = p == len || !is_ident_char(chars[p - len - 1]);
            if boundary_ok {
                return true;
            }
        }
    }

    // `-->` is its own allowed token and must be checked before the
    // disallowed `->` rule below, or its trailing `->` would shadow it.
    if p >= 3 && chars[p - 3..p] == ['-', '-', '>'] {
        return true;
    }

    // disallowed: `->` (method call) and `\` (namespace separator)
    if p >= 2 && chars[p - 2] == '-' && chars[p - 1] == '>' {
        return false;
    }
    if chars[p - 1] == '\\' {
        return false;
    }

    for tok in ALLOWED_MULTI_CHAR {
        let tok_chars: Vec<char> = tok.chars().collect();
        let len = tok_chars.len();
        if p >= len && chars[p - len..p] == tok_chars[..] {
            return true;
        }
    }
    if ALLOWED_SINGLE_CHAR.contains(&chars[p - 1]) {
        return true;
    }
    for tok in OTHER_ALLOWED_TOKENS {
        if chars[p - 1] == tok.chars().next().unwrap() {
            return true;
        }
    }
    false
}

fn is_valid_name(name: &[char]) -> bool {
    match name.first() {
        Some(c) if c.is_ascii_alphabetic() || *c == '_' => {}
        _ => return false,
    }
    name.iter().all(|c| is_ident_char(*c))
}

fn find_qualifying_calls(chars: &[char], mask: &[bool]) -> Vec<Call> {
    let mut calls = Vec::new();
    for i in 0..chars.len() {
        if mask[i] || chars[i] != '(' {
            continue;
        }
        let Some(_close) = find_matching_close(chars, mask, i) else {
            continue;
        };
        let mut k = i;
        while k > 0 && !mask[k - 1] && is_ident_char(chars[k - 1]) {
            k -= 1;
        }
        let name_start = k;
        if name_start == i {
            continue; // no identifier directly before '('
        }
        let name = &chars[name_start..i];
        if !is_valid_name(name) {
            continue;
        }
        let name_str: String = name.iter().collect();
        if host_builtins::is_builtin(&name_str) {
            continue;
        }
        if !preceded_by_qualifying_token(chars, name_start) {
            continue;
        }
        calls.push(Call { name_start });
    }
    calls
}

/// Rewrites every qualifying bare function call in `expr` to a
/// `$this->`-dispatched call. Never fails: an unrecognizable expression
/// passes through unchanged. Idempotent, since a rewritten call is now
/// preceded by `->`, which is itself a disallowed preceding token.
pub fn rewrite(expr: &str) -> String {
    let mut chars: Vec<char> = expr.chars().collect();
    let mask = quote_mask(&chars);
    let mut calls = find_qualifying_calls(&chars, &mask);
    // Apply right-to-left so earlier offsets stay valid.
    calls.sort_by(|a, b| b.name_start.cmp(&a.name_start));
    for call in calls {
        let insertion: Vec<char> = DISPATCH_PREFIX.chars().collect();
        chars.splice(call.name_start..call.name_start, insertion);
    }
    chars.into_iter().collect()
}
