//! A minimal conforming HTML/XML node-tree producer (`SPEC_FULL.md` §1,
//! `spec.md` §6's AST producer contract: `parse(source, content_type) ->
//! [node]`).
//!
//! This is intentionally small: entity-free (no `&amp;`-style decoding),
//! whitespace-preserving, and forgiving of malformed input rather than
//! diagnostic about it. It exists so the compiler has something concrete
//! to walk end-to-end in tests, not to be a general HTML5 parser — the
//! real generic HTML/XML parser is an out-of-scope external collaborator
//! per `spec.md` §1.

use crate::ast::{Arena, Comment, Element, Enclosure, NodeKind, RawAttribute, Tag};
use crate::error::Result;

/// The two content-type flavors `spec.md` §6's `parse` contract accepts.
/// HTML relies on a fixed void-element table to know which tags never
/// have a closing tag even without an explicit `/>`; XML requires every
/// element to close itself explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Xml,
}

const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
];

fn is_void_element(content_type: ContentType, name: &str) -> bool {
    content_type == ContentType::Html && HTML_VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

/// Parses `source` into an `Arena` of root-level nodes. Never panics on
/// malformed markup: an unterminated tag, attribute, or comment is
/// absorbed as literal text up to the end of input rather than raising,
/// matching the "black-box AST producer" contract's forgiving posture —
/// the directive-level errors this crate raises (`CompileError`) are
/// reserved for semantic problems in well-formed markup (nested
/// translations, malformed `s-for` grammar, etc.), not malformed HTML.
pub fn parse(source: &str, content_type: ContentType) -> Result<Arena> {
    let mut arena = Arena::new();
    let mut p = Parser { src: source, pos: 0, content_type };
    p.parse_nodes(&mut arena, None, None)?;
    Ok(arena)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    content_type: ContentType,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    fn skip_ws(&mut self) {
        while !self.eof() {
            let c = self.rest().chars().next().unwrap();
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Reads until `pred` is true for the next char, or EOF. Returns the
    /// consumed byte range's start.
    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while !self.eof() {
            let c = self.rest().chars().next().unwrap();
            if pred(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    /// Parses a run of sibling nodes into `parent` (or as roots, if
    /// `parent` is `None`), stopping at EOF or at a closing tag matching
    /// `stop_tag` (which is consumed). Returns whether a matching closing
    /// tag was actually found (vs. running off the end of input).
    fn parse_nodes(&mut self, arena: &mut Arena, parent: Option<usize>, stop_tag: Option<&str>) -> Result<bool> {
        loop {
            if self.eof() {
                return Ok(false);
            }
            if let Some(stop) = stop_tag {
                if self.at_closing_tag(stop) {
                    self.consume_closing_tag();
                    return Ok(true);
                }
            }
            if self.starts_with("</") {
                // A stray/mismatched closing tag with no corresponding
                // open in our current scope: swallow it as text so it
                // doesn't get reinterpreted as markup by an ancestor.
                let start = self.pos;
                self.pos += 2;
                self.read_while(|c| c != '>');
                if self.starts_with(">") {
                    self.pos += 1;
                }
                self.push_text(arena, parent, &self.src[start..self.pos].to_string());
                continue;
            }
            if self.starts_with("<!--") {
                self.parse_comment(arena, parent);
                continue;
            }
            if self.starts_with("<?") {
                self.parse_processing_instruction(arena, parent);
                continue;
            }
            if self.starts_with("<!") {
                self.parse_bang_declaration(arena, parent);
                continue;
            }
            if self.starts_with("<") && self.next_is_tag_name_start() {
                self.parse_element(arena, parent)?;
                continue;
            }
            self.parse_text(arena, parent);
        }
    }

    fn next_is_tag_name_start(&self) -> bool {
        self.src[self.pos + 1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
    }

    fn at_closing_tag(&self, name: &str) -> bool {
        if !self.starts_with("</") {
            return false;
        }
        let after = &self.rest()[2..];
        after.len() >= name.len()
            && after[..name.len()].eq_ignore_ascii_case(name)
            && after[name.len()..]
                .chars()
                .next()
                .map(|c| c.is_whitespace() || c == '>')
                .unwrap_or(false)
    }

    fn consume_closing_tag(&mut self) {
        self.read_while(|c| c != '>');
        if self.starts_with(">") {
            self.pos += 1;
        }
    }

    fn push_text(&self, arena: &mut Arena, parent: Option<usize>, text: &str) {
        if text.is_empty() {
            return;
        }
        match parent {
            Some(p) => {
                arena.add_child(p, NodeKind::Text(text.to_string()));
            }
            None => {
                arena.add_root(NodeKind::Text(text.to_string()));
            }
        }
    }

    fn parse_text(&mut self, arena: &mut Arena, parent: Option<usize>) {
        let start = self.pos;
        while !self.eof() && !self.rest().starts_with('<') {
            let c = self.rest().chars().next().unwrap();
            self.pos += c.len_utf8();
        }
        let text = &self.src[start..self.pos];
        self.push_text(arena, parent, text);
    }

    fn parse_comment(&mut self, arena: &mut Arena, parent: Option<usize>) {
        let start = self.pos;
        self.pos += 4; // "<!--"
        let close = self.rest().find("-->");
        let value = match close {
            Some(rel) => {
                self.pos += rel + 3;
                self.src[start..self.pos].to_string()
            }
            None => {
                self.pos = self.src.len();
                self.src[start..].to_string()
            }
        };
        let comment = Comment { value, suppress: false };
        match parent {
            Some(p) => {
                arena.add_child(p, NodeKind::Comment(comment));
            }
            None => {
                arena.add_root(NodeKind::Comment(comment));
            }
        }
    }

    /// `<!DOCTYPE ...>` and similar bang declarations: not further
    /// interpreted, carried through as literal text.
    fn parse_bang_declaration(&mut self, arena: &mut Arena, parent: Option<usize>) {
        let start = self.pos;
        self.read_while(|c| c != '>');
        if self.starts_with(">") {
            self.pos += 1;
        }
        self.push_text(arena, parent, &self.src[start..self.pos].to_string());
    }

    /// `<?...?>` processing instructions (e.g. an XML declaration).
    /// Modeled as a self-closing `Element` with `is_processing_instruction`
    /// set, per `spec.md` §3's AST node contract; the Node Compiler emits
    /// its `raw` verbatim.
    fn parse_processing_instruction(&mut self, arena: &mut Arena, parent: Option<usize>) {
        let start = self.pos;
        self.pos += 2; // "<?"
        let close = self.rest().find("?>");
        match close {
            Some(rel) => self.pos += rel + 2,
            None => self.pos = self.src.len(),
        }
        let raw = self.src[start..self.pos].to_string();
        let element = Element {
            tag: Tag {
                name: String::new(),
                is_self_closing: true,
                is_processing_instruction: true,
                should_have_closing_tag: false,
            },
            raw,
            attrs: Vec::new(),
            children: Vec::new(),
        };
        match parent {
            Some(p) => {
                arena.add_child(p, NodeKind::Element(element));
            }
            None => {
                arena.add_root(NodeKind::Element(element));
            }
        }
    }

    fn parse_element(&mut self, arena: &mut Arena, parent: Option<usize>) -> Result<()> {
        let start = self.pos;
        self.pos += 1; // '<'
        let name = self
            .read_while(|c| !c.is_whitespace() && c != '>' && c != '/')
            .to_string();

        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            attrs.push(self.parse_attribute());
        }

        let self_closing_slash = self.starts_with("/>");
        if self_closing_slash {
            self.pos += 2;
        } else if self.starts_with(">") {
            self.pos += 1;
        } else {
            // Ran off the end inside an unterminated start tag.
        }

        let void = is_void_element(self.content_type, &name);
        let mut tag = Tag::new(name.clone());
        if self_closing_slash {
            tag = tag.self_closing();
        } else if void {
            tag = tag.void();
        }

        let element = Element { tag, raw: String::new(), attrs, children: Vec::new() };
        let idx = match parent {
            Some(p) => arena.add_child(p, NodeKind::Element(element)),
            None => arena.add_root(NodeKind::Element(element)),
        };

        if !self_closing_slash && !void {
            self.parse_nodes(arena, Some(idx), Some(&name))?;
        }

        let raw = self.src[start..self.pos].to_string();
        arena.set_raw(idx, raw);
        Ok(())
    }

    fn parse_attribute(&mut self) -> RawAttribute {
        let full_name = self
            .read_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            .to_string();
        let (key, r#type) = match full_name.split_once(':') {
            Some((k, t)) => (k.to_string(), Some(t.to_string())),
            None => (full_name.clone(), None),
        };

        self.skip_ws();
        if !self.starts_with("=") {
            // Boolean/valueless attribute, e.g. `disabled` or bare `s-else`.
            return RawAttribute { key, r#type, name: full_name, value: String::new(), enclosure: Enclosure::Double };
        }
        self.pos += 1;
        self.skip_ws();

        let quote = self.rest().chars().next();
        let (value, enclosure) = match quote {
            Some(q) if q == '"' || q == '\'' => {
                self.pos += 1;
                let value = self.read_while(|c| c != q).to_string();
                if self.starts_with(&q.to_string()) {
                    self.pos += 1;
                }
                let enclosure = if q == '"' { Enclosure::Double } else { Enclosure::Single };
                (value, enclosure)
            }
            _ => {
                let value = self
                    .read_while(|c| !c.is_whitespace() && c != '>' && c != '/')
                    .to_string();
                (value, Enclosure::Double)
            }
        };

        RawAttribute { key, r#type, name: full_name, value, enclosure }
    }
}
