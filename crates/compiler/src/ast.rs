//! The external AST producer's contract (`spec.md` §3, §6).
//!
//! The compiler treats the generic HTML/XML parser as a black box: it
//! only needs a tree of three node variants, addressed through an
//! arena so that back-references (parent, next sibling) are plain
//! indices rather than a cyclic ownership graph.

use std::fmt;

/// Which quote character enclosed an attribute's value in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enclosure {
    Double,
    Single,
}

impl Enclosure {
    pub fn as_char(self) -> char {
        match self {
            Enclosure::Double => '"',
            Enclosure::Single => '\'',
        }
    }
}

impl fmt::Display for Enclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A raw, unclassified attribute as it appeared in the source.
#[derive(Debug, Clone)]
pub struct RawAttribute {
    /// The part of `name` before `:`, e.g. `s-bind` in `s-bind:class`.
    pub key: String,
    /// The part of `name` after `:`, if any, e.g. `class` in `s-bind:class`.
    pub r#type: Option<String>,
    /// The full original attribute name, e.g. `s-bind:class`.
    pub name: String,
    /// The unparsed attribute value.
    pub value: String,
    pub enclosure: Enclosure,
}

impl RawAttribute {
    pub fn plain(name: impl Into<String>, value: impl Into<String>, enclosure: Enclosure) -> Self {
        let name = name.into();
        RawAttribute {
            key: name.clone(),
            r#type: None,
            name,
            value: value.into(),
            enclosure,
        }
    }

    pub fn directive(key: &str, r#type: Option<&str>, value: impl Into<String>, enclosure: Enclosure) -> Self {
        let name = match r#type {
            Some(t) => format!("{key}:{t}"),
            None => key.to_string(),
        };
        RawAttribute {
            key: key.to_string(),
            r#type: r#type.map(str::to_string),
            name,
            value: value.into(),
            enclosure,
        }
    }
}

/// Tag metadata for an `Element` node.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub is_self_closing: bool,
    pub is_processing_instruction: bool,
    pub should_have_closing_tag: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            is_self_closing: false,
            is_processing_instruction: false,
            should_have_closing_tag: true,
        }
    }

    pub fn self_closing(mut self) -> Self {
        self.is_self_closing = true;
        self.should_have_closing_tag = false;
        self
    }

    pub fn void(mut self) -> Self {
        self.should_have_closing_tag = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    /// The source bytes covered by this element, including its tags and
    /// children. Used verbatim when an `s-skip` scope is active.
    pub raw: String,
    pub attrs: Vec<RawAttribute>,
    /// Indices, into the owning `Arena`, of this element's children.
    pub children: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub value: String,
    /// A comment can be individually marked non-emittable (e.g. one the
    /// source parser recognized as a conditional/IE comment) in
    /// addition to the compiler-wide `skip_comments` configuration.
    pub suppress: bool,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(Comment),
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }
}

struct StoredNode {
    kind: NodeKind,
    #[allow(dead_code)]
    parent: Option<usize>,
    next_sibling: Option<usize>,
}

/// An arena of AST nodes. Parent/sibling relationships are indices into
/// `nodes`, never `Rc`-cyclic references, per `spec.md` §9's "Back-references
/// in the AST" redesign note.
#[derive(Default)]
pub struct Arena {
    nodes: Vec<StoredNode>,
    roots: Vec<usize>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn add_root(&mut self, kind: NodeKind) -> usize {
        let idx = self.alloc(kind, None);
        if let Some(&last) = self.roots.last() {
            self.nodes[last].next_sibling = Some(idx);
        }
        self.roots.push(idx);
        idx
    }

    pub fn add_child(&mut self, parent: usize, kind: NodeKind) -> usize {
        let idx = self.alloc(kind, Some(parent));
        let last_child = match &self.nodes[parent].kind {
            NodeKind::Element(e) => e.children.last().copied(),
            _ => panic!("add_child called on a non-element parent"),
        };
        match &mut self.nodes[parent].kind {
            NodeKind::Element(e) => e.children.push(idx),
            _ => unreachable!(),
        }
        if let Some(last) = last_child {
            self.nodes[last].next_sibling = Some(idx);
        }
        idx
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<usize>) -> usize {
        self.nodes.push(StoredNode {
            kind,
            parent,
            next_sibling: None,
        });
        self.nodes.len() - 1
    }

    pub fn get(&self, idx: usize) -> &NodeKind {
        &self.nodes[idx].kind
    }

    pub fn next_sibling(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].next_sibling
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Fills in an `Element`'s `raw` field once its closing tag (or
    /// self-closing slash) has been seen. Parser-only; the Node Compiler
    /// only ever reads `raw`, never sets it.
    pub(crate) fn set_raw(&mut self, idx: usize, raw: String) {
        if let NodeKind::Element(e) = &mut self.nodes[idx].kind {
            e.raw = raw;
        }
    }
}
