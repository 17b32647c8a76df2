#![forbid(unsafe_code)]

//! Declarative node descriptions inserted into a [`Document`](super::Document).

use std::collections::BTreeMap;

/// Element kinds the document distinguishes.
///
/// Only the interactive kinds affect behavior (focusability); the rest exist
/// so content trees read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Body,
    Div,
    Span,
    Paragraph,
    Heading(u8),
    Button,
    Anchor,
    Input,
    Select,
    TextArea,
    Label,
}

impl Tag {
    /// Form controls that are focusable regardless of attributes.
    #[must_use]
    pub const fn is_form_control(self) -> bool {
        matches!(self, Self::Button | Self::Input | Self::Select | Self::TextArea)
    }
}

/// A detached element description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub text: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            text: None,
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn div() -> Self {
        Self::new(Tag::Div)
    }

    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(Tag::Paragraph).with_text(text)
    }

    #[must_use]
    pub fn button(label: impl Into<String>) -> Self {
        Self::new(Tag::Button).with_text(label)
    }

    /// An anchor with a destination (focusable).
    #[must_use]
    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(Tag::Anchor).attr("href", href).with_text(label)
    }

    #[must_use]
    pub fn input() -> Self {
        Self::new(Tag::Input)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn tabindex(self, index: i32) -> Self {
        self.attr("tabindex", index.to_string())
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// An ordered list of sibling nodes; opaque content handed to a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Self { nodes: vec![node] }
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

/// Plain text becomes a single paragraph.
impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Node::paragraph(text).into()
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Node::paragraph(text).into()
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
