//! The compiled document tree and its read-only tag view.
//!
//! [`Node`] is the internal tree the renderer walks. Hosts see the tree
//! through [`Tag`], which hides text spans and exposes only the tags a
//! template references, so a host can check which variables and partials a
//! template needs without rendering it.

use std::fmt;

/// A node of the compiled document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// Literal text, emitted verbatim.
    Text(String),
    /// `{{name}}`, `{{{name}}}` or `{{&name}}`.
    Variable { name: String, escape: bool },
    /// `{{#name}}...{{/name}}` or `{{^name}}...{{/name}}`.
    Section {
        name: String,
        inverted: bool,
        /// Line of the opening tag.
        line: usize,
        children: Vec<Node>,
    },
    /// `{{>name}}`, expanded at render time.
    Partial { name: String, indent: String },
}

/// The kind of a [`Tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    Variable,
    Section,
    InvertedSection,
    Partial,
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagType::Variable => "Variable",
            TagType::Section => "Section",
            TagType::InvertedSection => "InvertedSection",
            TagType::Partial => "Partial",
        };
        f.write_str(name)
    }
}

/// A read-only view of one tag in a compiled template.
///
/// # Example
///
/// ```rust
/// use standout_mustache::{Template, TagType};
///
/// let template = Template::compile("{{#users}}{{name}}{{/users}}{{>footer}}").unwrap();
/// let tags = template.tags();
///
/// assert_eq!(tags[0].tag_type(), TagType::Section);
/// assert_eq!(tags[0].tags()[0].name(), "name");
/// assert_eq!(tags[1].tag_type(), TagType::Partial);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    node: &'a Node,
}

impl<'a> Tag<'a> {
    /// Returns the kind of this tag.
    pub fn tag_type(&self) -> TagType {
        match self.node {
            Node::Variable { .. } => TagType::Variable,
            Node::Section { inverted: true, .. } => TagType::InvertedSection,
            Node::Section { .. } => TagType::Section,
            Node::Partial { .. } => TagType::Partial,
            Node::Text(_) => unreachable!("text nodes are never exposed as tags"),
        }
    }

    /// Returns the name the tag refers to.
    pub fn name(&self) -> &'a str {
        match self.node {
            Node::Variable { name, .. }
            | Node::Section { name, .. }
            | Node::Partial { name, .. } => name,
            Node::Text(_) => unreachable!("text nodes are never exposed as tags"),
        }
    }

    /// Returns the tags nested inside a section. Partials have none.
    ///
    /// # Panics
    ///
    /// Panics when called on a variable tag, which cannot contain tags.
    pub fn tags(&self) -> Vec<Tag<'a>> {
        match self.node {
            Node::Section { children, .. } => extract(children),
            Node::Partial { .. } => Vec::new(),
            Node::Variable { name, .. } => {
                panic!("tags() called on variable tag `{name}`")
            }
            Node::Text(_) => unreachable!("text nodes are never exposed as tags"),
        }
    }
}

/// Collects the tag nodes of one tree level, skipping text.
pub(crate) fn extract(nodes: &[Node]) -> Vec<Tag<'_>> {
    nodes
        .iter()
        .filter(|node| !matches!(node, Node::Text(_)))
        .map(|node| Tag { node })
        .collect()
}
