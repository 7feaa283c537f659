//! Read-only element tree for ODF XML parts.
//!
//! The tree keeps mixed content in document order: text runs and child
//! elements are stored side by side in [`Node`], which the inline converter
//! needs to reproduce a paragraph faithfully.

use super::node::NodeKind;
use std::collections::HashMap;

/// A node in the element tree: either an element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// The element, if this node is one.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// The character data, if this node is text.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Node kind; text nodes report [`NodeKind::Text`].
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(e) => e.kind(),
            Node::Text(_) => NodeKind::Text,
        }
    }
}

/// Base trait for attribute access on ODF elements
pub trait ElementBase {
    /// Get the tag name of this element
    fn tag_name(&self) -> &str;

    /// Get the attributes of this element
    fn attributes(&self) -> &HashMap<String, String>;

    /// Get attribute value by name
    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes().get(name).map(|s| s.as_str())
    }

    /// Check if element has attribute
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes().contains_key(name)
    }

    /// Get boolean attribute value
    fn get_bool_attribute(&self, name: &str) -> Option<bool> {
        self.get_attribute(name).and_then(|s| match s {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
    }

    /// Get numeric attribute value
    fn get_numeric_attribute(&self, name: &str) -> Option<f64> {
        self.get_attribute(name)
            .and_then(|s| fast_float2::parse(s.trim()).ok())
    }

    /// Get integer attribute value
    fn get_int_attribute(&self, name: &str) -> Option<i64> {
        self.get_attribute(name).and_then(|s| s.trim().parse().ok())
    }
}

/// Longest run of spaces one `text:s` may produce
pub const MAX_SPACE_RUN: i64 = 100;

/// An ODF XML element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag_name: String,
    kind: NodeKind,
    attributes: HashMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Create a new element
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            kind: NodeKind::from_tag(tag_name),
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: add a text run
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Set attribute value
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Append a child node
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Append character data, merging with a trailing text node
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Node kind derived from the tag name
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Local name (without namespace prefix)
    pub fn local_name(&self) -> &str {
        match self.tag_name.find(':') {
            Some(pos) => &self.tag_name[pos + 1..],
            None => &self.tag_name,
        }
    }

    /// All child nodes in document order
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order (text nodes skipped)
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element of the given kind
    pub fn first_child(&self, kind: NodeKind) -> Option<&Element> {
        self.child_elements().find(|e| e.kind == kind)
    }

    /// First child element with the given tag name
    pub fn first_child_by_tag(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.tag_name == tag)
    }

    /// Depth-first search for the first descendant satisfying `pred`
    pub fn find_descendant<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if pred(current) {
                return Some(current);
            }
            let before = stack.len();
            stack.extend(current.child_elements());
            stack[before..].reverse();
        }
        None
    }

    /// Does any descendant have the given kind?
    pub fn has_descendant(&self, kind: NodeKind) -> bool {
        self.find_descendant(|e| e.kind == kind).is_some()
    }

    /// Plain text of this element with ODF spacing elements expanded.
    ///
    /// Notes, annotations and index bodies are skipped, so the result matches
    /// what a reader sees in the running text.
    /// Spaces written by a `text:s` element, capped at [`MAX_SPACE_RUN`]
    pub fn space_count(&self) -> usize {
        self.get_int_attribute("text:c").unwrap_or(1).clamp(1, MAX_SPACE_RUN) as usize
    }

    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => match e.kind {
                    NodeKind::Space => {
                        out.push_str(&" ".repeat(e.space_count()));
                    },
                    NodeKind::Tab => out.push('\t'),
                    NodeKind::LineBreak => out.push('\n'),
                    NodeKind::Note | NodeKind::Annotation | NodeKind::SvgTitle | NodeKind::SvgDesc => {},
                    _ => e.collect_text(out),
                },
            }
        }
    }

    /// Is the element free of visible content (only whitespace text and
    /// no drawings, fields or notes)?
    pub fn is_whitespace_only(&self) -> bool {
        self.children.iter().all(|child| match child {
            Node::Text(t) => t.trim().is_empty(),
            Node::Element(e) => match e.kind {
                NodeKind::Space | NodeKind::SoftPageBreak | NodeKind::BookmarkStart
                | NodeKind::BookmarkEnd | NodeKind::ReferenceMarkEnd => true,
                NodeKind::Span | NodeKind::Meta => e.is_whitespace_only(),
                _ => false,
            },
        })
    }
}

impl ElementBase for Element {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

/// Helper for creating elements with specific tag names
pub struct ElementFactory;

impl ElementFactory {
    /// Create a text paragraph element
    pub fn paragraph(style: &str) -> Element {
        Element::new("text:p").with_attribute("text:style-name", style)
    }

    /// Create a text span element
    pub fn span(style: &str, text: &str) -> Element {
        Element::new("text:span")
            .with_attribute("text:style-name", style)
            .with_text(text)
    }

    /// Create a heading element
    pub fn heading(level: u8, text: &str) -> Element {
        Element::new("text:h")
            .with_attribute("text:outline-level", &level.to_string())
            .with_text(text)
    }
}
