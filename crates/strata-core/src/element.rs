//! Owned XML element tree.
//!
//! [`Element`] keeps attributes in document order and children as a list of
//! [`Node`]s, so a tree that is read and written again keeps its shape.
//! Cloning an element produces an independent deep copy of its whole subtree.

use indexmap::IndexMap;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
}

/// An XML element with ordered attributes and children.
///
/// # Examples
///
/// ```
/// use strata_core::element::Element;
///
/// let cell = Element::new("mxCell")
///     .with_attribute("id", "2")
///     .with_attribute("parent", "1")
///     .with_child(Element::new("mxGeometry").with_attribute("as", "geometry"));
///
/// assert_eq!(cell.attribute("parent"), Some("1"));
/// assert_eq!(cell.child_elements().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Returns this element with an attribute set.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Returns this element with a child element appended.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns an iterator over all attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Sets an attribute.
    ///
    /// An existing attribute keeps its position and only has its value
    /// replaced; a new attribute is appended.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Returns all child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns an iterator over the child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns a mutable iterator over the child elements, skipping text.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends character data, merging it with a directly preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Returns the concatenated direct text content of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Returns the first direct child element with the given name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Returns the first direct child element with the given name, mutably.
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|child| child.name == name)
    }

    /// Returns the first descendant with the given name in depth-first
    /// document order. The element itself is not considered.
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|element| element.name == name)
    }

    /// Returns an iterator over all descendant elements in depth-first
    /// document order, excluding the element itself.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Removes direct text children that contain only whitespace, if the
    /// element also has child elements.
    ///
    /// Used after parsing so that indentation does not become payload. Text
    /// of an element without child elements is kept as is.
    pub(crate) fn drop_blank_text(&mut self) {
        if self.child_elements().next().is_none() {
            return;
        }
        self.children.retain(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => true,
        });
    }
}

/// Depth-first iterator over the descendants of an [`Element`].
///
/// Created by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(next.child_elements());
        self.stack[start..].reverse();
        Some(next)
    }
}
