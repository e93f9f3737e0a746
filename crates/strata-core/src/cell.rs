//! Graph cells of an `mxGraphModel`.
//!
//! A [`Cell`] is a borrowed view over one element of the model's `root`
//! container. Plain `<mxCell>` elements carry all of their graph attributes
//! directly. Cells with custom properties are stored by draw.io as an
//! `<object>` or `<UserObject>` wrapper: the wrapper holds `id` and `label`,
//! and a single nested `<mxCell>` holds `parent`, `edge`, `source` and
//! `target`. Both shapes are exposed through the same accessors.

use crate::element::Element;

/// Identifier of the anonymous top container every graph model starts with.
pub const ROOT_CELL_ID: &str = "0";

/// Identifier of the default layer, the second cell of every graph model.
pub const DEFAULT_LAYER_ID: &str = "1";

/// The canonical root identifiers, in the order they appear in a model.
///
/// Every exported document carries a copy of each of these cells that exists
/// in the source.
pub const CANONICAL_ROOT_IDS: [&str; 2] = [ROOT_CELL_ID, DEFAULT_LAYER_ID];

/// Tag name of a graph cell.
pub const MX_CELL: &str = "mxCell";

/// Tag names that wrap a single `mxCell` and carry its custom properties.
const WRAPPER_TAGS: [&str; 2] = ["object", "UserObject"];

/// A read-only view over one graph cell.
///
/// # Examples
///
/// ```
/// use strata_core::{cell::Cell, element::Element};
///
/// let wrapper = Element::new("object")
///     .with_attribute("id", "n1")
///     .with_attribute("label", "Server")
///     .with_child(Element::new("mxCell").with_attribute("parent", "L1"));
///
/// let cell = Cell::new(&wrapper);
/// assert!(cell.is_wrapper());
/// assert_eq!(cell.id(), Some("n1"));
/// assert_eq!(cell.parent(), Some("L1"));
/// assert_eq!(cell.label(), Some("Server"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    /// The element stored in the model's root container.
    element: &'a Element,
    /// The element carrying the graph attributes: the nested `mxCell` of a
    /// wrapper, or `element` itself.
    graph: &'a Element,
}

impl<'a> Cell<'a> {
    /// Creates a cell view over an element of the root container.
    pub fn new(element: &'a Element) -> Self {
        let graph = wrapped_cell(element).unwrap_or(element);
        Self { element, graph }
    }

    /// Returns the element as stored in the source tree.
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Returns `true` if this cell is an `object`/`UserObject` wrapper.
    pub fn is_wrapper(&self) -> bool {
        !std::ptr::eq(self.element, self.graph)
    }

    /// Returns the nested `mxCell` of a wrapper.
    pub fn wrapped(&self) -> Option<&'a Element> {
        self.is_wrapper().then_some(self.graph)
    }

    /// Returns the non-empty cell identifier.
    pub fn id(&self) -> Option<&'a str> {
        non_empty(self.element.attribute("id"))
    }

    /// Returns the non-empty identifier of the containing cell.
    pub fn parent(&self) -> Option<&'a str> {
        non_empty(self.graph.attribute("parent"))
    }

    /// Returns `true` if the cell is a graph edge (`edge="1"`).
    pub fn is_edge(&self) -> bool {
        self.graph.attribute("edge") == Some("1")
    }

    /// Returns the identifier of the edge's source terminal.
    pub fn source(&self) -> Option<&'a str> {
        non_empty(self.graph.attribute("source"))
    }

    /// Returns the identifier of the edge's target terminal.
    pub fn target(&self) -> Option<&'a str> {
        non_empty(self.graph.attribute("target"))
    }

    /// Returns an iterator over the edge's terminal identifiers.
    pub fn terminals(&self) -> impl Iterator<Item = &'a str> {
        self.source().into_iter().chain(self.target())
    }

    /// Returns the display label.
    ///
    /// Wrappers keep their label in `label`; plain cells in `value`.
    pub fn label(&self) -> Option<&'a str> {
        if self.is_wrapper() {
            non_empty(self.element.attribute("label"))
                .or_else(|| non_empty(self.element.attribute("value")))
        } else {
            non_empty(self.element.attribute("value"))
        }
    }

    /// Returns `true` if the cell is a layer: a direct child of the root cell.
    pub fn is_layer(&self) -> bool {
        self.parent() == Some(ROOT_CELL_ID)
    }

    /// Returns a deep copy of the stored element.
    pub fn to_element(&self) -> Element {
        self.element.clone()
    }

    /// Returns a deep copy of the stored element with its parent reference
    /// replaced.
    ///
    /// For wrappers the parent lives on the nested `mxCell`, which is the
    /// element rewritten.
    pub fn to_element_with_parent(&self, parent: &str) -> Element {
        let mut copy = self.element.clone();
        if self.is_wrapper() {
            if let Some(inner) = copy.find_child_mut(MX_CELL) {
                inner.set_attribute("parent", parent);
            }
        } else {
            copy.set_attribute("parent", parent);
        }
        copy
    }
}

/// Returns the nested `mxCell` if `element` is a cell wrapper.
fn wrapped_cell(element: &Element) -> Option<&Element> {
    if WRAPPER_TAGS.contains(&element.name()) {
        element.find_child(MX_CELL)
    } else {
        None
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
