//! Lookup tables over the cells of a graph model.
//!
//! [`CellIndex`] walks the `<root>` container once and records every cell in
//! document order, together with an id lookup and a parent-to-children
//! lookup. Layer extraction queries these repeatedly.

use std::collections::HashMap;

use log::{debug, warn};

use strata_core::{cell::Cell, element::Element};

use crate::{config::DuplicateIdPolicy, error::StructureError};

/// Position of a cell in document order.
type Position = usize;

/// Id and parent lookups over the cells of one graph model.
///
/// Every element below the root container that carries an `id` or a `parent`
/// attribute is a cell. An `object`/`UserObject` wrapper counts as a single
/// cell; its nested `mxCell` is not indexed separately.
#[derive(Debug)]
pub struct CellIndex<'a> {
    cells: Vec<Cell<'a>>,
    by_id: HashMap<&'a str, Position>,
    children: HashMap<&'a str, Vec<Position>>,
}

impl<'a> CellIndex<'a> {
    /// Indexes every cell below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateId`] when two cells share an id and
    /// `duplicates` is [`DuplicateIdPolicy::Reject`]. With
    /// [`DuplicateIdPolicy::LastWins`] the later cell replaces the earlier one
    /// in the id lookup.
    pub fn build(
        root: &'a Element,
        duplicates: DuplicateIdPolicy,
    ) -> Result<Self, StructureError> {
        let mut index = Self {
            cells: Vec::new(),
            by_id: HashMap::new(),
            children: HashMap::new(),
        };
        for element in root.child_elements() {
            index.visit(element, duplicates)?;
        }

        debug!(
            cells = index.cells.len(),
            ids = index.by_id.len();
            "Cells indexed"
        );
        Ok(index)
    }

    fn visit(
        &mut self,
        element: &'a Element,
        duplicates: DuplicateIdPolicy,
    ) -> Result<(), StructureError> {
        let cell = Cell::new(element);
        if cell.id().is_some() || cell.parent().is_some() {
            self.insert(cell, duplicates)?;
        }

        // The nested mxCell of a wrapper belongs to the wrapper's cell.
        for nested in element.child_elements() {
            if cell.wrapped().is_some_and(|wrapped| std::ptr::eq(nested, wrapped)) {
                continue;
            }
            self.visit(nested, duplicates)?;
        }
        Ok(())
    }

    fn insert(
        &mut self,
        cell: Cell<'a>,
        duplicates: DuplicateIdPolicy,
    ) -> Result<(), StructureError> {
        let position = self.cells.len();
        self.cells.push(cell);

        if let Some(id) = cell.id() {
            if self.by_id.insert(id, position).is_some() {
                match duplicates {
                    DuplicateIdPolicy::Reject => {
                        return Err(StructureError::DuplicateId { id: id.to_string() });
                    }
                    DuplicateIdPolicy::LastWins => {
                        warn!(id; "Cell id is used more than once, keeping the later cell");
                    }
                }
            }
        }

        if let Some(parent) = cell.parent() {
            self.children.entry(parent).or_default().push(position);
        }

        Ok(())
    }

    /// Returns the cell carrying `id`.
    pub fn cell(&self, id: &str) -> Option<Cell<'a>> {
        self.position(id).and_then(|position| self.at(position))
    }

    /// Returns the first cell in document order carrying `id`, ignoring
    /// later duplicates.
    pub fn first(&self, id: &str) -> Option<Cell<'a>> {
        self.cells.iter().copied().find(|cell| cell.id() == Some(id))
    }

    /// Returns the cell at a document-order position.
    pub fn at(&self, position: usize) -> Option<Cell<'a>> {
        self.cells.get(position).copied()
    }

    /// Returns the document-order position of the cell carrying `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Returns the cells declaring `parent` as their parent, in document order.
    pub fn children(&self, parent: &str) -> impl Iterator<Item = Cell<'a>> + '_ {
        self.positioned_children(parent).map(|(_, cell)| cell)
    }

    /// Like [`CellIndex::children`], with each cell's document-order position.
    pub fn positioned_children(
        &self,
        parent: &str,
    ) -> impl Iterator<Item = (usize, Cell<'a>)> + '_ {
        self.children
            .get(parent)
            .into_iter()
            .flatten()
            .map(move |&position| (position, self.cells[position]))
    }

    /// Returns every indexed cell in document order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'a>> + '_ {
        self.cells.iter().copied()
    }

    /// Returns every edge cell that owns its id, in document order.
    ///
    /// A cell whose id was taken over by a later duplicate is skipped.
    pub fn edges(&self) -> impl Iterator<Item = Cell<'a>> + '_ {
        self.positioned_edges().map(|(_, cell)| cell)
    }

    /// Like [`CellIndex::edges`], with each cell's document-order position.
    pub fn positioned_edges(&self) -> impl Iterator<Item = (usize, Cell<'a>)> + '_ {
        self.cells
            .iter()
            .copied()
            .enumerate()
            .filter(move |(position, cell)| {
                cell.is_edge()
                    && cell
                        .id()
                        .is_some_and(|id| self.position(id) == Some(*position))
            })
    }

    /// Returns every layer cell (parent `"0"`) in document order. Layers
    /// without an id are included.
    pub fn layers(&self) -> impl Iterator<Item = Cell<'a>> + '_ {
        self.cells.iter().copied().filter(|cell| cell.is_layer())
    }

    /// Returns the number of indexed cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell was found.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
