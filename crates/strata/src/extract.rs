//! Layer extraction.
//!
//! [`LayerExtractor`] turns one layer of a source graph model into a
//! standalone document:
//!
//! 1. The layer's closure is collected by walking parent-to-children links
//!    down from the layer cell. Each id is taken from the cell it is first
//!    reached through, so a duplicated id never pulls in the copy that sits
//!    in another layer. Revisited ids end their branch, so parent cycles
//!    terminate.
//! 2. Every edge of the whole model with a terminal inside the closure is
//!    added, whatever its own parent. An edge joining two layers therefore
//!    appears in the export of both.
//! 3. Cells whose parent is one of those edges (floating edge labels) are
//!    added with them.
//! 4. Cells added by steps 2 and 3 are re-parented onto the layer unless the
//!    layer already is their parent. Cells of the closure keep their parent.
//! 5. The output root holds the canonical root cells, the layer, the closure
//!    and then the crossing cells. Each id is emitted once; within a group
//!    cells follow source document order.
//!
//! Ids that are referenced but not indexed are skipped. The canonical root
//! cells are taken from their first occurrence in the source.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque, hash_map::Entry};

use log::{debug, trace};

use strata_core::{
    cell::{CANONICAL_ROOT_IDS, Cell},
    element::Element,
};

use crate::{config::DocumentConfig, document::Structure, error::StructureError, index::CellIndex};

/// Label used for layers without one.
pub const UNNAMED_LAYER: &str = "Unnamed_Layer";

/// Diagram id written when the source diagram has none.
pub const DEFAULT_DIAGRAM_ID: &str = "default_id";

/// One layer assembled into a standalone document.
#[derive(Debug, Clone)]
pub struct LayerExport {
    layer_id: String,
    label: String,
    document: Element,
    native_cells: usize,
    crossing_cells: usize,
    reparented_cells: usize,
}

impl LayerExport {
    /// Returns the id of the exported layer cell, or an empty string if it
    /// has none.
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Returns the layer label, or `Unnamed_Layer`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the assembled `<mxfile>` document.
    pub fn document(&self) -> &Element {
        &self.document
    }

    /// Returns the cells of the output root container in order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> {
        self.document
            .find_child("diagram")
            .and_then(|diagram| diagram.find_child("mxGraphModel"))
            .and_then(|model| model.find_child("root"))
            .into_iter()
            .flat_map(|root| root.child_elements())
            .map(Cell::new)
    }

    /// Returns the number of cells emitted from the layer's own closure,
    /// including the layer.
    pub fn native_cells(&self) -> usize {
        self.native_cells
    }

    /// Returns the number of crossing edges and edge labels emitted.
    pub fn crossing_cells(&self) -> usize {
        self.crossing_cells
    }

    /// Returns how many of the crossing cells had their parent rewritten.
    pub fn reparented_cells(&self) -> usize {
        self.reparented_cells
    }
}

/// Extracts standalone layer documents from one graph model.
///
/// The index is built once; every call to [`LayerExtractor::extract`] reads
/// it without modifying the source tree.
#[derive(Debug)]
pub struct LayerExtractor<'a> {
    structure: Structure<'a>,
    index: CellIndex<'a>,
    config: DocumentConfig,
}

impl<'a> LayerExtractor<'a> {
    /// Indexes the graph model of `structure`.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateId`] if the configuration rejects
    /// duplicate ids and the model has some.
    pub fn new(structure: Structure<'a>, config: &DocumentConfig) -> Result<Self, StructureError> {
        let index = CellIndex::build(structure.root(), config.duplicate_ids())?;
        Ok(Self {
            structure,
            index,
            config: config.clone(),
        })
    }

    /// Returns the cell index.
    pub fn index(&self) -> &CellIndex<'a> {
        &self.index
    }

    /// Returns the layer cells in document order.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::NoLayers`] if the model has none.
    pub fn layers(&self) -> Result<Vec<Cell<'a>>, StructureError> {
        let layers: Vec<_> = self.index.layers().collect();
        if layers.is_empty() {
            return Err(StructureError::NoLayers);
        }
        Ok(layers)
    }

    /// Builds the standalone document for `layer`.
    ///
    /// `layer` is expected to be one of [`LayerExtractor::layers`]. A layer
    /// without an id has no closure and yields a document holding only the
    /// canonical root cells and the layer itself.
    pub fn extract(&self, layer: Cell<'a>) -> LayerExport {
        let layer_id = layer.id();
        let label = layer.label().unwrap_or(UNNAMED_LAYER);

        let mut root = RootBuilder::new();
        for id in CANONICAL_ROOT_IDS {
            if let Some(cell) = self.index.first(id) {
                root.push(Some(id), cell.to_element());
            }
        }
        root.push(layer_id, layer.to_element());

        let mut native_cells = 1;
        let mut crossing_cells = 0;
        let mut reparented_cells = 0;

        if let Some(layer_id) = layer_id {
            let reached = self.closure(layer_id);
            let crossing = self.crossing_cells(layer_id, &reached);

            let mut native: Vec<_> = reached.values().copied().collect();
            native.sort_unstable();
            for cell in native.into_iter().filter_map(|position| self.index.at(position)) {
                if root.push(cell.id(), cell.to_element()) {
                    native_cells += 1;
                }
            }

            for cell in crossing.into_iter().filter_map(|position| self.index.at(position)) {
                let reparent = cell.parent() != Some(layer_id);
                let element = if reparent {
                    cell.to_element_with_parent(layer_id)
                } else {
                    cell.to_element()
                };
                if root.push(cell.id(), element) {
                    crossing_cells += 1;
                    if reparent {
                        reparented_cells += 1;
                    }
                }
            }
        }

        let layer_id = layer_id.unwrap_or_default();
        debug!(
            layer_id,
            label,
            native_cells,
            crossing_cells,
            reparented_cells;
            "Layer extracted"
        );

        LayerExport {
            layer_id: layer_id.to_string(),
            label: label.to_string(),
            document: self.assemble(label, root.finish()),
            native_cells,
            crossing_cells,
            reparented_cells,
        }
    }

    /// Collects the descendants of the layer, mapping each id to the
    /// position of the cell it was first reached through. The layer itself
    /// is not included.
    fn closure(&self, layer_id: &'a str) -> HashMap<&'a str, usize> {
        let mut reached = HashMap::new();
        let mut queue = VecDeque::from([layer_id]);

        while let Some(id) = queue.pop_front() {
            for (position, child) in self.index.positioned_children(id) {
                let Some(child_id) = child.id() else { continue };
                if child_id == layer_id {
                    trace!(id = child_id; "Child already visited");
                    continue;
                }
                match reached.entry(child_id) {
                    Entry::Vacant(entry) => {
                        entry.insert(position);
                        queue.push_back(child_id);
                    }
                    Entry::Occupied(_) => trace!(id = child_id; "Child already visited"),
                }
            }
        }

        reached
    }

    /// Collects the positions of the edges touching the layer or its
    /// closure, and of the labels attached to them.
    fn crossing_cells(
        &self,
        layer_id: &str,
        reached: &HashMap<&'a str, usize>,
    ) -> BTreeSet<usize> {
        let mut crossing = BTreeSet::new();
        let mut edge_ids = Vec::new();

        for (position, edge) in self.index.positioned_edges() {
            let touches = edge.terminals().any(|terminal| {
                if self.index.position(terminal).is_none() {
                    trace!(id = terminal; "Skipping dangling reference");
                    return false;
                }
                terminal == layer_id || reached.contains_key(terminal)
            });
            if touches {
                crossing.insert(position);
                edge_ids.extend(edge.id());
            }
        }

        for edge_id in edge_ids {
            for (position, label) in self.index.positioned_children(edge_id) {
                if label.id().is_some() {
                    crossing.insert(position);
                }
            }
        }

        crossing
    }

    /// Wraps the output root container in a fresh `mxfile`, `diagram` and
    /// `mxGraphModel`.
    fn assemble(&self, label: &str, root: Element) -> Element {
        let source = self.structure.document();
        let mxfile = Element::new("mxfile")
            .with_attribute(
                "host",
                source
                    .attribute("host")
                    .unwrap_or(self.config.default_host()),
            )
            .with_attribute("agent", source.attribute("agent").unwrap_or_default())
            .with_attribute(
                "version",
                source
                    .attribute("version")
                    .unwrap_or(self.config.default_version()),
            );

        let diagram = Element::new("diagram").with_attribute("name", label).with_attribute(
            "id",
            self.structure
                .diagram()
                .attribute("id")
                .unwrap_or(DEFAULT_DIAGRAM_ID),
        );

        let mut graph_model = Element::new("mxGraphModel");
        for (key, value) in self.structure.graph_model().attributes() {
            graph_model.set_attribute(key, value);
        }

        mxfile.with_child(diagram.with_child(graph_model.with_child(root)))
    }
}

/// Output root container that emits every id at most once. Cells without
/// an id are always emitted.
struct RootBuilder {
    root: Element,
    added: HashSet<String>,
}

impl RootBuilder {
    fn new() -> Self {
        Self {
            root: Element::new("root"),
            added: HashSet::new(),
        }
    }

    /// Appends `element` unless `id` was already added. Returns whether it
    /// was appended.
    fn push(&mut self, id: Option<&str>, element: Element) -> bool {
        if let Some(id) = id {
            if !self.added.insert(id.to_string()) {
                return false;
            }
        }
        self.root.push_child(element);
        true
    }

    fn finish(self) -> Element {
        self.root
    }
}
