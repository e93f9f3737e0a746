//! Loading a draw.io document and locating its graph.
//!
//! A [`Document`] owns the parsed element tree. [`Document::structure`]
//! locates the parts the exporter works on: the first `<diagram>`, its
//! `<mxGraphModel>` and the model's `<root>` container.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use strata_core::{element::Element, xml};

use crate::error::{StrataError, StructureError};

const MX_FILE: &str = "mxfile";
const DIAGRAM: &str = "diagram";
const GRAPH_MODEL: &str = "mxGraphModel";
const ROOT: &str = "root";

/// Origin reported for documents parsed from memory.
const IN_MEMORY: &str = "<memory>";

/// A parsed draw.io document.
#[derive(Debug, Clone)]
pub struct Document {
    origin: PathBuf,
    element: Element,
}

impl Document {
    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Io`] if the file cannot be read and
    /// [`StrataError::Xml`] if it is not UTF-8 or not well-formed XML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StrataError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Reading document");

        let bytes = fs::read(path).map_err(|err| StrataError::io(path, err))?;
        let element = xml::parse_bytes(&bytes).map_err(|err| StrataError::Xml {
            path: path.to_path_buf(),
            source: err,
            src: String::from_utf8_lossy(&bytes).into_owned(),
        })?;
        debug!(origin = path.display().to_string(); "Document parsed");
        Ok(Self {
            origin: path.to_path_buf(),
            element,
        })
    }

    /// Parses a document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Xml`] if `source` is not well-formed XML.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Document;
    ///
    /// let document = Document::parse(
    ///     r#"<mxfile><diagram id="d"><mxGraphModel><root/></mxGraphModel></diagram></mxfile>"#,
    /// )
    /// .unwrap();
    /// assert!(document.structure().is_ok());
    /// ```
    pub fn parse(source: &str) -> Result<Self, StrataError> {
        Self::parse_with_origin(source, IN_MEMORY)
    }

    fn parse_with_origin(source: &str, origin: impl Into<PathBuf>) -> Result<Self, StrataError> {
        let origin = origin.into();
        let element = xml::parse(source).map_err(|err| StrataError::Xml {
            path: origin.clone(),
            source: err,
            src: source.to_string(),
        })?;
        debug!(origin = origin.display().to_string(); "Document parsed");
        Ok(Self { origin, element })
    }

    /// Returns the path the document was read from, or `<memory>`.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Returns the document element.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Locates the first diagram, its graph model and the model's root
    /// container.
    ///
    /// The graph model is looked up among the diagram's direct children
    /// first, then anywhere below the diagram.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Structure`] naming the first missing element.
    pub fn structure(&self) -> Result<Structure<'_>, StrataError> {
        locate(&self.element).map_err(|err| StrataError::structure(&self.origin, err))
    }
}

/// The parts of a [`Document`] that layer export reads.
#[derive(Debug, Clone, Copy)]
pub struct Structure<'a> {
    document: &'a Element,
    diagram: &'a Element,
    graph_model: &'a Element,
    root: &'a Element,
}

impl<'a> Structure<'a> {
    /// Returns the document element (`<mxfile>`).
    pub fn document(&self) -> &'a Element {
        self.document
    }

    /// Returns the first `<diagram>`.
    pub fn diagram(&self) -> &'a Element {
        self.diagram
    }

    /// Returns the diagram's `<mxGraphModel>`.
    pub fn graph_model(&self) -> &'a Element {
        self.graph_model
    }

    /// Returns the graph model's `<root>` container.
    pub fn root(&self) -> &'a Element {
        self.root
    }
}

fn locate(document: &Element) -> Result<Structure<'_>, StructureError> {
    let diagram = document.find_child(DIAGRAM).ok_or_else(|| {
        if document.name() == MX_FILE {
            StructureError::MissingDiagram
        } else {
            StructureError::NotDrawio {
                found: document.name().to_string(),
            }
        }
    })?;

    let graph_model = diagram
        .find_child(GRAPH_MODEL)
        .or_else(|| diagram.find_descendant(GRAPH_MODEL))
        .ok_or_else(|| {
            let name = diagram
                .attribute("name")
                .or_else(|| diagram.attribute("id"))
                .unwrap_or_default()
                .to_string();
            if diagram.text().trim().is_empty() {
                StructureError::MissingGraphModel { diagram: name }
            } else {
                StructureError::CompressedDiagram { diagram: name }
            }
        })?;

    let root = graph_model
        .find_child(ROOT)
        .ok_or(StructureError::MissingRoot)?;

    Ok(Structure {
        document,
        diagram,
        graph_model,
        root,
    })
}
