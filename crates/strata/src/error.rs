//! Error types for Strata operations.
//!
//! [`StrataError`] is returned by every fallible operation of the crate.
//! Problems with the shape of the input document are described by
//! [`StructureError`] and wrapped together with the path of the document.
//!
//! References that do not resolve (a `parent`, `source` or `target` naming an
//! id that no cell carries) are not errors: the relationship is simply not
//! materialized in the output.

use std::{io, path::PathBuf};

use thiserror::Error;

use strata_core::error::{ParseError, XmlError};

/// A required structural element is missing or the document is malformed.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("document element is `<{found}>`, expected `<mxfile>`")]
    NotDrawio { found: String },

    #[error("no <diagram> element found")]
    MissingDiagram,

    #[error("diagram `{diagram}` has no <mxGraphModel>")]
    MissingGraphModel { diagram: String },

    #[error("diagram `{diagram}` is stored compressed")]
    CompressedDiagram { diagram: String },

    #[error("no <root> element under <mxGraphModel>")]
    MissingRoot,

    #[error("no layers found (no cell with parent=\"0\")")]
    NoLayers,

    #[error("cell id `{id}` is used by more than one element")]
    DuplicateId { id: String },
}

/// The main error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{}`: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: ParseError,
        /// The document text, for pointing at the error position.
        src: String,
    },

    #[error("invalid document `{}`: {source}", .path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: StructureError,
    },

    #[error("failed to serialize layer `{label}`: {source}")]
    Serialize {
        label: String,
        #[source]
        source: XmlError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} layer export(s) failed ({written} written): {}", .failed.len(), .failed.join(", "))]
    PartialExport { failed: Vec<String>, written: usize },
}

impl StrataError {
    /// Create a new `Io` error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new `Structure` error for the document at `path`.
    pub fn structure(path: impl Into<PathBuf>, source: StructureError) -> Self {
        Self::Structure {
            path: path.into(),
            source,
        }
    }
}
