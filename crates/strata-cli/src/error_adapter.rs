//! Error adapter for converting StrataError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! Malformed XML is rendered with a snippet of the input pointing at the
//! offending position. Every other error is rendered with a code and, where
//! one helps, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use strata::{StrataError, StructureError};

/// Adapter for an XML parse error with its source text.
pub struct XmlDiagnosticAdapter<'a> {
    /// The wrapped error
    err: &'a StrataError,
    /// Byte offset of the problem
    offset: usize,
    /// Source text for displaying snippets
    src: &'a str,
}

impl<'a> XmlDiagnosticAdapter<'a> {
    /// Create a new adapter for `err` detected at `offset` in `src`.
    pub fn new(err: &'a StrataError, offset: usize, src: &'a str) -> Self {
        Self { err, offset, src }
    }
}

impl fmt::Debug for XmlDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDiagnosticAdapter")
            .field("err", &self.err)
            .field("offset", &self.offset)
            .finish()
    }
}

impl fmt::Display for XmlDiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for XmlDiagnosticAdapter<'_> {}

impl MietteDiagnostic for XmlDiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("strata::xml"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "the input must be an uncompressed draw.io file saved as XML",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.offset.min(self.src.len());
        let span = SourceSpan::new(offset.into(), 0);
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span,
        ))))
    }
}

/// Adapter for [`StrataError`] variants without a source position.
pub struct ErrorAdapter<'a>(pub &'a StrataError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StrataError::Io { .. } => "strata::io",
            StrataError::Xml { .. } => "strata::xml",
            StrataError::Structure { .. } => "strata::structure",
            StrataError::Serialize { .. } => "strata::serialize",
            StrataError::Config(_) => "strata::config",
            StrataError::PartialExport { .. } => "strata::partial_export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            StrataError::Structure { source, .. } => match source {
                StructureError::CompressedDiagram { .. } => {
                    "save the diagram uncompressed (File > Properties > Compressed) and try again"
                }
                StructureError::NoLayers => "a layer is a cell whose parent is the root cell \"0\"",
                StructureError::DuplicateId { .. } => {
                    "set `duplicate_ids = \"last_wins\"` in the [document] configuration to accept the file"
                }
                _ => return None,
            },
            StrataError::PartialExport { .. } => {
                "the remaining layers were written; see the log for each failure"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either an XML diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A malformed XML error with source location information.
    Diagnostic(XmlDiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`StrataError`] into a list of reportable errors.
///
/// Malformed XML becomes a [`Reportable::Diagnostic`] pointing into the
/// input. Everything else is a single [`Reportable::Error`].
pub fn to_reportables(err: &StrataError) -> Vec<Reportable<'_>> {
    match err {
        StrataError::Xml { source, src, .. } => {
            vec![Reportable::Diagnostic(XmlDiagnosticAdapter::new(
                err,
                source.offset(),
                src,
            ))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
