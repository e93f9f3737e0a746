//! Error types for reading and writing XML.

use std::{io, str::Utf8Error, string::FromUtf8Error};

use quick_xml::{encoding::EncodingError, events::attributes::AttrError};
use thiserror::Error;

/// Errors produced while reading or writing an element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("unsupported text encoding: {0}")]
    Encoding(#[from] EncodingError),

    #[error("invalid UTF-8 in name: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(Utf8Error),

    #[error("serialized XML is not valid UTF-8: {0}")]
    Output(#[from] FromUtf8Error),

    #[error("failed to write XML: {0}")]
    Io(#[from] io::Error),

    #[error("closing tag `</{0}>` has no matching opening tag")]
    UnexpectedClose(String),

    #[error("input ended before `<{0}>` was closed")]
    Unclosed(String),

    #[error("document has more than one top-level element (found `<{0}>`)")]
    MultipleRoots(String),

    #[error("document has no top-level element")]
    NoRootElement,
}

/// An [`XmlError`] raised while parsing, with the byte offset it was detected
/// at.
#[derive(Debug, Error)]
#[error("{source} (at byte {offset})")]
pub struct ParseError {
    offset: usize,
    #[source]
    source: XmlError,
}

impl ParseError {
    /// Create a new parse error at `offset`.
    pub fn new(source: XmlError, offset: usize) -> Self {
        Self { offset, source }
    }

    /// Returns the byte offset into the input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the underlying error.
    pub fn kind(&self) -> &XmlError {
        &self.source
    }
}
