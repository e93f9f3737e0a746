//! Strata - split draw.io documents into one standalone document per layer.
//!
//! A draw.io diagram groups its cells into layers: the direct children of the
//! model's root cell. Strata loads a document, indexes its cells and writes
//! one self-contained document per layer. Each output holds the layer, every
//! cell nested below it, and the edges that connect it to other layers.

pub mod config;

mod document;
mod error;
mod extract;
mod index;
mod writer;

pub use strata_core::{cell, element, xml};

pub use document::{Document, Structure};
pub use error::{StrataError, StructureError};
pub use extract::{LayerExport, LayerExtractor, UNNAMED_LAYER};
pub use index::CellIndex;
pub use writer::{LayerWriter, WrittenLayer, sanitize_filename};

use std::path::Path;

use log::{error, info};

use config::{AppConfig, WriteFailurePolicy};

/// Splits draw.io documents into per-layer documents.
///
/// # Examples
///
/// ```rust,no_run
/// use strata::{LayerSplitter, config::AppConfig};
///
/// let splitter = LayerSplitter::new(AppConfig::default());
///
/// // Load, extract and write every layer in one go
/// let written = splitter
///     .export("diagram.drawio", "layers")
///     .expect("Failed to export layers");
///
/// for layer in &written {
///     println!("{} -> {}", layer.label(), layer.path().display());
/// }
/// ```
#[derive(Debug, Default)]
pub struct LayerSplitter {
    config: AppConfig,
}

impl LayerSplitter {
    /// Create a new splitter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StrataError` if the file cannot be read or is not well-formed
    /// XML.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, StrataError> {
        Document::from_file(path)
    }

    /// Extract every layer of `document`, in document order.
    ///
    /// # Errors
    ///
    /// Returns `StrataError::Structure` if the document has no graph model,
    /// no layers, or duplicate ids the configuration rejects.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::{Document, LayerSplitter};
    ///
    /// let document = Document::parse(
    ///     r#"<mxfile><diagram id="d"><mxGraphModel><root>
    ///          <mxCell id="0"/>
    ///          <mxCell id="1" parent="0" value="Base"/>
    ///          <mxCell id="2" parent="1" vertex="1"/>
    ///        </root></mxGraphModel></diagram></mxfile>"#,
    /// )
    /// .unwrap();
    ///
    /// let layers = LayerSplitter::default().extract(&document).unwrap();
    /// assert_eq!(layers.len(), 1);
    /// assert_eq!(layers[0].label(), "Base");
    /// ```
    pub fn extract(&self, document: &Document) -> Result<Vec<LayerExport>, StrataError> {
        let structure = document.structure()?;
        let extractor = LayerExtractor::new(structure, self.config.document())
            .map_err(|err| StrataError::structure(document.origin(), err))?;
        let layers = extractor
            .layers()
            .map_err(|err| StrataError::structure(document.origin(), err))?;

        info!(
            cells = extractor.index().len(),
            layers = layers.len();
            "Extracting layers"
        );
        Ok(layers
            .into_iter()
            .map(|layer| extractor.extract(layer))
            .collect())
    }

    /// Read `input`, then write one file per layer into `output_dir`.
    ///
    /// # Errors
    ///
    /// See [`LayerSplitter::export_with`].
    pub fn export(
        &self,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<Vec<WrittenLayer>, StrataError> {
        self.export_with(input, output_dir, |_| {})
    }

    /// Read `input`, then write one file per layer into `output_dir`, calling
    /// `on_written` after each file.
    ///
    /// # Errors
    ///
    /// Returns `StrataError` if the input cannot be loaded or has no layers,
    /// and `StrataError::Config` if the configuration fails
    /// [`AppConfig::validate`]; nothing is written then. Write failures follow [`WriteFailurePolicy`]: `Abort` returns the
    /// first one, `Continue` writes the remaining layers and then returns
    /// `StrataError::PartialExport`. Files written before a failure are kept.
    pub fn export_with(
        &self,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        on_written: impl FnMut(&WrittenLayer),
    ) -> Result<Vec<WrittenLayer>, StrataError> {
        let document = self.load(input)?;
        self.export_document(&document, output_dir, on_written)
    }

    /// Write one file per layer of an already loaded document.
    ///
    /// # Errors
    ///
    /// See [`LayerSplitter::export_with`].
    pub fn export_document(
        &self,
        document: &Document,
        output_dir: impl AsRef<Path>,
        mut on_written: impl FnMut(&WrittenLayer),
    ) -> Result<Vec<WrittenLayer>, StrataError> {
        self.config.validate().map_err(StrataError::Config)?;
        let exports = self.extract(document)?;

        let export_config = self.config.export();
        let mut writer = LayerWriter::new(output_dir.as_ref(), export_config.extension());
        let mut written = Vec::with_capacity(exports.len());
        let mut failed = Vec::new();

        for export in &exports {
            match writer.write(export) {
                Ok(layer) => {
                    on_written(&layer);
                    written.push(layer);
                }
                Err(err) => match export_config.on_write_error() {
                    WriteFailurePolicy::Abort => return Err(err),
                    WriteFailurePolicy::Continue => {
                        error!(label = export.label(), err:err; "Layer export failed, continuing");
                        failed.push(export.label().to_string());
                    }
                },
            }
        }

        if !failed.is_empty() {
            return Err(StrataError::PartialExport {
                failed,
                written: written.len(),
            });
        }

        info!(
            layers = written.len(),
            output_dir = writer.output_dir().display().to_string();
            "Export complete"
        );
        Ok(written)
    }
}
