//! Writing exported layers to disk.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use strata_core::xml;

use crate::{error::StrataError, extract::LayerExport, extract::UNNAMED_LAYER};

/// Turns a layer label into a file stem.
///
/// Each run of characters other than ASCII letters, digits, `_`, `.` and `-`
/// becomes a single `_`, and underscores at either end are removed. Labels
/// that leave nothing behind are named `Unnamed_Layer`.
///
/// # Examples
///
/// ```
/// use strata::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Network / Core"), "Network_Core");
/// assert_eq!(sanitize_filename("v1.2-final"), "v1.2-final");
/// assert_eq!(sanitize_filename("***"), "Unnamed_Layer");
/// ```
pub fn sanitize_filename(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    let mut in_run = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            stem.push(ch);
            in_run = false;
        } else if !in_run {
            stem.push('_');
            in_run = true;
        }
    }

    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        UNNAMED_LAYER.to_string()
    } else {
        stem.to_string()
    }
}

/// A layer file that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenLayer {
    label: String,
    layer_id: String,
    path: PathBuf,
}

impl WrittenLayer {
    /// Returns the layer label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the id of the layer cell.
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Returns the path of the written file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes layer documents into one output directory.
///
/// The writer remembers the paths it produced so that a second layer whose
/// label sanitizes to the same name is reported before it overwrites the
/// first.
#[derive(Debug)]
pub struct LayerWriter {
    output_dir: PathBuf,
    extension: String,
    written: HashSet<PathBuf>,
}

impl LayerWriter {
    /// Creates a writer for `output_dir`. The directory is created on the
    /// first write.
    pub fn new(output_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: extension.into(),
            written: HashSet::new(),
        }
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the path a layer with `label` is written to.
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", sanitize_filename(label), self.extension))
    }

    /// Serializes `export` and writes it to its file.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Io`] if the directory cannot be created or the
    /// file cannot be written, and [`StrataError::Serialize`] if the document
    /// cannot be serialized.
    pub fn write(&mut self, export: &LayerExport) -> Result<WrittenLayer, StrataError> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|err| StrataError::io(&self.output_dir, err))?;

        let path = self.path_for(export.label());
        if self.written.contains(&path) {
            warn!(
                label = export.label(),
                path = path.display().to_string();
                "Layer file name already used, overwriting"
            );
        }

        let contents = xml::to_string(export.document()).map_err(|err| StrataError::Serialize {
            label: export.label().to_string(),
            source: err,
        })?;
        fs::write(&path, contents).map_err(|err| StrataError::io(&path, err))?;

        info!(
            label = export.label(),
            layer_id = export.layer_id(),
            path = path.display().to_string();
            "Layer written"
        );
        self.written.insert(path.clone());

        Ok(WrittenLayer {
            label: export.label().to_string(),
            layer_id: export.layer_id().to_string(),
            path,
        })
    }
}
