//! Configuration types for layer export.
//!
//! All types implement [`serde::Deserialize`] and default every field, so a
//! configuration file only needs to name the settings it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining document and export settings.
//! - [`DocumentConfig`] - How the source document is read and which metadata
//!   fallbacks are written.
//! - [`ExportConfig`] - Output file naming and failure handling.
//!
//! # Example
//!
//! ```
//! # use strata::config::{AppConfig, WriteFailurePolicy};
//! let config = AppConfig::default();
//! assert_eq!(config.export().extension(), "drawio");
//! assert_eq!(config.export().on_write_error(), WriteFailurePolicy::Abort);
//! ```

use serde::Deserialize;

/// Host written when the source document does not name one.
pub const DEFAULT_HOST: &str = "app.diagrams.net";

/// Format version written when the source document does not name one.
pub const DEFAULT_VERSION: &str = "28.0.7";

/// Extension of exported files, without the leading dot.
pub const DEFAULT_EXTENSION: &str = "drawio";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Document reading section.
    #[serde(default)]
    document: DocumentConfig,

    /// Export section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(document: DocumentConfig, export: ExportConfig) -> Self {
        Self { document, export }
    }

    /// Returns the document configuration.
    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Checks values that deserialize but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        let extension = self.export.extension();
        if extension.is_empty() {
            return Err("export.extension must not be empty".to_string());
        }
        if extension.contains(['/', '\\']) {
            return Err(format!(
                "export.extension must not contain path separators: `{extension}`"
            ));
        }
        Ok(())
    }
}

/// What to do when the same cell id appears on more than one element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Keep the element seen last and log a warning.
    #[default]
    LastWins,
    /// Reject the document.
    Reject,
}

/// What to do when writing one layer's file fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// Stop at the first failure. Files already written are kept.
    #[default]
    Abort,
    /// Skip the failed layer, write the remaining ones, then report every
    /// failure together.
    Continue,
}

/// Settings for reading the source document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    duplicate_ids: DuplicateIdPolicy,
    default_host: String,
    default_version: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            duplicate_ids: DuplicateIdPolicy::default(),
            default_host: DEFAULT_HOST.to_string(),
            default_version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl DocumentConfig {
    /// Creates a new [`DocumentConfig`].
    ///
    /// # Arguments
    ///
    /// * `duplicate_ids` - Handling of cell ids used more than once.
    /// * `default_host` - `host` written when the source has none.
    /// * `default_version` - `version` written when the source has none.
    pub fn new(
        duplicate_ids: DuplicateIdPolicy,
        default_host: impl Into<String>,
        default_version: impl Into<String>,
    ) -> Self {
        Self {
            duplicate_ids,
            default_host: default_host.into(),
            default_version: default_version.into(),
        }
    }

    /// Returns the duplicate id policy.
    pub fn duplicate_ids(&self) -> DuplicateIdPolicy {
        self.duplicate_ids
    }

    /// Returns the fallback `host` attribute.
    pub fn default_host(&self) -> &str {
        &self.default_host
    }

    /// Returns the fallback `version` attribute.
    pub fn default_version(&self) -> &str {
        &self.default_version
    }
}

/// Settings for writing exported layers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    extension: String,
    on_write_error: WriteFailurePolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            on_write_error: WriteFailurePolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Creates a new [`ExportConfig`].
    pub fn new(extension: impl Into<String>, on_write_error: WriteFailurePolicy) -> Self {
        Self {
            extension: extension.into(),
            on_write_error,
        }
    }

    /// Returns the file extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Returns the write failure policy.
    pub fn on_write_error(&self) -> WriteFailurePolicy {
        self.on_write_error
    }
}
