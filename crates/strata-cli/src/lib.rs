//! CLI logic for the Strata layer splitter.
//!
//! This module contains the core CLI logic: configuration lookup, the export
//! pipeline, and the progress lines printed for each written layer.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::info;

use strata::{LayerSplitter, StrataError, WrittenLayer};

/// Run the Strata CLI application
///
/// This function loads the configuration, splits the input document into
/// one file per layer in the output directory, and prints a line for each
/// file written.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StrataError` for:
/// - Configuration loading errors
/// - File I/O errors
/// - Malformed or non-draw.io input
/// - Documents without layers
pub fn run(args: &Args) -> Result<Vec<WrittenLayer>, StrataError> {
    info!(
        input_path = args.input_file,
        output_dir = args.output_dir;
        "Splitting document into layers"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Export every layer, reporting each file as it lands
    let splitter = LayerSplitter::new(app_config);
    let written = splitter.export_with(&args.input_file, &args.output_dir, |layer| {
        println!(
            "Exported layer '{}' to '{}'",
            layer.label(),
            layer.path().display()
        );
    })?;

    info!(layers = written.len(); "Layers exported successfully");

    Ok(written)
}
