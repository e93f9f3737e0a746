//! Command-line argument definitions for the Strata CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document, the output
//! directory, the configuration file, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Strata layer splitter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input draw.io file
    #[arg(long, alias = "input_file", value_name = "PATH")]
    pub input_file: String,

    /// Directory the per-layer files are written to
    #[arg(long, alias = "output_dir", value_name = "DIR")]
    pub output_dir: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
