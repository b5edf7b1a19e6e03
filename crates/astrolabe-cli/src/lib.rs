//! Astrolabe CLI library
//!
//! This module contains the core CLI logic for the Astrolabe class-model tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use astrolabe::{AstrolabeError, ModelBuilder};

/// Run the Astrolabe CLI application
///
/// This function loads the input model, resolves its references, derives the
/// class plan of every classifier and writes them to the output file as TOML.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `AstrolabeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Dangling references when `--strict` is set
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), AstrolabeError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        strict = args.strict;
        "Processing model"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = ModelBuilder::new(app_config);
    let loaded = builder.parse(&source)?;

    for reference in &loaded.report.unresolved {
        warn!(holder:% = reference.holder, expected:% = reference.expected; "{reference}");
    }
    if args.strict && !loaded.report.is_clean() {
        return Err(AstrolabeError::Unresolved(loaded.report.unresolved));
    }

    let plans = builder.plan(&loaded.document)?;
    let output = toml::to_string(&plans).map_err(|err| AstrolabeError::Export(Box::new(err)))?;

    fs::write(&args.output, output)?;

    info!(output_file = args.output, classes = plans.classes.len(); "Class plans exported successfully");

    Ok(())
}
