//! Error types for Astrolabe operations.
//!
//! [`AstrolabeError`] wraps everything that can go wrong between reading a
//! model and producing its class plans.

use std::io;

use thiserror::Error;

use astrolabe_core::{ModelError, resolve::UnresolvedReference};
use astrolabe_parser::ParseError;

/// The main error type for Astrolabe operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics so that
/// callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum AstrolabeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    /// A derivation was requested on an inconsistent or unresolved model.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Dangling references found while references were required to resolve.
    #[error("{} reference(s) could not be resolved", .0.len())]
    Unresolved(Vec<UnresolvedReference>),

    #[error("Export error: {0}")]
    Export(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AstrolabeError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
