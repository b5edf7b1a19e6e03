//! # Astrolabe Parser
//!
//! Reader and writer for the Astrolabe model text format.
//!
//! Loading is two-phase. [`parse`] turns source text into a
//! [`Document`] whose cross-references are still pending, together with the
//! [`ResolutionContext`](astrolabe_core::resolve::ResolutionContext) indexing
//! every id the source defined. [`load`] also runs the reference resolver, so
//! forward references and dangling ids are handled in one place.
//!
//! ## Usage
//!
//! ```
//! # use astrolabe_parser::{load, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         class c_node Node;
//!         association as_tree aggregation {
//!             role a @c_node [name="parent", multiplicity="0..1"];
//!             role b @c_node [name="children", multiplicity="*"];
//!         }
//!     "#;
//!
//!     let loaded = load(source)?;
//!     assert!(loaded.report.is_clean());
//!     assert!(loaded.document.is_resolved());
//!     Ok(())
//! }
//! ```

mod build;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod span;
mod tokens;
mod writer;

pub use build::ParsedModel;
pub use error::ParseError;
pub use span::Span;
pub use writer::{ModelText, write};

use log::info;

use astrolabe_core::{
    model::Document,
    resolve::{self, ResolutionReport},
};

use build::Builder;

/// Parse source text into a document with pending references.
///
/// This runs the first phase of loading:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the AST from tokens
/// 3. **Build** - Create model objects and register every id
///
/// # Errors
///
/// Returns a [`ParseError`] with every diagnostic found by the phase that
/// failed.
pub fn parse(source: &str) -> Result<ParsedModel, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let ast = parser::build_model(&tokens)?;
    Builder::new().build(&ast)
}

/// A resolved document and the outcome of resolving it.
#[derive(Debug)]
pub struct LoadedModel {
    pub document: Document,
    /// Dangling references, if any. They are not an error at this level.
    pub report: ResolutionReport,
}

/// Parse source text and resolve every reference in it.
///
/// The id index built while parsing is dropped once resolution is done.
pub fn load(source: &str) -> Result<LoadedModel, ParseError> {
    let ParsedModel {
        mut document,
        context,
    } = parse(source)?;

    info!(ids = context.len(); "Resolving parsed model");
    let report = resolve::resolve_all(&mut document, &context);

    Ok(LoadedModel { document, report })
}
