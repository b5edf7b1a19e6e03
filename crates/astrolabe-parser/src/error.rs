//! Diagnostics for the model text format.
//!
//! Every phase of loading (lexing, parsing, building the document) reports
//! problems as [`Diagnostic`]s: a severity, an [`ErrorCode`], one or more
//! labelled source spans and optional help. A failed load returns them all
//! wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use astrolabe_parser::error::{Diagnostic, ErrorCode};
//! # use astrolabe_parser::Span;
//!
//! let span = Span::new(100..120);
//! let first = Span::new(50..70);
//!
//! let diag = Diagnostic::error("id `c_book` is defined more than once")
//!     .with_code(ErrorCode::E200)
//!     .with_label(span, "duplicate definition")
//!     .with_secondary_label(first, "first defined here")
//!     .with_help("ids must be unique within a model");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
