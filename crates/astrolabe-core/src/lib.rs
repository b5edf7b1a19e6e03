//! Astrolabe Core Types
//!
//! This crate holds the Model Graph shared by the Astrolabe pipeline:
//!
//! - **Identifiers**: string-interned object ids ([`identifier::Id`])
//! - **Model**: classifiers, associations and the owning [`model::Document`]
//! - **Multiplicity**: parsing and classification of role multiplicities
//! - **Resolve**: the per-load id index and the reference fix-up pass
//!   ([`resolve::resolve_all`])

pub mod error;
pub mod identifier;
pub mod model;
pub mod multiplicity;
pub mod resolve;

pub use error::ModelError;
