//! Derivation of generated-code obligations from a resolved model.
//!
//! - [`roles`]: which association roles embed into a classifier
//! - [`members`]: fields and accessors from attributes and roles
//! - [`obligations`]: abstract operations inherited through supertypes

pub mod members;
pub mod obligations;
pub mod roles;

pub use members::{
    Accessor, DefaultValue, MemberSource, MemberSpec, TypeDescriptor, members, synthesize_attribute,
    synthesize_role,
};
pub use obligations::{ObligationSet, OperationSignature, obligations};
pub use roles::{ForeignRole, foreign_roles};
