//! The Model Graph: classifiers, their members, associations, and the
//! document arena that owns them.

mod association;
mod classifier;
mod document;
mod kinds;
mod reference;

pub use association::{Association, Role};
pub use classifier::{Attribute, Classifier, ObjectInfo, Operation, Parameter, Template};
pub use document::Document;
pub use kinds::{AssociationKind, Changeability, ClassifierKind, RoleEnd, Visibility};
pub use reference::{AssociationIdx, ClassifierIdx, PendingRef, RefField, RefKind, Reference, TypeRef};
