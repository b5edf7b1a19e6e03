//! Errors raised by model graph operations.

use thiserror::Error;

use crate::{
    identifier::Id,
    model::{AssociationIdx, ClassifierIdx},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Duplicate id `{id}`")]
    DuplicateId { id: Id },

    /// Derivation was requested while `id` still holds a pending reference.
    #[error("`{id}` has not been resolved yet")]
    NotResolved { id: Id },

    #[error("No live classifier at {0}")]
    UnknownClassifier(ClassifierIdx),

    #[error("No live association at {0}")]
    UnknownAssociation(AssociationIdx),

    #[error("`{owner}` has no member `{member}`")]
    UnknownMember { owner: Id, member: Id },
}
