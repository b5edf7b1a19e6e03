//! Arena handles and cross-references between model objects.
//!
//! A reference starts life as a [`PendingRef`] holding the target's id as
//! written in the source document. The resolver replaces it with a
//! [`Reference::Resolved`] handle, or with [`Reference::Unresolved`] when the id
//! is not registered. A reference is always in exactly one of these states.

use std::fmt;

use crate::identifier::Id;

use super::kinds::RoleEnd;

/// Handle of a classifier slot in a [`Document`](super::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassifierIdx(pub(crate) usize);

impl ClassifierIdx {
    /// Returns the arena position of this handle.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassifierIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "classifier#{}", self.0)
    }
}

/// Handle of an association slot in a [`Document`](super::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssociationIdx(pub(crate) usize);

impl AssociationIdx {
    /// Returns the arena position of this handle.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AssociationIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "association#{}", self.0)
    }
}

/// What a placeholder reference is expected to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A type position: attribute, parameter, return or template type.
    Type,
    /// An object position: association endpoint or superclassifier.
    Object,
}

/// A textual id standing in for an object reference until resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingRef {
    id: Id,
    kind: RefKind,
}

impl PendingRef {
    pub fn new(id: Id, kind: RefKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }
}

/// A reference from one model object to a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    /// Not yet looked up.
    Pending(PendingRef),
    /// Points at a live classifier in the same document.
    Resolved(ClassifierIdx),
    /// Looked up and not found; keeps the id that was expected.
    Unresolved(Id),
}

impl Reference {
    /// Creates a pending type reference to `id`.
    pub fn pending_type(id: Id) -> Self {
        Self::Pending(PendingRef::new(id, RefKind::Type))
    }

    /// Creates a pending object reference to `id`.
    pub fn pending_object(id: Id) -> Self {
        Self::Pending(PendingRef::new(id, RefKind::Object))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Returns the classifier handle if this reference is resolved.
    pub fn resolved(&self) -> Option<ClassifierIdx> {
        match self {
            Self::Resolved(idx) => Some(*idx),
            _ => None,
        }
    }
}

/// Type of an attribute, parameter, operation result or template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A literal type name that needs no resolution, such as `"int"`.
    Named(String),
    /// A classifier of the same document.
    Classifier(Reference),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Creates a type reference to the classifier with the given id.
    pub fn pending(id: Id) -> Self {
        Self::Classifier(Reference::pending_type(id))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Classifier(reference) if reference.is_pending())
    }

    pub(crate) fn reference_mut(&mut self) -> Option<&mut Reference> {
        match self {
            Self::Classifier(reference) => Some(reference),
            Self::Named(_) => None,
        }
    }
}

/// The field through which a model object holds a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefField {
    AttributeType,
    ParameterType,
    ReturnType,
    TemplateType,
    Superclassifier,
    RoleObject(RoleEnd),
}

impl fmt::Display for RefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeType => write!(f, "attribute type"),
            Self::ParameterType => write!(f, "parameter type"),
            Self::ReturnType => write!(f, "return type"),
            Self::TemplateType => write!(f, "template type"),
            Self::Superclassifier => write!(f, "superclassifier"),
            Self::RoleObject(end) => write!(f, "role {end} object"),
        }
    }
}
