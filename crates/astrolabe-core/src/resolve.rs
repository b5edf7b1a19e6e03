//! Id-to-object fix-up.
//!
//! Loading a document is two-phase. The loader first registers every object
//! it creates in a [`ResolutionContext`], leaving cross-references as
//! [`Reference::Pending`] placeholders; forward references are expected. Once
//! the whole document is loaded, [`resolve_all`] replaces each placeholder with
//! a handle, or marks it [`Reference::Unresolved`] and records why.
//!
//! The context is scoped to one load and is dropped once resolution is done.

use std::{collections::HashMap, fmt};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    error::ModelError,
    identifier::Id,
    model::{AssociationIdx, ClassifierIdx, Document, RefField, Reference, RoleEnd},
};

/// What an id names inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectHandle {
    Classifier(ClassifierIdx),
    Association(AssociationIdx),
    Attribute { owner: ClassifierIdx },
    Operation { owner: ClassifierIdx },
    Parameter { owner: ClassifierIdx },
    Template { owner: ClassifierIdx },
}

/// The id→object index of one load.
#[derive(Debug, Default, Clone)]
pub struct ResolutionContext {
    objects: HashMap<Id, ObjectHandle>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`. Fails if it is already taken.
    pub fn register(&mut self, id: Id, handle: ObjectHandle) -> Result<(), ModelError> {
        if self.objects.contains_key(&id) {
            return Err(ModelError::DuplicateId { id });
        }
        self.objects.insert(id, handle);
        Ok(())
    }

    pub fn lookup(&self, id: Id) -> Option<ObjectHandle> {
        self.objects.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Builds the index of every object currently in `doc`.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let mut ctx = Self::new();
        for (idx, classifier) in doc.classifiers() {
            ctx.register(classifier.id(), ObjectHandle::Classifier(idx))?;
            for attr in classifier.attributes() {
                ctx.register(attr.info.id, ObjectHandle::Attribute { owner: idx })?;
            }
            for op in classifier.operations() {
                ctx.register(op.info.id, ObjectHandle::Operation { owner: idx })?;
                for param in &op.parameters {
                    ctx.register(param.info.id, ObjectHandle::Parameter { owner: idx })?;
                }
            }
            for template in classifier.templates() {
                ctx.register(template.info.id, ObjectHandle::Template { owner: idx })?;
            }
        }
        for (idx, assoc) in doc.associations() {
            ctx.register(assoc.id(), ObjectHandle::Association(idx))?;
        }
        Ok(ctx)
    }
}

/// Why a reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No object is registered under the id.
    NotFound,
    /// The id names an object that is not a classifier.
    KindMismatch,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "does not exist"),
            Self::KindMismatch => write!(f, "is not a classifier"),
        }
    }
}

/// A reference that remained dangling after [`resolve_all`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field} of `{holder}` refers to `{expected}`, which {reason}")]
pub struct UnresolvedReference {
    /// Id of the object holding the reference.
    pub holder: Id,
    pub field: RefField,
    pub expected: Id,
    pub reason: UnresolvedReason,
}

/// Outcome of one [`resolve_all`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Number of placeholders replaced with a handle.
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl ResolutionReport {
    /// Returns `true` when every reference was resolved.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replaces every pending reference in `doc` using `ctx`.
///
/// Lookup failures are collected in the report and never abort the pass.
/// Association endpoints are registered in the back-references of the
/// classifiers they point at, and every classifier whose references changed
/// gets a new generation. Running the pass again on a resolved document changes
/// nothing and returns an empty report.
pub fn resolve_all(doc: &mut Document, ctx: &ResolutionContext) -> ResolutionReport {
    info!(objects = ctx.len(); "Resolving references");

    let live = doc.classifier_liveness();
    let lookup = |id: Id| -> Result<ClassifierIdx, UnresolvedReason> {
        match ctx.lookup(id) {
            Some(ObjectHandle::Classifier(idx)) if live.get(idx.index()).copied().unwrap_or(false) => {
                Ok(idx)
            }
            Some(ObjectHandle::Classifier(_)) | None => Err(UnresolvedReason::NotFound),
            Some(_) => Err(UnresolvedReason::KindMismatch),
        }
    };

    let mut report = ResolutionReport::default();
    let mut fix_up = |holder: Id, field: RefField, reference: &mut Reference| -> bool {
        let Reference::Pending(pending) = *reference else {
            return false;
        };
        match lookup(pending.id()) {
            Ok(target) => {
                *reference = Reference::Resolved(target);
                report.resolved += 1;
            }
            Err(reason) => {
                *reference = Reference::Unresolved(pending.id());
                let unresolved = UnresolvedReference {
                    holder,
                    field,
                    expected: pending.id(),
                    reason,
                };
                warn!(holder:% = holder, expected:% = pending.id(); "{unresolved}");
                report.unresolved.push(unresolved);
            }
        }
        true
    };

    let mut changed = Vec::new();
    for (idx, classifier) in doc.classifiers_mut() {
        let mut touched = false;
        classifier.for_each_reference_mut(|holder, field, reference| {
            touched |= fix_up(holder, field, reference);
        });
        if touched {
            changed.push(idx);
        }
    }

    let mut endpoints = Vec::new();
    for (assoc_idx, assoc) in doc.associations_mut() {
        let holder = assoc.id();
        for end in [RoleEnd::A, RoleEnd::B] {
            let role = assoc.role_mut(end);
            fix_up(holder, RefField::RoleObject(end), &mut role.object);
            if let Some(target) = role.object.resolved() {
                endpoints.push((target, assoc_idx));
            }
        }
    }

    for idx in changed {
        doc.touch(idx);
    }
    let registered = endpoints
        .into_iter()
        .filter(|(target, assoc_idx)| doc.register_association(*target, *assoc_idx))
        .count();
    doc.mark_resolved();

    debug!(
        resolved = report.resolved,
        unresolved = report.unresolved.len(),
        back_references = registered;
        "Resolution finished"
    );
    report
}
