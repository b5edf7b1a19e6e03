//! Lazy recomputation of derived values.
//!
//! Every cached value remembers the generation of each classifier it read. A
//! model mutation assigns the touched classifiers a new generation, so a value
//! is reused only while all of those generations are unchanged.

use std::collections::{HashMap, hash_map::Entry};

use indexmap::IndexSet;
use log::trace;

use astrolabe_core::{
    ModelError,
    model::{ClassifierIdx, Document, Reference, RoleEnd, TypeRef},
};

use crate::{
    config::UnnamedRolePolicy,
    synthesis::{self, MemberSpec, ObligationSet},
};

#[derive(Debug)]
struct Cached<T> {
    value: T,
    dependencies: Vec<(ClassifierIdx, u64)>,
}

impl<T> Cached<T> {
    fn new(doc: &Document, value: T, read: impl IntoIterator<Item = ClassifierIdx>) -> Self {
        let dependencies = read
            .into_iter()
            .filter_map(|idx| doc.generation(idx).map(|generation| (idx, generation)))
            .collect();
        Self {
            value,
            dependencies,
        }
    }

    fn is_fresh(&self, doc: &Document) -> bool {
        self.dependencies
            .iter()
            .all(|(idx, generation)| doc.generation(*idx) == Some(*generation))
    }
}

/// Memoizes [`synthesis::members`] and [`synthesis::obligations`] per
/// classifier.
///
/// The cache holds classifier handles and must only be used with the document
/// it was first queried with.
#[derive(Debug, Default)]
pub struct DerivationCache {
    policy: UnnamedRolePolicy,
    members: HashMap<ClassifierIdx, Cached<Vec<MemberSpec>>>,
    obligations: HashMap<ClassifierIdx, Cached<ObligationSet>>,
    hits: usize,
    misses: usize,
}

impl DerivationCache {
    pub fn new(policy: UnnamedRolePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the members of `idx`, recomputing them if anything they were
    /// derived from has changed.
    pub fn members(&mut self, doc: &Document, idx: ClassifierIdx) -> Result<&[MemberSpec], ModelError> {
        ensure_resolved(doc, idx)?;
        match self.members.entry(idx) {
            Entry::Occupied(entry) if entry.get().is_fresh(doc) => {
                self.hits += 1;
                trace!(classifier:% = idx; "Members cache hit");
                Ok(entry.into_mut().value.as_slice())
            }
            entry => {
                self.misses += 1;
                let value = synthesis::members(doc, idx, &self.policy)?;
                let cached = Cached::new(doc, value, member_dependencies(doc, idx));
                Ok(entry.insert_entry(cached).into_mut().value.as_slice())
            }
        }
    }

    /// Returns the obligations of `idx`, recomputing them if the classifier, an
    /// ancestor, or a parameter type they mention has changed.
    pub fn obligations(&mut self, doc: &Document, idx: ClassifierIdx) -> Result<&ObligationSet, ModelError> {
        ensure_resolved(doc, idx)?;
        match self.obligations.entry(idx) {
            Entry::Occupied(entry) if entry.get().is_fresh(doc) => {
                self.hits += 1;
                trace!(classifier:% = idx; "Obligations cache hit");
                Ok(&entry.into_mut().value)
            }
            entry => {
                self.misses += 1;
                let derived = synthesis::obligations::derive(doc, idx)?;
                let cached = Cached::new(doc, derived.set, derived.read);
                Ok(&entry.insert_entry(cached).into_mut().value)
            }
        }
    }

    /// Drops every cached value.
    pub fn clear(&mut self) {
        self.members.clear();
        self.obligations.clear();
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of lookups that had to recompute.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

fn ensure_resolved(doc: &Document, idx: ClassifierIdx) -> Result<(), ModelError> {
    let classifier = doc
        .classifier(idx)
        .ok_or(ModelError::UnknownClassifier(idx))?;
    if doc.is_resolved() {
        Ok(())
    } else {
        Err(ModelError::NotResolved {
            id: classifier.id(),
        })
    }
}

/// Classifiers whose data feeds the members of `idx`: the classifier, its
/// attribute types and both endpoints of its associations.
fn member_dependencies(doc: &Document, idx: ClassifierIdx) -> IndexSet<ClassifierIdx> {
    let mut read = IndexSet::from([idx]);
    if let Some(classifier) = doc.classifier(idx) {
        for attribute in classifier.attributes() {
            if let TypeRef::Classifier(Reference::Resolved(target)) = attribute.type_ref {
                read.insert(target);
            }
        }
    }
    for (_, association) in doc.associations_of(idx) {
        for end in [RoleEnd::A, RoleEnd::B] {
            if let Some(endpoint) = association.role(end).object.resolved() {
                read.insert(endpoint);
            }
        }
    }
    read
}
