//! The arena that owns every classifier and association of one loaded model.

use log::debug;

use crate::{error::ModelError, identifier::Id};

use super::{
    association::{Association, Role},
    classifier::{Attribute, Classifier, Operation},
    kinds::{Changeability, RoleEnd},
    reference::{AssociationIdx, ClassifierIdx, Reference, TypeRef},
};

/// A loaded class model.
///
/// Classifiers and associations live in two arenas addressed by
/// [`ClassifierIdx`] and [`AssociationIdx`]. Removed objects leave an empty
/// slot behind and slots are never reused, so a stale handle can only ever
/// observe "no object", never a different one.
///
/// Every structural change to a classifier (or to an association it takes part
/// in) assigns it a fresh generation number taken from a document-wide
/// revision counter.
///
/// # Examples
///
/// ```
/// use astrolabe_core::{
///     identifier::Id,
///     model::{Classifier, ClassifierKind, Document, ObjectInfo},
/// };
///
/// let mut doc = Document::new();
/// let book = doc
///     .add_classifier(Classifier::new(
///         ObjectInfo::new(Id::new("c_book"), "Book"),
///         ClassifierKind::Class,
///     ))
///     .unwrap();
///
/// assert_eq!(doc.find_classifier(Id::new("c_book")), Some(book));
/// assert!(doc.is_resolved());
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    name: Option<String>,
    classifiers: Vec<Option<Classifier>>,
    associations: Vec<Option<Association>>,
    revision: u64,
    resolved: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            name: None,
            classifiers: Vec::new(),
            associations: Vec::new(),
            revision: 0,
            resolved: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` once every reference in the document has been looked up.
    ///
    /// Adding an object that holds a pending reference clears the flag until
    /// the next resolve pass.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn classifier(&self, idx: ClassifierIdx) -> Option<&Classifier> {
        self.classifiers.get(idx.0).and_then(Option::as_ref)
    }

    pub fn association(&self, idx: AssociationIdx) -> Option<&Association> {
        self.associations.get(idx.0).and_then(Option::as_ref)
    }

    pub fn contains_classifier(&self, idx: ClassifierIdx) -> bool {
        self.classifier(idx).is_some()
    }

    /// Iterates over live classifiers in insertion order.
    pub fn classifiers(&self) -> impl Iterator<Item = (ClassifierIdx, &Classifier)> {
        self.classifiers
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ClassifierIdx(i), c)))
    }

    /// Iterates over live associations in insertion order.
    pub fn associations(&self) -> impl Iterator<Item = (AssociationIdx, &Association)> {
        self.associations
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|a| (AssociationIdx(i), a)))
    }

    /// Iterates over the live associations that have `idx` as an endpoint, in
    /// the order they were registered.
    pub fn associations_of(
        &self,
        idx: ClassifierIdx,
    ) -> impl Iterator<Item = (AssociationIdx, &Association)> {
        self.classifier(idx)
            .into_iter()
            .flat_map(|classifier| classifier.associations.iter())
            .filter_map(|assoc_idx| self.association(*assoc_idx).map(|a| (*assoc_idx, a)))
    }

    pub fn find_classifier(&self, id: Id) -> Option<ClassifierIdx> {
        self.classifiers()
            .find(|(_, classifier)| classifier.id() == id)
            .map(|(idx, _)| idx)
    }

    pub fn generation(&self, idx: ClassifierIdx) -> Option<u64> {
        self.classifier(idx).map(Classifier::generation)
    }

    /// Returns the direct supertypes of `idx`: its resolved superclassifier
    /// references followed by the B endpoint of every generalization or
    /// realization whose A endpoint is `idx`. Duplicates are dropped.
    pub fn supertypes(&self, idx: ClassifierIdx) -> Vec<ClassifierIdx> {
        let Some(classifier) = self.classifier(idx) else {
            return Vec::new();
        };

        let explicit = classifier
            .superclassifiers()
            .iter()
            .filter_map(Reference::resolved);
        let inherited = self
            .associations_of(idx)
            .filter(|(_, assoc)| assoc.kind().is_inheritance())
            .filter(|(_, assoc)| assoc.role_a().object.resolved() == Some(idx))
            .filter_map(|(_, assoc)| assoc.role_b().object.resolved());

        let mut supertypes = Vec::new();
        for candidate in explicit.chain(inherited) {
            if self.contains_classifier(candidate) && !supertypes.contains(&candidate) {
                supertypes.push(candidate);
            }
        }
        supertypes
    }

    /// Adds a classifier and returns its handle.
    ///
    /// Association back-references are owned by the document; any the caller
    /// filled in are discarded.
    pub fn add_classifier(&mut self, mut classifier: Classifier) -> Result<ClassifierIdx, ModelError> {
        let idx = ClassifierIdx(self.classifiers.len());
        let mut dangling = None;
        classifier.for_each_reference_mut(|_, _, reference| {
            if let Reference::Resolved(target) = *reference {
                if target != idx && !self.contains_classifier(target) {
                    dangling = Some(target);
                }
            }
        });
        if let Some(target) = dangling {
            return Err(ModelError::UnknownClassifier(target));
        }

        if classifier.has_pending_refs() {
            self.resolved = false;
        }
        classifier.associations.clear();
        classifier.generation = self.next_revision();
        self.classifiers.push(Some(classifier));
        Ok(idx)
    }

    /// Adds an association and registers it with every resolved endpoint.
    pub fn add_association(&mut self, association: Association) -> Result<AssociationIdx, ModelError> {
        for end in [RoleEnd::A, RoleEnd::B] {
            self.check_reference(&association.role(end).object)?;
        }

        if association.has_pending_refs() {
            self.resolved = false;
        }
        let idx = AssociationIdx(self.associations.len());
        let endpoints = [
            association.role_a().object.resolved(),
            association.role_b().object.resolved(),
        ];
        self.associations.push(Some(association));
        for endpoint in endpoints.into_iter().flatten() {
            self.register_association(endpoint, idx);
        }
        Ok(idx)
    }

    pub fn add_attribute(&mut self, idx: ClassifierIdx, attribute: Attribute) -> Result<(), ModelError> {
        self.check_type_ref(&attribute.type_ref)?;
        let pending = attribute.type_ref.is_pending();
        self.classifier_mut(idx)?.attributes_mut().push(attribute);
        self.after_insert(idx, pending);
        Ok(())
    }

    pub fn remove_attribute(&mut self, idx: ClassifierIdx, id: Id) -> Result<Attribute, ModelError> {
        let classifier = self.classifier_mut(idx)?;
        let owner = classifier.id();
        let attributes = classifier.attributes_mut();
        let position = attributes
            .iter()
            .position(|attr| attr.info.id == id)
            .ok_or(ModelError::UnknownMember { owner, member: id })?;
        let removed = attributes.remove(position);
        self.touch(idx);
        Ok(removed)
    }

    pub fn add_operation(&mut self, idx: ClassifierIdx, operation: Operation) -> Result<(), ModelError> {
        for param in &operation.parameters {
            self.check_type_ref(&param.type_ref)?;
        }
        if let Some(return_type) = &operation.return_type {
            self.check_type_ref(return_type)?;
        }
        let pending = operation.parameters.iter().any(|p| p.type_ref.is_pending())
            || operation.return_type.as_ref().is_some_and(TypeRef::is_pending);
        self.classifier_mut(idx)?.operations_mut().push(operation);
        self.after_insert(idx, pending);
        Ok(())
    }

    pub fn remove_operation(&mut self, idx: ClassifierIdx, id: Id) -> Result<Operation, ModelError> {
        let classifier = self.classifier_mut(idx)?;
        let owner = classifier.id();
        let operations = classifier.operations_mut();
        let position = operations
            .iter()
            .position(|op| op.info.id == id)
            .ok_or(ModelError::UnknownMember { owner, member: id })?;
        let removed = operations.remove(position);
        self.touch(idx);
        Ok(removed)
    }

    pub fn add_superclassifier(
        &mut self,
        idx: ClassifierIdx,
        reference: Reference,
    ) -> Result<(), ModelError> {
        self.check_reference(&reference)?;
        let pending = reference.is_pending();
        self.classifier_mut(idx)?.superclassifiers_mut().push(reference);
        self.after_insert(idx, pending);
        Ok(())
    }

    pub fn set_role_name(
        &mut self,
        idx: AssociationIdx,
        end: RoleEnd,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        let name = name.into();
        self.update_role(idx, end, |role| role.name = name)
    }

    pub fn set_role_multiplicity(
        &mut self,
        idx: AssociationIdx,
        end: RoleEnd,
        multiplicity: impl Into<String>,
    ) -> Result<(), ModelError> {
        let multiplicity = multiplicity.into();
        self.update_role(idx, end, |role| role.multiplicity = multiplicity)
    }

    pub fn set_role_changeability(
        &mut self,
        idx: AssociationIdx,
        end: RoleEnd,
        changeability: Changeability,
    ) -> Result<(), ModelError> {
        self.update_role(idx, end, |role| role.changeability = changeability)
    }

    /// Removes an association and drops it from its endpoints' back-references.
    pub fn remove_association(&mut self, idx: AssociationIdx) -> Result<Association, ModelError> {
        let association = self
            .associations
            .get_mut(idx.0)
            .and_then(Option::take)
            .ok_or(ModelError::UnknownAssociation(idx))?;

        for endpoint in Self::endpoints(&association) {
            if let Some(Some(classifier)) = self.classifiers.get_mut(endpoint.0) {
                classifier.associations.retain(|a| *a != idx);
                self.touch(endpoint);
            }
        }
        debug!(id:% = association.id(); "Association removed");
        Ok(association)
    }

    /// Removes a classifier together with every association that has it as an
    /// endpoint. References to it held elsewhere become
    /// [`Reference::Unresolved`] carrying its id.
    pub fn remove_classifier(&mut self, idx: ClassifierIdx) -> Result<Classifier, ModelError> {
        let classifier = self
            .classifiers
            .get_mut(idx.0)
            .and_then(Option::take)
            .ok_or(ModelError::UnknownClassifier(idx))?;
        let id = classifier.id();

        let attached: Vec<AssociationIdx> = self
            .associations()
            .filter(|(_, assoc)| Self::endpoints(assoc).contains(&idx))
            .map(|(assoc_idx, _)| assoc_idx)
            .collect();
        for assoc_idx in attached {
            self.remove_association(assoc_idx)?;
        }

        let mut changed = Vec::new();
        for (i, slot) in self.classifiers.iter_mut().enumerate() {
            let Some(other) = slot else { continue };
            let mut touched = false;
            other.for_each_reference_mut(|_, _, reference| {
                if *reference == Reference::Resolved(idx) {
                    *reference = Reference::Unresolved(id);
                    touched = true;
                }
            });
            if touched {
                changed.push(ClassifierIdx(i));
            }
        }
        for other in changed {
            self.touch(other);
        }

        debug!(id:% = id; "Classifier removed");
        Ok(classifier)
    }

    pub(crate) fn classifiers_mut(&mut self) -> impl Iterator<Item = (ClassifierIdx, &mut Classifier)> {
        self.classifiers
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|c| (ClassifierIdx(i), c)))
    }

    pub(crate) fn associations_mut(
        &mut self,
    ) -> impl Iterator<Item = (AssociationIdx, &mut Association)> {
        self.associations
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|a| (AssociationIdx(i), a)))
    }

    pub(crate) fn classifier_liveness(&self) -> Vec<bool> {
        self.classifiers.iter().map(Option::is_some).collect()
    }

    /// Adds `assoc` to the back-references of `endpoint`. Returns `false` if it
    /// was already registered.
    pub(crate) fn register_association(&mut self, endpoint: ClassifierIdx, assoc: AssociationIdx) -> bool {
        let Some(Some(classifier)) = self.classifiers.get_mut(endpoint.0) else {
            return false;
        };
        if classifier.associations.contains(&assoc) {
            return false;
        }
        classifier.associations.push(assoc);
        self.touch(endpoint);
        true
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// Assigns `idx` a fresh generation. Dead slots are ignored.
    pub(crate) fn touch(&mut self, idx: ClassifierIdx) {
        let revision = self.next_revision();
        if let Some(Some(classifier)) = self.classifiers.get_mut(idx.0) {
            classifier.generation = revision;
        }
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn classifier_mut(&mut self, idx: ClassifierIdx) -> Result<&mut Classifier, ModelError> {
        self.classifiers
            .get_mut(idx.0)
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnknownClassifier(idx))
    }

    fn after_insert(&mut self, idx: ClassifierIdx, pending: bool) {
        if pending {
            self.resolved = false;
        }
        self.touch(idx);
    }

    fn check_reference(&self, reference: &Reference) -> Result<(), ModelError> {
        match reference.resolved() {
            Some(target) if !self.contains_classifier(target) => {
                Err(ModelError::UnknownClassifier(target))
            }
            _ => Ok(()),
        }
    }

    fn check_type_ref(&self, type_ref: &TypeRef) -> Result<(), ModelError> {
        match type_ref {
            TypeRef::Classifier(reference) => self.check_reference(reference),
            TypeRef::Named(_) => Ok(()),
        }
    }

    fn update_role(
        &mut self,
        idx: AssociationIdx,
        end: RoleEnd,
        update: impl FnOnce(&mut Role),
    ) -> Result<(), ModelError> {
        let association = self
            .associations
            .get_mut(idx.0)
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnknownAssociation(idx))?;
        update(association.role_mut(end));
        let endpoints = Self::endpoints(association);
        for endpoint in endpoints {
            self.touch(endpoint);
        }
        Ok(())
    }

    /// Resolved endpoints of an association, without duplicates.
    fn endpoints(association: &Association) -> Vec<ClassifierIdx> {
        let mut endpoints: Vec<ClassifierIdx> = [RoleEnd::A, RoleEnd::B]
            .into_iter()
            .filter_map(|end| association.role(end).object.resolved())
            .collect();
        endpoints.dedup();
        endpoints
    }
}
