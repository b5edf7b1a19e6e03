//! Inheritance obligations.
//!
//! A classifier is obliged to implement the abstract operations it inherits
//! through interfaces and abstract classes, unless a concrete ancestor on some
//! path already provides them or the classifier declares them itself.

use std::{collections::HashSet, fmt};

use indexmap::IndexSet;
use log::{debug, trace};
use serde::Serialize;

use astrolabe_core::{
    ModelError,
    identifier::Id,
    model::{Classifier, ClassifierIdx, Document, Operation, Reference, TypeRef},
};

use super::members::TypeDescriptor;

/// Operation identity: name plus ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OperationSignature {
    pub name: String,
    pub param_types: Vec<TypeDescriptor>,
}

impl OperationSignature {
    pub fn of(doc: &Document, operation: &Operation) -> Result<Self, ModelError> {
        let param_types = operation
            .parameters
            .iter()
            .map(|param| TypeDescriptor::of_type(doc, &param.type_ref, operation.info.id))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: operation.info.name.clone(),
            param_types,
        })
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.param_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

/// Operations a classifier must implement beyond its own declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObligationSet {
    pub classifier_id: Id,
    /// In discovery order of the depth-first walk.
    pub operations: Vec<OperationSignature>,
}

impl ObligationSet {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn contains(&self, signature: &OperationSignature) -> bool {
        self.operations.contains(signature)
    }
}

/// Outcome of one walk, with every classifier whose data it read.
pub(crate) struct Derived {
    pub set: ObligationSet,
    pub read: IndexSet<ClassifierIdx>,
}

struct Walker<'a> {
    doc: &'a Document,
    visited: HashSet<(ClassifierIdx, bool)>,
    implemented: IndexSet<OperationSignature>,
    pending: IndexSet<OperationSignature>,
    read: IndexSet<ClassifierIdx>,
}

impl<'a> Walker<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            visited: HashSet::new(),
            implemented: IndexSet::new(),
            pending: IndexSet::new(),
            read: IndexSet::new(),
        }
    }

    fn signature(&mut self, operation: &Operation) -> Result<OperationSignature, ModelError> {
        let signature = OperationSignature::of(self.doc, operation)?;
        for param in &operation.parameters {
            if let TypeRef::Classifier(Reference::Resolved(target)) = param.type_ref {
                self.read.insert(target);
            }
        }
        Ok(signature)
    }

    /// Visits `ancestor`, reached through a concrete classifier if `via_concrete`.
    fn walk(&mut self, ancestor: ClassifierIdx, via_concrete: bool) -> Result<(), ModelError> {
        if !self.visited.insert((ancestor, via_concrete)) {
            return Ok(());
        }
        let doc = self.doc;
        let classifier = doc
            .classifier(ancestor)
            .ok_or(ModelError::UnknownClassifier(ancestor))?;
        self.read.insert(ancestor);

        let concrete_here = via_concrete || classifier.is_concrete();
        trace!(ancestor:% = classifier.id(), concrete_here; "Visiting ancestor");

        for operation in classifier.operations() {
            let signature = self.signature(operation)?;
            if provides(classifier, operation, concrete_here) {
                self.implemented.insert(signature);
            } else {
                self.pending.insert(signature);
            }
        }

        for supertype in doc.supertypes(ancestor) {
            self.walk(supertype, concrete_here)?;
        }
        Ok(())
    }
}

/// Whether `operation` counts as implemented when met on `classifier`.
fn provides(classifier: &Classifier, operation: &Operation, concrete_here: bool) -> bool {
    concrete_here || (!classifier.is_interface() && !operation.is_abstract)
}

pub(crate) fn derive(doc: &Document, idx: ClassifierIdx) -> Result<Derived, ModelError> {
    let classifier = doc
        .classifier(idx)
        .ok_or(ModelError::UnknownClassifier(idx))?;
    if !doc.is_resolved() {
        return Err(ModelError::NotResolved {
            id: classifier.id(),
        });
    }

    let mut walker = Walker::new(doc);
    walker.read.insert(idx);
    // A cycle back to the root must not count the root as its own ancestor.
    walker.visited.extend([(idx, false), (idx, true)]);
    let mut declared = IndexSet::new();
    for operation in classifier.operations() {
        declared.insert(walker.signature(operation)?);
    }
    for supertype in doc.supertypes(idx) {
        walker.walk(supertype, false)?;
    }

    let Walker {
        implemented,
        pending,
        read,
        ..
    } = walker;
    let operations: Vec<_> = pending
        .into_iter()
        .filter(|sig| !implemented.contains(sig) && !declared.contains(sig))
        .collect();

    debug!(
        classifier:% = classifier.id(),
        obligations = operations.len(),
        read = read.len();
        "Obligations resolved"
    );
    Ok(Derived {
        set: ObligationSet {
            classifier_id: classifier.id(),
            operations,
        },
        read,
    })
}

/// Computes the abstract operations the classifier at `idx` must implement.
///
/// Walks supertypes depth first. An operation met on or above a concrete
/// classifier is implemented; so is a non-abstract operation of an abstract
/// class. Any other inherited operation is pending. The result is the pending
/// operations that are neither implemented on another path nor declared by the
/// classifier itself. Operations are compared by name and parameter types.
///
/// Each ancestor is visited at most twice, once per value of "reached through a
/// concrete classifier", so diamonds and cycles terminate.
///
/// # Errors
///
/// Returns [`ModelError::NotResolved`] if the document has not been resolved,
/// and [`ModelError::UnknownClassifier`] if `idx` is not live.
pub fn obligations(doc: &Document, idx: ClassifierIdx) -> Result<ObligationSet, ModelError> {
    derive(doc, idx).map(|derived| derived.set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe_core::model::{
        Association, AssociationKind, ClassifierKind, ObjectInfo, Parameter, Role,
    };

    fn info(id: &str) -> ObjectInfo {
        ObjectInfo::new(Id::new(id), id)
    }

    fn op(id: &str, name: &str, param: &str) -> Operation {
        Operation::new(ObjectInfo::new(Id::new(id), name))
            .with_parameter(Parameter::new(info(&format!("{id}_p")), TypeRef::named(param)))
            .with_abstract(true)
    }

    fn sig(name: &str, param: &str) -> OperationSignature {
        OperationSignature {
            name: name.to_string(),
            param_types: vec![TypeDescriptor::Named(param.to_string())],
        }
    }

    fn interface(id: &str) -> Classifier {
        Classifier::new(info(id), ClassifierKind::Interface)
    }

    fn class(id: &str) -> Classifier {
        Classifier::new(info(id), ClassifierKind::Class)
    }

    fn add(doc: &mut Document, classifier: Classifier) -> ClassifierIdx {
        doc.add_classifier(classifier).unwrap()
    }

    fn extends(doc: &mut Document, id: &str, sub: ClassifierIdx, sup: ClassifierIdx) {
        doc.add_association(Association::new(
            info(id),
            AssociationKind::Generalization,
            Role::new(Reference::Resolved(sub)),
            Role::new(Reference::Resolved(sup)),
        ))
        .unwrap();
    }

    #[test]
    fn test_shared_interface_operation_is_reported_once() {
        let mut doc = Document::new();
        let i1 = add(&mut doc, interface("i1").with_operation(op("o1", "foo", "int")));
        let i2 = add(&mut doc, interface("i2").with_operation(op("o2", "foo", "int")));
        let c = add(
            &mut doc,
            class("c")
                .with_superclassifier(Reference::Resolved(i1))
                .with_superclassifier(Reference::Resolved(i2)),
        );

        let set = obligations(&doc, c).unwrap();
        assert_eq!(set.classifier_id, Id::new("c"));
        assert_eq!(set.operations, vec![sig("foo", "int")]);
    }

    #[test]
    fn test_overloads_are_distinct() {
        let mut doc = Document::new();
        let i = add(
            &mut doc,
            interface("i")
                .with_operation(op("o1", "foo", "int"))
                .with_operation(op("o2", "foo", "String")),
        );
        let c = add(&mut doc, class("c").with_superclassifier(Reference::Resolved(i)));

        assert_eq!(
            obligations(&doc, c).unwrap().operations,
            vec![sig("foo", "int"), sig("foo", "String")]
        );
    }

    #[test]
    fn test_diamond_through_concrete_ancestor() {
        let mut doc = Document::new();
        let i = add(&mut doc, interface("i").with_operation(op("o1", "foo", "int")));
        let a = add(&mut doc, class("a").with_superclassifier(Reference::Resolved(i)));
        let b = add(&mut doc, class("b").with_abstract(true));
        let c = add(&mut doc, class("c").with_superclassifier(Reference::Resolved(i)));
        extends(&mut doc, "g_ba", b, a);
        extends(&mut doc, "g_cb", c, b);

        assert!(obligations(&doc, c).unwrap().is_empty());
        assert_eq!(obligations(&doc, b).unwrap().operations, Vec::new());
    }

    #[test]
    fn test_abstract_chain_keeps_obligations() {
        let mut doc = Document::new();
        let base = add(
            &mut doc,
            class("base")
                .with_abstract(true)
                .with_operation(op("o1", "draw", "int"))
                .with_operation(op("o2", "area", "int").with_abstract(false)),
        );
        let mid = add(&mut doc, class("mid").with_abstract(true));
        let leaf = add(&mut doc, class("leaf"));
        extends(&mut doc, "g_mid", mid, base);
        extends(&mut doc, "g_leaf", leaf, mid);

        let set = obligations(&doc, leaf).unwrap();
        assert!(set.contains(&sig("draw", "int")));
        assert!(!set.contains(&sig("area", "int")));
    }

    #[test]
    fn test_declared_operations_are_excluded() {
        let mut doc = Document::new();
        let i = add(
            &mut doc,
            interface("i")
                .with_operation(op("o1", "foo", "int"))
                .with_operation(op("o2", "bar", "int")),
        );
        let c = add(
            &mut doc,
            class("c")
                .with_operation(op("o3", "foo", "int").with_abstract(false))
                .with_superclassifier(Reference::Resolved(i)),
        );

        assert_eq!(obligations(&doc, c).unwrap().operations, vec![sig("bar", "int")]);
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let mut doc = Document::new();
        let a = add(&mut doc, interface("a").with_operation(op("o1", "foo", "int")));
        let b = add(&mut doc, interface("b").with_operation(op("o2", "bar", "int")));
        extends(&mut doc, "g_ab", a, b);
        extends(&mut doc, "g_ba", b, a);

        assert_eq!(obligations(&doc, a).unwrap().operations, vec![sig("bar", "int")]);
    }

    #[test]
    fn test_cycle_through_concrete_root_keeps_obligations() {
        let mut doc = Document::new();
        let c = add(&mut doc, class("c"));
        let i = add(
            &mut doc,
            interface("i")
                .with_operation(op("o1", "foo", "int"))
                .with_superclassifier(Reference::Resolved(c)),
        );
        extends(&mut doc, "g_ci", c, i);

        assert_eq!(obligations(&doc, c).unwrap().operations, vec![sig("foo", "int")]);
    }

    #[test]
    fn test_unknown_parameter_type() {
        let mut doc = Document::new();
        let operation = Operation::new(info("o1"))
            .with_parameter(Parameter::new(
                info("p1"),
                TypeRef::Classifier(Reference::Unresolved(Id::new("c_ghost"))),
            ))
            .with_abstract(true);
        let i = add(&mut doc, interface("i").with_operation(operation));
        let c = add(&mut doc, class("c").with_superclassifier(Reference::Resolved(i)));

        let set = obligations(&doc, c).unwrap();
        assert_eq!(
            set.operations[0].param_types,
            vec![TypeDescriptor::Unknown(Id::new("c_ghost"))]
        );
        assert_eq!(set.operations[0].to_string(), "o1(?c_ghost)");
    }

    #[test]
    fn test_unresolved_document_is_rejected() {
        let mut doc = Document::new();
        let c = add(
            &mut doc,
            class("c").with_superclassifier(Reference::pending_type(Id::new("i"))),
        );

        assert_eq!(
            obligations(&doc, c),
            Err(ModelError::NotResolved { id: Id::new("c") })
        );
    }
}
