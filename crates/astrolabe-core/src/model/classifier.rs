//! Classifiers and the members they own.

use crate::identifier::Id;

use super::{
    kinds::{ClassifierKind, Visibility},
    reference::{AssociationIdx, RefField, Reference, TypeRef},
};

/// Identity and presentation data shared by every model object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub id: Id,
    pub name: String,
    pub visibility: Visibility,
    pub documentation: String,
}

impl ObjectInfo {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visibility: Visibility::default(),
            documentation: String::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

/// A field declared directly on a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub info: ObjectInfo,
    pub type_ref: TypeRef,
    pub initial_value: Option<String>,
    pub is_static: bool,
    /// Constant attributes never get a setter.
    pub is_constant: bool,
}

impl Attribute {
    pub fn new(info: ObjectInfo, type_ref: TypeRef) -> Self {
        Self {
            info,
            type_ref,
            initial_value: None,
            is_static: false,
            is_constant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub info: ObjectInfo,
    pub type_ref: TypeRef,
    pub initial_value: Option<String>,
}

impl Parameter {
    pub fn new(info: ObjectInfo, type_ref: TypeRef) -> Self {
        Self {
            info,
            type_ref,
            initial_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub info: ObjectInfo,
    pub parameters: Vec<Parameter>,
    /// `None` for operations that return nothing.
    pub return_type: Option<TypeRef>,
    pub is_abstract: bool,
    pub is_static: bool,
}

impl Operation {
    pub fn new(info: ObjectInfo) -> Self {
        Self {
            info,
            parameters: Vec::new(),
            return_type: None,
            is_abstract: false,
            is_static: false,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }
}

/// A template (generic) parameter of a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub info: ObjectInfo,
    pub type_ref: Option<TypeRef>,
}

impl Template {
    pub fn new(info: ObjectInfo) -> Self {
        Self {
            info,
            type_ref: None,
        }
    }
}

/// A class, interface, enumeration or datatype.
///
/// Members are exclusively owned. Associations are owned by the
/// [`Document`](super::Document); a classifier only keeps the handles of the
/// associations that have it as an endpoint. Structural changes go through the
/// document so the generation counter stays accurate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    info: ObjectInfo,
    kind: ClassifierKind,
    is_abstract: bool,
    attributes: Vec<Attribute>,
    operations: Vec<Operation>,
    templates: Vec<Template>,
    superclassifiers: Vec<Reference>,
    pub(crate) associations: Vec<AssociationIdx>,
    pub(crate) generation: u64,
}

impl Classifier {
    pub fn new(info: ObjectInfo, kind: ClassifierKind) -> Self {
        Self {
            info,
            kind,
            is_abstract: false,
            attributes: Vec::new(),
            operations: Vec::new(),
            templates: Vec::new(),
            superclassifiers: Vec::new(),
            associations: Vec::new(),
            generation: 0,
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_superclassifier(mut self, reference: Reference) -> Self {
        self.superclassifiers.push(reference);
        self
    }

    pub fn info(&self) -> &ObjectInfo {
        &self.info
    }

    pub fn id(&self) -> Id {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassifierKind::Interface
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns `true` for classifiers that provide implementations: neither
    /// interfaces nor abstract classes.
    pub fn is_concrete(&self) -> bool {
        !self.is_interface() && !self.is_abstract
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn superclassifiers(&self) -> &[Reference] {
        &self.superclassifiers
    }

    /// Handles of the associations that have this classifier as an endpoint.
    pub fn associations(&self) -> &[AssociationIdx] {
        &self.associations
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if any reference held by this classifier or its members
    /// is still pending.
    pub fn has_pending_refs(&self) -> bool {
        self.attributes
            .iter()
            .any(|attr| attr.type_ref.is_pending())
            || self.operations.iter().any(|op| {
                op.parameters.iter().any(|p| p.type_ref.is_pending())
                    || op.return_type.as_ref().is_some_and(TypeRef::is_pending)
            })
            || self
                .templates
                .iter()
                .any(|t| t.type_ref.as_ref().is_some_and(TypeRef::is_pending))
            || self.superclassifiers.iter().any(Reference::is_pending)
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }

    pub(crate) fn operations_mut(&mut self) -> &mut Vec<Operation> {
        &mut self.operations
    }

    pub(crate) fn superclassifiers_mut(&mut self) -> &mut Vec<Reference> {
        &mut self.superclassifiers
    }

    /// Visits every classifier reference held by this classifier and its
    /// members, paired with the id of the object holding it.
    pub(crate) fn for_each_reference_mut(
        &mut self,
        mut visit: impl FnMut(Id, RefField, &mut Reference),
    ) {
        for attr in &mut self.attributes {
            if let Some(reference) = attr.type_ref.reference_mut() {
                visit(attr.info.id, RefField::AttributeType, reference);
            }
        }
        for op in &mut self.operations {
            for param in &mut op.parameters {
                if let Some(reference) = param.type_ref.reference_mut() {
                    visit(param.info.id, RefField::ParameterType, reference);
                }
            }
            if let Some(reference) = op.return_type.as_mut().and_then(TypeRef::reference_mut) {
                visit(op.info.id, RefField::ReturnType, reference);
            }
        }
        for template in &mut self.templates {
            if let Some(reference) = template.type_ref.as_mut().and_then(TypeRef::reference_mut) {
                visit(template.info.id, RefField::TemplateType, reference);
            }
        }
        let id = self.info.id;
        for reference in &mut self.superclassifiers {
            visit(id, RefField::Superclassifier, reference);
        }
    }
}
