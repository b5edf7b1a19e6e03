//! Member synthesis.
//!
//! Turns plain attributes and resolved association roles into [`MemberSpec`]s:
//! a field plus the accessor operations a code emitter must generate for it.

use std::{collections::BTreeSet, fmt};

use log::{debug, trace};
use serde::Serialize;

use astrolabe_core::{
    ModelError,
    identifier::Id,
    model::{
        Association, Attribute, Changeability, ClassifierIdx, Document, Reference, RoleEnd,
        TypeRef, Visibility,
    },
    multiplicity::Multiplicity,
};

use crate::config::UnnamedRolePolicy;

use super::roles::foreign_roles;

/// An accessor operation a member obliges its owner to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Accessor {
    Get,
    Set,
    /// Getter returning the whole collection.
    List,
    Add,
    Remove,
}

/// Initial value of a generated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    EmptyCollection,
    /// Initial value text declared on an attribute.
    Initial(String),
}

/// Type of a generated field or of an operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Classifier { id: Id, name: String },
    /// Literal type name such as `int`.
    Named(String),
    /// A reference that did not resolve; keeps the id it expected.
    Unknown(Id),
}

impl TypeDescriptor {
    /// Describes the target of a resolved reference.
    ///
    /// `holder` names the object reported when the reference is still pending.
    pub fn of_reference(doc: &Document, reference: &Reference, holder: Id) -> Result<Self, ModelError> {
        match reference {
            Reference::Pending(_) => Err(ModelError::NotResolved { id: holder }),
            Reference::Unresolved(id) => Ok(Self::Unknown(*id)),
            Reference::Resolved(idx) => {
                let target = doc
                    .classifier(*idx)
                    .ok_or(ModelError::UnknownClassifier(*idx))?;
                Ok(Self::Classifier {
                    id: target.id(),
                    name: target.name().to_string(),
                })
            }
        }
    }

    pub fn of_type(doc: &Document, type_ref: &TypeRef, holder: Id) -> Result<Self, ModelError> {
        match type_ref {
            TypeRef::Named(name) => Ok(Self::Named(name.clone())),
            TypeRef::Classifier(reference) => Self::of_reference(doc, reference, holder),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier { name, .. } => write!(f, "{name}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Unknown(id) => write!(f, "?{id}"),
        }
    }
}

/// Where a member came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSource {
    Attribute { id: Id },
    Role { association: Id, end: RoleEnd },
}

/// A generated field with its accessor obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSpec {
    pub field_name: String,
    pub field_type: TypeDescriptor,
    pub is_collection: bool,
    pub multiplicity: Multiplicity,
    pub accessors: BTreeSet<Accessor>,
    pub visibility: Visibility,
    pub changeability: Changeability,
    pub documentation: String,
    pub default: Option<DefaultValue>,
    pub is_static: bool,
    pub source: MemberSource,
}

impl MemberSpec {
    pub fn has_accessor(&self, accessor: Accessor) -> bool {
        self.accessors.contains(&accessor)
    }
}

fn scalar_accessors(changeability: Changeability) -> BTreeSet<Accessor> {
    let mut accessors = BTreeSet::from([Accessor::Get]);
    if changeability != Changeability::Frozen {
        accessors.insert(Accessor::Set);
    }
    accessors
}

fn collection_accessors(changeability: Changeability) -> BTreeSet<Accessor> {
    let mut accessors = BTreeSet::from([Accessor::List]);
    if changeability != Changeability::Frozen {
        accessors.insert(Accessor::Add);
    }
    if changeability == Changeability::Changeable {
        accessors.insert(Accessor::Remove);
    }
    accessors
}

/// Synthesizes the member for a plain attribute.
///
/// Attributes are always scalar. Constant attributes get no setter.
pub fn synthesize_attribute(doc: &Document, attribute: &Attribute) -> Result<MemberSpec, ModelError> {
    let info = &attribute.info;
    let changeability = if attribute.is_constant {
        Changeability::Frozen
    } else {
        Changeability::Changeable
    };

    Ok(MemberSpec {
        field_name: info.name.clone(),
        field_type: TypeDescriptor::of_type(doc, &attribute.type_ref, info.id)?,
        is_collection: false,
        multiplicity: Multiplicity::Exact(1),
        accessors: scalar_accessors(changeability),
        visibility: info.visibility,
        changeability,
        documentation: info.documentation.clone(),
        default: attribute.initial_value.clone().map(DefaultValue::Initial),
        is_static: attribute.is_static,
        source: MemberSource::Attribute { id: info.id },
    })
}

/// Synthesizes the member described by the role at `end` of `association`.
///
/// The member is named after the role, or `fallback_name` when the role has no
/// name. Returns `None` for unnamed roles without a fallback.
pub fn synthesize_role(
    doc: &Document,
    association: &Association,
    end: RoleEnd,
    fallback_name: Option<String>,
) -> Result<Option<MemberSpec>, ModelError> {
    let role = association.role(end);
    let field_name = if role.name.is_empty() {
        match fallback_name {
            Some(name) => name,
            None => {
                debug!(association:% = association.id(), end:%; "Skipping unnamed role");
                return Ok(None);
            }
        }
    } else {
        role.name.clone()
    };

    let multiplicity = Multiplicity::classify(&role.multiplicity);
    let is_collection = multiplicity.is_collection();
    let (accessors, default) = if is_collection {
        (
            collection_accessors(role.changeability),
            Some(DefaultValue::EmptyCollection),
        )
    } else {
        (scalar_accessors(role.changeability), None)
    };

    Ok(Some(MemberSpec {
        field_name,
        field_type: TypeDescriptor::of_reference(doc, &role.object, association.id())?,
        is_collection,
        multiplicity,
        accessors,
        visibility: role.visibility,
        changeability: role.changeability,
        documentation: role.documentation.clone(),
        default,
        is_static: false,
        source: MemberSource::Role {
            association: association.id(),
            end,
        },
    }))
}

/// Derives every member of the classifier at `idx`.
///
/// Attributes come first in declaration order, followed by the foreign roles of
/// each structural association in the order the associations were attached.
/// Generalizations and realizations contribute no members.
///
/// # Errors
///
/// Returns [`ModelError::NotResolved`] if the document has not been resolved,
/// and [`ModelError::UnknownClassifier`] if `idx` is not live.
pub fn members(
    doc: &Document,
    idx: ClassifierIdx,
    policy: &UnnamedRolePolicy,
) -> Result<Vec<MemberSpec>, ModelError> {
    let classifier = doc
        .classifier(idx)
        .ok_or(ModelError::UnknownClassifier(idx))?;
    if !doc.is_resolved() {
        return Err(ModelError::NotResolved {
            id: classifier.id(),
        });
    }

    let mut members = classifier
        .attributes()
        .iter()
        .map(|attribute| synthesize_attribute(doc, attribute))
        .collect::<Result<Vec<_>, _>>()?;

    let mut unnamed = 0;
    for (_, association) in doc.associations_of(idx) {
        if !association.kind().is_structural() {
            continue;
        }
        for foreign in foreign_roles(association, idx)? {
            let fallback_name = match policy {
                UnnamedRolePolicy::Fallback { prefix } if foreign.role.name.is_empty() => {
                    unnamed += 1;
                    Some(format!("{prefix}{}_{unnamed}", foreign.end))
                }
                _ => None,
            };
            if let Some(member) = synthesize_role(doc, association, foreign.end, fallback_name)? {
                members.push(member);
            }
        }
    }

    debug!(classifier:% = classifier.id(), members = members.len(); "Members synthesized");
    trace!(members:?; "Synthesized members");
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe_core::model::{
        AssociationKind, Classifier, ClassifierKind, ObjectInfo, Role,
    };

    fn info(id: &str) -> ObjectInfo {
        ObjectInfo::new(Id::new(id), id.trim_start_matches("c_"))
    }

    fn accessors(list: &[Accessor]) -> BTreeSet<Accessor> {
        list.iter().copied().collect()
    }

    fn doc_with_roles(mut role_a: Role, mut role_b: Role) -> (Document, ClassifierIdx, ClassifierIdx) {
        let mut doc = Document::new();
        let x = doc
            .add_classifier(Classifier::new(info("c_x"), ClassifierKind::Class))
            .unwrap();
        let y = doc
            .add_classifier(Classifier::new(info("c_y"), ClassifierKind::Class))
            .unwrap();
        role_a.object = Reference::Resolved(x);
        role_b.object = Reference::Resolved(y);
        doc.add_association(Association::new(
            info("as_xy"),
            AssociationKind::PlainAssociation,
            role_a,
            role_b,
        ))
        .unwrap();
        (doc, x, y)
    }

    fn unset() -> Role {
        Role::new(Reference::Unresolved(Id::new("unset")))
    }

    #[test]
    fn test_scalar_role_accessors() {
        let (doc, x, _) = doc_with_roles(unset().with_name("x"), unset().with_name("target"));

        let members = members(&doc, x, &UnnamedRolePolicy::Skip).unwrap();
        assert_eq!(members.len(), 1);
        let target = &members[0];
        assert_eq!(target.field_name, "target");
        assert!(!target.is_collection);
        assert_eq!(target.accessors, accessors(&[Accessor::Get, Accessor::Set]));
        assert_eq!(target.default, None);
        assert_eq!(
            target.field_type,
            TypeDescriptor::Classifier {
                id: Id::new("c_y"),
                name: "y".to_string()
            }
        );
    }

    #[test]
    fn test_frozen_scalar_keeps_getter() {
        let (doc, x, _) = doc_with_roles(
            unset(),
            unset()
                .with_name("owner")
                .with_changeability(Changeability::Frozen),
        );

        let member = &members(&doc, x, &UnnamedRolePolicy::Skip).unwrap()[0];
        assert_eq!(member.accessors, accessors(&[Accessor::Get]));
    }

    #[test]
    fn test_collection_accessors_by_changeability() {
        let cases = [
            (
                Changeability::Changeable,
                accessors(&[Accessor::List, Accessor::Add, Accessor::Remove]),
            ),
            (
                Changeability::AddOnly,
                accessors(&[Accessor::List, Accessor::Add]),
            ),
            (Changeability::Frozen, accessors(&[Accessor::List])),
        ];

        for (changeability, expected) in cases {
            let (doc, x, _) = doc_with_roles(
                unset(),
                unset()
                    .with_name("items")
                    .with_multiplicity("0..*")
                    .with_changeability(changeability),
            );
            let member = &members(&doc, x, &UnnamedRolePolicy::Skip).unwrap()[0];
            assert!(member.is_collection);
            assert_eq!(member.accessors, expected, "{changeability}");
            assert_eq!(member.default, Some(DefaultValue::EmptyCollection));
        }
    }

    #[test]
    fn test_malformed_multiplicity_is_collection() {
        let (doc, x, _) = doc_with_roles(
            unset(),
            unset().with_name("items").with_multiplicity("lots"),
        );
        let member = &members(&doc, x, &UnnamedRolePolicy::Skip).unwrap()[0];
        assert!(member.is_collection);
        assert_eq!(member.multiplicity, Multiplicity::Unbounded { lower: 0 });
    }

    #[test]
    fn test_role_visibility_is_carried() {
        let (doc, _, y) = doc_with_roles(
            unset()
                .with_name("source")
                .with_visibility(Visibility::Protected),
            unset(),
        );
        let member = &members(&doc, y, &UnnamedRolePolicy::Skip).unwrap()[0];
        assert_eq!(member.visibility, Visibility::Protected);
        assert_eq!(
            member.source,
            MemberSource::Role {
                association: Id::new("as_xy"),
                end: RoleEnd::A
            }
        );
    }

    #[test]
    fn test_unnamed_roles() {
        let (doc, x, y) = doc_with_roles(unset(), unset());
        assert!(members(&doc, x, &UnnamedRolePolicy::Skip).unwrap().is_empty());

        let policy = UnnamedRolePolicy::fallback();
        let names: Vec<_> = members(&doc, x, &policy)
            .unwrap()
            .into_iter()
            .chain(members(&doc, y, &policy).unwrap())
            .map(|m| m.field_name)
            .collect();
        assert_eq!(names, vec!["UnnamedRoleB_1", "UnnamedRoleA_1"]);
    }

    #[test]
    fn test_attribute_member() {
        let mut total = Attribute::new(info("a_total"), TypeRef::named("int"));
        total.initial_value = Some("0".to_string());
        let mut id = Attribute::new(info("a_id"), TypeRef::named("String"));
        id.is_constant = true;
        id.is_static = true;
        id.info.visibility = Visibility::Private;

        let mut doc = Document::new();
        let idx = doc
            .add_classifier(
                Classifier::new(info("c_order"), ClassifierKind::Class)
                    .with_attribute(total)
                    .with_attribute(id),
            )
            .unwrap();

        let members = members(&doc, idx, &UnnamedRolePolicy::Skip).unwrap();
        assert_eq!(members[0].accessors, accessors(&[Accessor::Get, Accessor::Set]));
        assert_eq!(members[0].default, Some(DefaultValue::Initial("0".to_string())));
        assert_eq!(members[0].field_type, TypeDescriptor::Named("int".to_string()));

        assert_eq!(members[1].accessors, accessors(&[Accessor::Get]));
        assert_eq!(members[1].visibility, Visibility::Private);
        assert!(members[1].is_static);
        assert_eq!(members[1].default, None);
    }

    #[test]
    fn test_generalization_contributes_no_members() {
        let mut doc = Document::new();
        let x = doc
            .add_classifier(Classifier::new(info("c_x"), ClassifierKind::Class))
            .unwrap();
        let y = doc
            .add_classifier(Classifier::new(info("c_y"), ClassifierKind::Class))
            .unwrap();
        doc.add_association(Association::new(
            info("as_gen"),
            AssociationKind::Generalization,
            Role::new(Reference::Resolved(x)).with_name("sub"),
            Role::new(Reference::Resolved(y)).with_name("super"),
        ))
        .unwrap();

        assert!(members(&doc, x, &UnnamedRolePolicy::Skip).unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_document_is_rejected() {
        let mut doc = Document::new();
        let idx = doc
            .add_classifier(
                Classifier::new(info("c_x"), ClassifierKind::Class).with_attribute(
                    Attribute::new(info("a_y"), TypeRef::pending(Id::new("c_y"))),
                ),
            )
            .unwrap();

        assert_eq!(
            members(&doc, idx, &UnnamedRolePolicy::Skip),
            Err(ModelError::NotResolved { id: Id::new("c_x") })
        );
    }
}
