//! Which association roles become members of a classifier.

use astrolabe_core::{
    ModelError,
    model::{Association, ClassifierIdx, Role, RoleEnd},
};

/// A role whose data is embedded in the current classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignRole<'a> {
    pub end: RoleEnd,
    pub role: &'a Role,
}

/// Returns the roles of `association` that describe members of `current`.
///
/// A classifier at one end gets the role at the other end. A classifier at
/// both ends of a self-association gets both roles, A first. Any other
/// classifier gets nothing.
///
/// # Errors
///
/// Returns [`ModelError::NotResolved`] if either endpoint is still pending.
pub fn foreign_roles(
    association: &Association,
    current: ClassifierIdx,
) -> Result<Vec<ForeignRole<'_>>, ModelError> {
    if association.has_pending_refs() {
        return Err(ModelError::NotResolved {
            id: association.id(),
        });
    }

    let at = |end: RoleEnd| association.role(end).object.resolved() == Some(current);

    let mut roles = Vec::with_capacity(2);
    for end in [RoleEnd::A, RoleEnd::B] {
        if at(end.opposite()) {
            roles.push(ForeignRole {
                end,
                role: association.role(end),
            });
        }
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe_core::{
        identifier::Id,
        model::{AssociationKind, Classifier, ClassifierKind, Document, ObjectInfo, Reference},
    };

    fn idx(doc: &mut Document, id: &str) -> ClassifierIdx {
        doc.add_classifier(Classifier::new(
            ObjectInfo::new(Id::new(id), id),
            ClassifierKind::Class,
        ))
        .unwrap()
    }

    fn association(a: Reference, b: Reference) -> Association {
        Association::new(
            ObjectInfo::new(Id::new("as_x"), ""),
            AssociationKind::PlainAssociation,
            Role::new(a).with_name("a"),
            Role::new(b).with_name("b"),
        )
    }

    fn ends(roles: &[ForeignRole<'_>]) -> Vec<RoleEnd> {
        roles.iter().map(|r| r.end).collect()
    }

    #[test]
    fn test_one_endpoint_gets_the_opposite_role() {
        let mut doc = Document::new();
        let x = idx(&mut doc, "c_x");
        let y = idx(&mut doc, "c_y");
        let assoc = association(Reference::Resolved(x), Reference::Resolved(y));

        assert_eq!(ends(&foreign_roles(&assoc, x).unwrap()), vec![RoleEnd::B]);
        assert_eq!(ends(&foreign_roles(&assoc, y).unwrap()), vec![RoleEnd::A]);
        assert_eq!(foreign_roles(&assoc, x).unwrap()[0].role.name, "b");
    }

    #[test]
    fn test_self_association_yields_both_roles() {
        let mut doc = Document::new();
        let x = idx(&mut doc, "c_x");
        let assoc = association(Reference::Resolved(x), Reference::Resolved(x));

        assert_eq!(
            ends(&foreign_roles(&assoc, x).unwrap()),
            vec![RoleEnd::A, RoleEnd::B]
        );
    }

    #[test]
    fn test_unrelated_classifier_gets_nothing() {
        let mut doc = Document::new();
        let x = idx(&mut doc, "c_x");
        let y = idx(&mut doc, "c_y");
        let z = idx(&mut doc, "c_z");
        let assoc = association(
            Reference::Resolved(x),
            Reference::Unresolved(Id::new("c_gone")),
        );

        assert!(foreign_roles(&assoc, y).unwrap().is_empty());
        assert!(foreign_roles(&assoc, z).unwrap().is_empty());
        // A dangling far end still yields a member, typed as unknown later.
        assert_eq!(ends(&foreign_roles(&assoc, x).unwrap()), vec![RoleEnd::B]);
    }

    #[test]
    fn test_pending_endpoint_is_rejected() {
        let mut doc = Document::new();
        let x = idx(&mut doc, "c_x");
        let assoc = association(
            Reference::Resolved(x),
            Reference::pending_object(Id::new("c_y")),
        );

        assert_eq!(
            foreign_roles(&assoc, x),
            Err(ModelError::NotResolved { id: Id::new("as_x") })
        );
    }
}
