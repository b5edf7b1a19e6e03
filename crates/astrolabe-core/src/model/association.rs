//! Associations and their two roles.

use crate::identifier::Id;

use super::{
    classifier::ObjectInfo,
    kinds::{AssociationKind, Changeability, RoleEnd, Visibility},
    reference::Reference,
};

/// One end of an association.
///
/// The role's data describes the member that the *opposite* endpoint gets:
/// role B's name and multiplicity become a field of the classifier at role A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub object: Reference,
    /// Empty when the role is unnamed.
    pub name: String,
    /// Raw multiplicity text, classified on demand.
    pub multiplicity: String,
    pub visibility: Visibility,
    pub changeability: Changeability,
    pub documentation: String,
}

impl Role {
    pub fn new(object: Reference) -> Self {
        Self {
            object,
            name: String::new(),
            multiplicity: String::new(),
            visibility: Visibility::default(),
            changeability: Changeability::default(),
            documentation: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: impl Into<String>) -> Self {
        self.multiplicity = multiplicity.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_changeability(mut self, changeability: Changeability) -> Self {
        self.changeability = changeability;
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

/// A typed relationship between two classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    info: ObjectInfo,
    kind: AssociationKind,
    role_a: Role,
    role_b: Role,
}

impl Association {
    pub fn new(info: ObjectInfo, kind: AssociationKind, role_a: Role, role_b: Role) -> Self {
        Self {
            info,
            kind,
            role_a,
            role_b,
        }
    }

    pub fn info(&self) -> &ObjectInfo {
        &self.info
    }

    pub fn id(&self) -> Id {
        self.info.id
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    pub fn role(&self, end: RoleEnd) -> &Role {
        match end {
            RoleEnd::A => &self.role_a,
            RoleEnd::B => &self.role_b,
        }
    }

    pub fn role_a(&self) -> &Role {
        &self.role_a
    }

    pub fn role_b(&self) -> &Role {
        &self.role_b
    }

    /// Returns `true` if either role still holds a pending reference.
    pub fn has_pending_refs(&self) -> bool {
        self.role_a.object.is_pending() || self.role_b.object.is_pending()
    }

    pub(crate) fn role_mut(&mut self, end: RoleEnd) -> &mut Role {
        match end {
            RoleEnd::A => &mut self.role_a,
            RoleEnd::B => &mut self.role_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lookup_by_end() {
        let assoc = Association::new(
            ObjectInfo::new(Id::new("as_tree"), ""),
            AssociationKind::Aggregation,
            Role::new(Reference::pending_object(Id::new("c_node"))).with_name("parent"),
            Role::new(Reference::pending_object(Id::new("c_node")))
                .with_name("children")
                .with_multiplicity("*"),
        );

        assert_eq!(assoc.role(RoleEnd::A).name, "parent");
        assert_eq!(assoc.role(RoleEnd::B).multiplicity, "*");
        assert!(assoc.has_pending_refs());
    }
}
