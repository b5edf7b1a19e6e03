//! Small enumerations shared by the model graph.
//!
//! The string forms match the model text format and the TOML configuration
//! (lowercase, no separators).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Declared visibility of a model object or of the members generated from it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
    /// Package / implementation visibility.
    Implementation,
}

impl FromStr for Visibility {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            "implementation" => Ok(Self::Implementation),
            _ => Err("Unsupported visibility"),
        }
    }
}

impl From<Visibility> for &'static str {
    fn from(val: Visibility) -> Self {
        match val {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Implementation => "implementation",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Whether a role's value may change after construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Changeability {
    /// Values may be set, added and removed.
    #[default]
    Changeable,
    /// Values are fixed once the owner is constructed.
    Frozen,
    /// Values may be added but never removed.
    AddOnly,
}

impl FromStr for Changeability {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changeable" => Ok(Self::Changeable),
            "frozen" => Ok(Self::Frozen),
            "addonly" => Ok(Self::AddOnly),
            _ => Err("Unsupported changeability"),
        }
    }
}

impl From<Changeability> for &'static str {
    fn from(val: Changeability) -> Self {
        match val {
            Changeability::Changeable => "changeable",
            Changeability::Frozen => "frozen",
            Changeability::AddOnly => "addonly",
        }
    }
}

impl fmt::Display for Changeability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Type tag of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    /// Role A specializes role B.
    Generalization,
    Aggregation,
    Composition,
    #[serde(rename = "association")]
    PlainAssociation,
    /// Role A realizes (implements) role B.
    Realization,
}

impl AssociationKind {
    /// Returns `true` for associations that contribute fields to their endpoints.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Aggregation | Self::Composition | Self::PlainAssociation
        )
    }

    /// Returns `true` for associations that form inheritance edges.
    pub fn is_inheritance(&self) -> bool {
        !self.is_structural()
    }
}

impl FromStr for AssociationKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generalization" => Ok(Self::Generalization),
            "aggregation" => Ok(Self::Aggregation),
            "composition" => Ok(Self::Composition),
            "association" => Ok(Self::PlainAssociation),
            "realization" => Ok(Self::Realization),
            _ => Err("Unsupported association kind"),
        }
    }
}

impl From<AssociationKind> for &'static str {
    fn from(val: AssociationKind) -> Self {
        match val {
            AssociationKind::Generalization => "generalization",
            AssociationKind::Aggregation => "aggregation",
            AssociationKind::Composition => "composition",
            AssociationKind::PlainAssociation => "association",
            AssociationKind::Realization => "realization",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Kind of classifier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Class,
    Interface,
    #[serde(rename = "enum")]
    Enumeration,
    /// Primitive or external type usable in type positions.
    Datatype,
}

impl From<ClassifierKind> for &'static str {
    fn from(val: ClassifierKind) -> Self {
        match val {
            ClassifierKind::Class => "class",
            ClassifierKind::Interface => "interface",
            ClassifierKind::Enumeration => "enum",
            ClassifierKind::Datatype => "datatype",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// One of the two ends of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum RoleEnd {
    A,
    B,
}

impl RoleEnd {
    /// Returns the opposite end.
    pub fn opposite(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl FromStr for RoleEnd {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(Self::A),
            "b" | "B" => Ok(Self::B),
            _ => Err("Role end must be `a` or `b`"),
        }
    }
}

impl fmt::Display for RoleEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_round_trip() {
        for vis in [
            Visibility::Public,
            Visibility::Protected,
            Visibility::Private,
            Visibility::Implementation,
        ] {
            assert_eq!(vis.to_string().parse::<Visibility>(), Ok(vis));
        }
        assert!("friend".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_changeability_from_str() {
        assert_eq!("frozen".parse(), Ok(Changeability::Frozen));
        assert_eq!("addonly".parse(), Ok(Changeability::AddOnly));
        assert_eq!(Changeability::default(), Changeability::Changeable);
    }

    #[test]
    fn test_association_kind_classes() {
        assert!(AssociationKind::Composition.is_structural());
        assert!(AssociationKind::PlainAssociation.is_structural());
        assert!(AssociationKind::Generalization.is_inheritance());
        assert!(AssociationKind::Realization.is_inheritance());
        assert_eq!(
            "association".parse::<AssociationKind>(),
            Ok(AssociationKind::PlainAssociation)
        );
    }

    #[test]
    fn test_role_end_opposite() {
        assert_eq!(RoleEnd::A.opposite(), RoleEnd::B);
        assert_eq!(RoleEnd::B.opposite(), RoleEnd::A);
    }
}
