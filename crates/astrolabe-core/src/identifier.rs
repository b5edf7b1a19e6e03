//! Model object identifiers backed by string interning.
//!
//! Every object in a loaded document carries an [`Id`]. Ids are opaque to the
//! pipeline: they are only compared, hashed and printed. Interning keeps them
//! `Copy` so references, reports and DTOs can hold them freely.
//!
//! The interner only maps strings to symbols. It is not an object registry;
//! the id→object index for a load lives in
//! [`ResolutionContext`](crate::resolve::ResolutionContext).

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Opaque identifier of a model object.
///
/// # Examples
///
/// ```
/// use astrolabe_core::identifier::Id;
///
/// let book = Id::new("c_book");
/// assert_eq!(book, "c_book");
/// assert_eq!(book, Id::new("c_book"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the textual form of this identifier.
    pub fn as_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_id() {
        let a = Id::new("c_person");
        let b = Id::new("c_person");
        let c = Id::new("c_address");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_round_trips() {
        let id = Id::new("as_children");
        assert_eq!(id.to_string(), "as_children");
        assert_eq!(id.as_string(), "as_children");
    }

    #[test]
    fn test_compare_with_str() {
        let id: Id = "o_lend".into();
        assert!(id == "o_lend");
        assert!(id != "o_borrow");
    }

    #[test]
    fn test_from_str() {
        let id: Id = "t_int".parse().unwrap();
        assert_eq!(id, Id::new("t_int"));
    }
}
