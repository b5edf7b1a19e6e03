//! Role multiplicities.
//!
//! A role stores its multiplicity as free text. [`Multiplicity::parse`] turns
//! that text into a tagged value; [`Multiplicity::classify`] is the lenient
//! form used by member synthesis, which never rejects a model because of a
//! malformed multiplicity.

use std::fmt;

use log::warn;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Parsed form of a multiplicity string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// Exactly `n` values. The empty string is `Exact(1)`.
    Exact(u32),
    /// Between `lo` and `hi` values, `lo <= hi`.
    Range(u32, u32),
    /// At least `lower` values, no upper bound.
    Unbounded { lower: u32 },
}

/// A multiplicity string that matches none of the accepted forms.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed multiplicity `{value}`")]
pub struct MalformedMultiplicity {
    pub value: String,
}

impl Multiplicity {
    /// Parses a multiplicity string.
    ///
    /// Accepted forms, surrounding whitespace ignored: empty, `*`, `n`,
    /// `lo..*` and `lo..hi` with `hi >= lo`.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrolabe_core::multiplicity::Multiplicity;
    ///
    /// assert_eq!(Multiplicity::parse("0..1"), Ok(Multiplicity::Range(0, 1)));
    /// assert_eq!(Multiplicity::parse("1..*"), Ok(Multiplicity::Unbounded { lower: 1 }));
    /// assert!(Multiplicity::parse("many").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, MalformedMultiplicity> {
        let malformed = || MalformedMultiplicity {
            value: value.to_string(),
        };
        let text = value.trim();

        if text.is_empty() {
            return Ok(Self::Exact(1));
        }
        if text == "*" {
            return Ok(Self::Unbounded { lower: 0 });
        }

        match text.split_once("..") {
            None => bound(text).map(Self::Exact).ok_or_else(malformed),
            Some((lo, hi)) => {
                let lo = bound(lo.trim()).ok_or_else(malformed)?;
                match hi.trim() {
                    "*" => Ok(Self::Unbounded { lower: lo }),
                    hi => {
                        let hi = bound(hi).ok_or_else(malformed)?;
                        if hi < lo {
                            return Err(malformed());
                        }
                        Ok(Self::Range(lo, hi))
                    }
                }
            }
        }
    }

    /// Parses `value`, treating malformed text as `Unbounded { lower: 0 }`.
    pub fn classify(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|err| {
            warn!(value; "{err}, treating as unbounded");
            Self::Unbounded { lower: 0 }
        })
    }

    pub fn lower(&self) -> u32 {
        match self {
            Self::Exact(n) => *n,
            Self::Range(lo, _) => *lo,
            Self::Unbounded { lower } => *lower,
        }
    }

    /// Returns the upper bound, `None` when unbounded.
    pub fn upper(&self) -> Option<u32> {
        match self {
            Self::Exact(n) => Some(*n),
            Self::Range(_, hi) => Some(*hi),
            Self::Unbounded { .. } => None,
        }
    }

    /// Returns `true` when more than one value may be held.
    pub fn is_collection(&self) -> bool {
        self.upper().is_none_or(|upper| upper > 1)
    }
}

fn bound(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            Self::Unbounded { lower: 0 } => write!(f, "*"),
            Self::Unbounded { lower } => write!(f, "{lower}..*"),
        }
    }
}

impl Serialize for Multiplicity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
