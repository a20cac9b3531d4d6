//! Subjects and their credit weights
//!
//! Every correct mark is weighted by the credit of the subject it was
//! earned in. The default weights sum to ten, which is also the divisor
//! applied to knockout and qualifier sums.

use std::str::FromStr;

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A quiz subject
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Enum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Mathematics
    #[display("Maths")]
    Maths,
    /// General science
    #[display("Science")]
    Science,
    /// Information technology
    #[display("IT")]
    It,
    /// General knowledge
    #[display("GK")]
    Gk,
    /// Sports
    #[display("Sports")]
    Sports,
}

/// Credit weight per subject
pub type Credits = EnumMap<Subject, u32>;

/// Error returned when a subject key is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown subject `{0}`")]
pub struct UnknownSubject(pub String);

impl Subject {
    /// All subjects in their listing order
    pub const ALL: [Subject; 5] = [
        Subject::Maths,
        Subject::Science,
        Subject::It,
        Subject::Gk,
        Subject::Sports,
    ];

    /// The storage key of the subject
    pub fn key(self) -> &'static str {
        match self {
            Subject::Maths => "maths",
            Subject::Science => "science",
            Subject::It => "it",
            Subject::Gk => "gk",
            Subject::Sports => "sports",
        }
    }

    /// The credit weight used when no configuration overrides it
    pub fn default_credit(self) -> u32 {
        match self {
            Subject::Maths | Subject::Science => 3,
            Subject::It => 2,
            Subject::Gk | Subject::Sports => 1,
        }
    }
}

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownSubject(key.to_owned()))
    }
}

/// The default credit table
pub fn default_credits() -> Credits {
    EnumMap::from_fn(Subject::default_credit)
}

/// Sum of all credit weights in a table
pub fn total_credit(credits: &Credits) -> u32 {
    credits.values().sum()
}
