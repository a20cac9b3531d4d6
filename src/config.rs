//! Competition configuration
//!
//! The defaults describe the standard event: five teams of five, four
//! teams through the knockout, two finalists, and the standard subject
//! credits. An event can override any of it from JSON.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{
        finale::FINALIST_COUNT,
        knockout, qualifier,
        teams::{DEFAULT_MEMBER_COUNT, DEFAULT_TEAM_COUNT, MAX_MEMBER_COUNT, MAX_TEAM_COUNT},
    },
    knockout::CircleScoring,
    subject::{Credits, default_credits, total_credit},
};

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum Error {
    /// The JSON could not be parsed
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values are out of bounds
    #[error("invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}

type ValidationResult = garde::Result;

fn validate_advancing(value: &usize, ctx: &Config) -> ValidationResult {
    if (FINALIST_COUNT..=ctx.team_count).contains(value) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{FINALIST_COUNT},{}]",
            ctx.team_count
        )))
    }
}

fn validate_credits(value: &Credits) -> ValidationResult {
    if total_credit(value) == 0 {
        Err(garde::Error::new("credits cannot all be zero"))
    } else {
        Ok(())
    }
}

/// Settings for one competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[garde(context(Config as ctx))]
#[serde(default)]
pub struct Config {
    /// Number of teams registered at setup
    #[garde(range(min = FINALIST_COUNT, max = MAX_TEAM_COUNT))]
    pub team_count: usize,
    /// Number of members on every team
    #[garde(range(min = 1, max = MAX_MEMBER_COUNT))]
    pub member_count: usize,
    /// Teams advancing from the knockout to the qualifier
    #[garde(custom(validate_advancing))]
    pub knockout_advancing: usize,
    /// Credit weight per subject
    #[garde(custom(|v, _| validate_credits(v)))]
    pub credits: Credits,
    /// Points per knockout circle
    #[garde(range(min = 1))]
    pub knockout_mark_value: u32,
    /// Divisor for knockout sums
    #[garde(range(min = 1))]
    pub knockout_normalization: u32,
    /// Points per qualifier circle
    #[garde(range(min = 1))]
    pub qualifier_mark_value: u32,
    /// Divisor for qualifier sums
    #[garde(range(min = 1))]
    pub qualifier_normalization: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team_count: DEFAULT_TEAM_COUNT,
            member_count: DEFAULT_MEMBER_COUNT,
            knockout_advancing: knockout::DEFAULT_ADVANCING,
            credits: default_credits(),
            knockout_mark_value: knockout::MARK_VALUE,
            knockout_normalization: knockout::NORMALIZATION,
            qualifier_mark_value: qualifier::MARK_VALUE,
            qualifier_normalization: qualifier::NORMALIZATION,
        }
    }
}

impl Config {
    /// Parses and validates a configuration from JSON
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::Invalid`]
    /// for out-of-bounds values.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Validates the configuration against itself
    ///
    /// # Errors
    ///
    /// Returns the validation report when any field is out of bounds.
    pub fn check(&self) -> Result<(), garde::Report> {
        self.validate_with(self)
    }

    /// Scoring parameters for the knockout circle sheet
    pub fn knockout_scoring(&self) -> CircleScoring {
        CircleScoring {
            credits: self.credits,
            mark_value: self.knockout_mark_value,
            normalization: self.knockout_normalization,
        }
    }

    /// Scoring parameters for the qualifier member sheet
    pub fn qualifier_scoring(&self) -> CircleScoring {
        CircleScoring {
            credits: self.credits,
            mark_value: self.qualifier_mark_value,
            normalization: self.qualifier_normalization,
        }
    }
}
