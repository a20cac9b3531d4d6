//! Round identity, lock state and per-team round results
//!
//! Every scoring sheet moves through the same two states: operators enter
//! marks while a round is open, and once it is locked its scores are
//! fixed. There is no way back from `Locked` to `Open`.

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

use crate::{error::Error, id::TeamId, points::Points, subject::Subject};

/// Data entry state of a round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoundState {
    /// Operators may still change marks and entries
    #[default]
    Open,
    /// Scores are final
    Locked,
}

impl RoundState {
    /// Returns true once the round has been locked
    pub fn is_locked(self) -> bool {
        self == RoundState::Locked
    }

    /// Moves the round to `Locked`
    ///
    /// Returns `true` if this call performed the transition and `false` if
    /// the round was already locked.
    pub fn lock(&mut self) -> bool {
        match self {
            RoundState::Open => {
                *self = RoundState::Locked;
                true
            }
            RoundState::Locked => false,
        }
    }

    /// Fails with [`Error::Locked`] unless the round is still open
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] when the round is locked.
    pub fn ensure_open(self) -> Result<(), Error> {
        match self {
            RoundState::Open => Ok(()),
            RoundState::Locked => Err(Error::Locked),
        }
    }
}

/// The stage a round belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Teams are being registered
    Setup,
    /// Elimination by subject circles and a direct score
    Knockout,
    /// Member-level scoring for the advancing teams
    Qualifier,
    /// Two finalists, two numeric rounds and a buzzer round
    Final,
    /// The final has been recorded
    Finished,
}

/// The persisted rounds of a competition, in playing order
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum RoundKind {
    /// Knockout round one, scored by subject circles
    #[display("knockout_1")]
    KnockoutCircles,
    /// Knockout round two, a directly entered score
    #[display("knockout_2")]
    KnockoutDirect,
    /// Qualifier round one, scored per member
    #[display("qualifier_1")]
    QualifierMembers,
    /// Qualifier round two, a directly entered score
    #[display("qualifier_2")]
    QualifierDirect,
    /// First numeric round of the final
    #[display("final_1")]
    FinalFirst,
    /// Second numeric round of the final
    #[display("final_2")]
    FinalSecond,
    /// Buzzer round of the final
    #[display("final_buzzer")]
    FinalBuzzer,
}

impl RoundKind {
    /// The two knockout rounds
    pub const KNOCKOUT: [RoundKind; 2] = [RoundKind::KnockoutCircles, RoundKind::KnockoutDirect];
    /// The two qualifier rounds
    pub const QUALIFIER: [RoundKind; 2] =
        [RoundKind::QualifierMembers, RoundKind::QualifierDirect];
    /// The three sub-rounds of the final
    pub const FINAL: [RoundKind; 3] = [
        RoundKind::FinalFirst,
        RoundKind::FinalSecond,
        RoundKind::FinalBuzzer,
    ];

    /// Every round in playing order
    pub fn all() -> impl Iterator<Item = RoundKind> {
        (0..Self::LENGTH).map(Self::from_usize)
    }

    /// Name of the round row in the score store
    pub fn name(self) -> String {
        self.to_string()
    }

    /// The stage this round is played in
    pub fn stage(self) -> Stage {
        match self {
            RoundKind::KnockoutCircles | RoundKind::KnockoutDirect => Stage::Knockout,
            RoundKind::QualifierMembers | RoundKind::QualifierDirect => Stage::Qualifier,
            RoundKind::FinalFirst | RoundKind::FinalSecond | RoundKind::FinalBuzzer => {
                Stage::Final
            }
        }
    }
}

/// One team's result for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    /// The team the score belongs to
    pub team: TeamId,
    /// The rounded round total
    pub total: Points,
    /// Weighted contribution per subject before normalization, when the
    /// round is scored by subject
    pub breakdown: Option<EnumMap<Subject, Points>>,
}

impl RoundScore {
    /// Creates a score without a subject breakdown
    pub fn new(team: TeamId, total: Points) -> Self {
        Self {
            team,
            total,
            breakdown: None,
        }
    }
}

/// A sheet whose locked contents can be recorded as a round
pub trait RoundSheet {
    /// Current lock state of the sheet
    fn state(&self) -> RoundState;

    /// Per-team results in listing order
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] while the sheet is still open.
    fn scores(&self) -> Result<Vec<RoundScore>, Error>;
}
