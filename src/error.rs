//! Errors surfaced by scoring and competition operations

use serde::Serialize;
use thiserror::Error;

use crate::{id::TeamId, points::Points, round::RoundKind, store, teams};

/// Operator input that is still missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum Incomplete {
    /// A member has no subject selected
    #[display("team {team} member {member} has no subject selected")]
    Subject {
        /// The member's team
        team: TeamId,
        /// Index of the member on the team
        member: usize,
    },
    /// A required numeric score was left blank
    #[display("team {_0} has no score entered")]
    Score(TeamId),
    /// A team's qualifier sheet has not been finished
    #[display("team {_0} is not finished")]
    TeamOpen(TeamId),
    /// The sheet has not been locked yet
    #[display("round is still open")]
    RoundOpen,
    /// The final has not been resolved yet
    #[display("final is not resolved")]
    Unresolved,
}

/// Errors that can occur while scoring a competition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A prerequisite round has no recorded scores
    #[error("round {0} has not been recorded yet")]
    MissingDependency(RoundKind),
    /// The operator has not supplied a required field
    #[error("incomplete input: {0}")]
    IncompleteInput(Incomplete),
    /// The score store failed to read or write
    #[error("score store failure: {0}")]
    Store(#[from] store::Error),
    /// Not enough teams are available for the step
    #[error("{required} teams are required but only {available} are available")]
    InsufficientTeams {
        /// Number of teams the step needs
        required: usize,
        /// Number of distinct teams available
        available: usize,
    },
    /// The round or final no longer accepts changes
    #[error("round is locked")]
    Locked,
    /// The round already has records in the store
    #[error("round {0} has already been recorded")]
    AlreadyRecorded(RoundKind),
    /// The team is not part of this sheet or competition
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    /// The member index is outside the team
    #[error("team {team} has no member {member}")]
    UnknownMember {
        /// The team that was addressed
        team: TeamId,
        /// The requested member index
        member: usize,
    },
    /// A circle index past the last circle
    #[error("circle {0} does not exist")]
    CircleOutOfRange(u8),
    /// A buzzer board cell outside the grid
    #[error("buzzer cell ({row}, {column}) does not exist")]
    CellOutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        column: usize,
    },
    /// An entered score is larger than [`Points::MAX`] in magnitude
    #[error("score {0} is out of range")]
    PointsOutOfRange(Points),
    /// Final rounds are only recorded together through a resolved final
    #[error("round {0} is recorded with the final")]
    FinalRound(RoundKind),
    /// Team registration was rejected
    #[error(transparent)]
    Team(#[from] teams::Error),
}

impl From<Incomplete> for Error {
    fn from(incomplete: Incomplete) -> Self {
        Error::IncompleteInput(incomplete)
    }
}
