//! Score record store
//!
//! The competition never talks to a database directly. Everything it reads
//! or writes goes through the [`ScoreStore`] trait, which mirrors the four
//! tables of the hosted store: `teams`, `players`, `rounds` and `scores`.
//!
//! Points cross this boundary as integers scaled by 100. [`ScoreRecord`]
//! is the only place that converts between that integer and [`Points`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    id::{RoundId, TeamId},
    points::Points,
    teams::{NewTeam, Team},
};

pub mod memory;

pub use memory::MemoryStore;

/// Errors reported by a score store
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The store could not be reached or failed to answer
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
    /// A referenced row does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// A snapshot could not be read or written
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// A persisted score row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// The team the points belong to
    pub team_id: TeamId,
    /// The round the points were earned in
    pub round_id: RoundId,
    /// Points scaled by 100
    pub points: i64,
}

impl ScoreRecord {
    /// Creates a record from unscaled points
    pub fn new(team_id: TeamId, round_id: RoundId, points: Points) -> Self {
        Self {
            team_id,
            round_id,
            points: points.hundredths(),
        }
    }

    /// The record's points, descaled
    pub fn points(&self) -> Points {
        Points::from_hundredths(self.points)
    }
}

/// Narrow read/write contract to the external score store
///
/// Calls are plain request/response. Implementations report failures as
/// [`Error`] and never substitute empty results for failed reads.
pub trait ScoreStore {
    /// All records of a round, in insertion order
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the store cannot be read.
    fn fetch_scores(&self, round: RoundId) -> Result<Vec<ScoreRecord>, Error>;

    /// All registered teams, in registration order
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the store cannot be read.
    fn fetch_teams(&self) -> Result<Vec<Team>, Error>;

    /// Appends records to a round
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the write fails; no records are written then.
    fn persist_scores(&mut self, round: RoundId, records: &[ScoreRecord]) -> Result<(), Error>;

    /// Looks up a round by name, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the store cannot be read or written.
    fn get_or_create_round(&mut self, name: &str) -> Result<RoundId, Error>;

    /// Inserts a team with its members and returns the stored team
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the write fails.
    fn insert_team(&mut self, team: NewTeam) -> Result<Team, Error>;

    /// Replaces a team's member list
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown teams, or another [`Error`]
    /// if the write fails.
    fn update_members(&mut self, team: TeamId, members: Vec<String>) -> Result<(), Error>;
}
