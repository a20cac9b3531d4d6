//! In-memory score store
//!
//! Keeps every table in memory and can be saved to and restored from a
//! JSON snapshot, which is how a single-machine event keeps its scores
//! across restarts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Error, ScoreRecord, ScoreStore};
use crate::{
    id::{RoundId, TeamId},
    teams::{NewTeam, Team},
};

/// Serialization helper for [`MemoryStore`]
#[derive(Deserialize)]
struct MemoryStoreSerde {
    teams: Vec<Team>,
    rounds: Vec<(String, RoundId)>,
    scores: Vec<ScoreRecord>,
}

/// A [`ScoreStore`] held entirely in memory
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "MemoryStoreSerde")]
pub struct MemoryStore {
    teams: Vec<Team>,
    rounds: Vec<(String, RoundId)>,
    scores: Vec<ScoreRecord>,

    /// Round lookup by name (rebuilt on load)
    #[serde(skip)]
    round_index: HashMap<String, RoundId>,
}

impl From<MemoryStoreSerde> for MemoryStore {
    /// Rebuilds the round index from the stored rounds
    fn from(serde: MemoryStoreSerde) -> Self {
        let MemoryStoreSerde {
            teams,
            rounds,
            scores,
        } = serde;
        let round_index = rounds.iter().cloned().collect();
        Self {
            teams,
            rounds,
            scores,
            round_index,
        }
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes every table to JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::Snapshot(e.to_string()))
    }

    /// Restores a store from a JSON snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] if the snapshot is malformed.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Snapshot(e.to_string()))
    }

    /// Every stored record across all rounds
    pub fn all_scores(&self) -> &[ScoreRecord] {
        &self.scores
    }
}

impl ScoreStore for MemoryStore {
    fn fetch_scores(&self, round: RoundId) -> Result<Vec<ScoreRecord>, Error> {
        Ok(self
            .scores
            .iter()
            .filter(|record| record.round_id == round)
            .copied()
            .collect())
    }

    fn fetch_teams(&self) -> Result<Vec<Team>, Error> {
        Ok(self.teams.clone())
    }

    fn persist_scores(&mut self, round: RoundId, records: &[ScoreRecord]) -> Result<(), Error> {
        if !self.round_index.values().any(|id| *id == round) {
            return Err(Error::NotFound(format!("round {round}")));
        }
        if let Some(stray) = records.iter().find(|r| r.round_id != round) {
            return Err(Error::Rejected(format!(
                "record for round {} written to round {round}",
                stray.round_id
            )));
        }
        if let Some(stray) = records
            .iter()
            .find(|r| !self.teams.iter().any(|t| t.id == r.team_id))
        {
            return Err(Error::NotFound(format!("team {}", stray.team_id)));
        }
        self.scores.extend_from_slice(records);
        debug!(%round, count = records.len(), "scores persisted");
        Ok(())
    }

    fn get_or_create_round(&mut self, name: &str) -> Result<RoundId, Error> {
        if let Some(id) = self.round_index.get(name) {
            return Ok(*id);
        }
        let id = RoundId::new();
        self.rounds.push((name.to_owned(), id));
        self.round_index.insert(name.to_owned(), id);
        debug!(name, %id, "round created");
        Ok(id)
    }

    fn insert_team(&mut self, team: NewTeam) -> Result<Team, Error> {
        let team = Team {
            id: TeamId::new(),
            name: team.name,
            members: team.members,
        };
        self.teams.push(team.clone());
        Ok(team)
    }

    fn update_members(&mut self, team: TeamId, members: Vec<String>) -> Result<(), Error> {
        let stored = self
            .teams
            .iter_mut()
            .find(|t| t.id == team)
            .ok_or_else(|| Error::NotFound(format!("team {team}")))?;
        stored.members = members;
        Ok(())
    }
}
