//! Direct score entry sheets
//!
//! Several rounds are scored by the operator typing one number per team:
//! the second knockout and qualifier rounds and both numeric rounds of the
//! final. A `ScoreSheet` holds those entries until it is locked.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Incomplete},
    id::TeamId,
    points::Points,
    round::{RoundScore, RoundSheet, RoundState},
};

/// What happens to blank entries when a sheet is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlankPolicy {
    /// Blank entries count as zero
    Zero,
    /// Locking fails while any entry is blank
    Reject,
}

/// One directly entered score per team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSheet {
    entries: Vec<(TeamId, Option<Points>)>,
    blanks: BlankPolicy,
    state: RoundState,
}

impl ScoreSheet {
    /// Creates an open sheet with a blank entry for every team
    pub fn new<I: IntoIterator<Item = TeamId>>(teams: I, blanks: BlankPolicy) -> Self {
        Self {
            entries: teams.into_iter().unique().map(|team| (team, None)).collect(),
            blanks,
            state: RoundState::Open,
        }
    }

    fn entry_mut(&mut self, team: TeamId) -> Result<&mut Option<Points>, Error> {
        self.entries
            .iter_mut()
            .find(|(id, _)| *id == team)
            .map(|(_, entry)| entry)
            .ok_or(Error::UnknownTeam(team))
    }

    fn update(&mut self, team: TeamId, value: Option<Points>) -> Result<(), Error> {
        if let Err(e) = self.state.ensure_open() {
            warn!(%team, "rejected score entry on a locked sheet");
            return Err(e);
        }
        *self.entry_mut(team)? = value;
        debug!(%team, ?value, "score entry updated");
        Ok(())
    }

    /// Sets a team's score
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] once the sheet is locked,
    /// [`Error::UnknownTeam`] for teams not on the sheet and
    /// [`Error::PointsOutOfRange`] past [`Points::MAX`].
    pub fn set(&mut self, team: TeamId, points: Points) -> Result<(), Error> {
        if !points.in_range() {
            return Err(Error::PointsOutOfRange(points));
        }
        self.update(team, Some(points))
    }

    /// Clears a team's score back to blank
    ///
    /// # Errors
    ///
    /// Same as [`ScoreSheet::set`].
    pub fn clear(&mut self, team: TeamId) -> Result<(), Error> {
        self.update(team, None)
    }

    /// Returns the entry for a team, `None` if blank or not on the sheet
    pub fn get(&self, team: TeamId) -> Option<Points> {
        self.entries
            .iter()
            .find(|(id, _)| *id == team)
            .and_then(|(_, entry)| *entry)
    }

    /// Teams on the sheet in listing order
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.entries.iter().map(|(team, _)| *team)
    }

    /// Locks the sheet
    ///
    /// Locking an already locked sheet succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// With [`BlankPolicy::Reject`], returns [`Error::IncompleteInput`]
    /// naming the first blank team and leaves the sheet open.
    pub fn lock(&mut self) -> Result<(), Error> {
        if self.state.is_locked() {
            return Ok(());
        }
        if self.blanks == BlankPolicy::Reject {
            if let Some((team, _)) = self.entries.iter().find(|(_, entry)| entry.is_none()) {
                return Err(Incomplete::Score(*team).into());
            }
        }
        if self.blanks == BlankPolicy::Zero {
            for (_, entry) in &mut self.entries {
                entry.get_or_insert(Points::ZERO);
            }
        }
        self.state.lock();
        info!(teams = self.entries.len(), "score sheet locked");
        Ok(())
    }
}

impl RoundSheet for ScoreSheet {
    fn state(&self) -> RoundState {
        self.state
    }

    fn scores(&self) -> Result<Vec<RoundScore>, Error> {
        if !self.state.is_locked() {
            return Err(Incomplete::RoundOpen.into());
        }
        Ok(self
            .entries
            .iter()
            .map(|(team, entry)| RoundScore::new(*team, entry.unwrap_or_default()))
            .collect())
    }
}
