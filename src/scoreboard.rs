//! Running scoreboard
//!
//! The scoreboard sums every recorded score of every team across all
//! rounds played so far and ranks the teams by that total. Teams without
//! any record still appear, with zero points. Ties keep the registration
//! order of the teams.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::{TruncatedVec, id::TeamId, points::Points, store::ScoreRecord, teams::Team};

/// Maximum number of rows sent to a scoreboard display
const DISPLAY_LIMIT: usize = 50;

/// A team's scoreboard line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    /// The team
    pub team: TeamId,
    /// The team's display name
    pub name: String,
    /// Sum of every recorded score
    pub points: Points,
}

/// Score information for a single team
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMessage {
    /// Total points earned by the team
    pub points: Points,
    /// Current position on the scoreboard (1-indexed)
    pub position: usize,
}

/// Ranked totals of every team
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scoreboard {
    /// Lines in descending order of points
    lines: Vec<ScoreLine>,

    /// Mapping from team to its total and 0-indexed position
    #[serde(skip)]
    score_and_position: HashMap<TeamId, (Points, usize)>,
}

impl Scoreboard {
    /// Builds the scoreboard from the registered teams and their records
    ///
    /// Records for teams that are not registered are ignored.
    pub fn new(teams: &[Team], records: &[ScoreRecord]) -> Self {
        let mut totals: HashMap<TeamId, Points> = HashMap::new();
        for record in records {
            let total = totals.entry(record.team_id).or_default();
            *total = total.saturating_add(record.points());
        }

        let lines = teams
            .iter()
            .map(|team| ScoreLine {
                team: team.id,
                name: team.name.clone(),
                points: totals.get(&team.id).copied().unwrap_or_default(),
            })
            .sorted_by(|a, b| b.points.cmp(&a.points))
            .collect_vec();

        let score_and_position = lines
            .iter()
            .enumerate()
            .map(|(position, line)| (line.team, (line.points, position)))
            .collect();

        Self {
            lines,
            score_and_position,
        }
    }

    /// All lines, best first
    pub fn lines(&self) -> &[ScoreLine] {
        &self.lines
    }

    /// The leading lines for display along with the total team count
    pub fn top(&self, limit: usize) -> TruncatedVec<ScoreLine> {
        TruncatedVec::new(self.lines.iter().cloned(), limit, self.lines.len())
    }

    /// The lines a display shows by default
    pub fn display(&self) -> TruncatedVec<ScoreLine> {
        self.top(DISPLAY_LIMIT)
    }

    /// Gets a team's total and 1-indexed position
    ///
    /// Returns `None` for teams that are not registered.
    pub fn score(&self, team: TeamId) -> Option<ScoreMessage> {
        let (points, position) = self.score_and_position.get(&team)?;
        Some(ScoreMessage {
            points: *points,
            position: position + 1,
        })
    }

    /// A team's 1-indexed position
    pub fn position(&self, team: TeamId) -> Option<usize> {
        self.score(team).map(|message| message.position)
    }
}
