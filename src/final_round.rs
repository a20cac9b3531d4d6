//! The final: two finalists, two numeric rounds and a buzzer round
//!
//! A finalist's grand total is the sum of both numeric rounds and the
//! buzzer tally. The team with the strictly greater total wins; equal
//! totals are a draw.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    buzzer::{BuzzerBoard, Cell},
    constants::finale::FINALIST_COUNT,
    error::{Error, Incomplete},
    id::TeamId,
    points::Points,
    round::{RoundKind, RoundScore, RoundSheet},
    sheet::{BlankPolicy, ScoreSheet},
};

/// A finalist's three sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalistScore {
    /// The finalist
    pub team: TeamId,
    /// Score in the first numeric round
    pub first: Points,
    /// Score in the second numeric round
    pub second: Points,
    /// Buzzer tally
    pub buzzer: Points,
}

impl FinalistScore {
    /// Sum of all three sub-scores
    pub fn total(&self) -> Points {
        self.first.saturating_add(self.second).saturating_add(self.buzzer)
    }
}

/// Result of the final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// A team finished with the strictly greater total
    Winner(TeamId),
    /// Both teams finished level
    Draw,
}

/// Both finalists' grand totals and the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalOutcome {
    /// The first finalist and their grand total
    pub team_a: (TeamId, Points),
    /// The second finalist and their grand total
    pub team_b: (TeamId, Points),
    /// Who won
    pub verdict: Verdict,
}

impl FinalOutcome {
    /// The winning team, `None` on a draw
    pub fn winner(&self) -> Option<TeamId> {
        match self.verdict {
            Verdict::Winner(team) => Some(team),
            Verdict::Draw => None,
        }
    }
}

/// Resolves the final from both finalists' sub-scores
///
/// # Errors
///
/// Returns [`Error::InsufficientTeams`] if both scores belong to the same
/// team.
pub fn resolve(a: &FinalistScore, b: &FinalistScore) -> Result<FinalOutcome, Error> {
    if a.team == b.team {
        return Err(Error::InsufficientTeams {
            required: FINALIST_COUNT,
            available: 1,
        });
    }
    let (total_a, total_b) = (a.total(), b.total());
    let verdict = match total_a.cmp(&total_b) {
        std::cmp::Ordering::Greater => Verdict::Winner(a.team),
        std::cmp::Ordering::Less => Verdict::Winner(b.team),
        std::cmp::Ordering::Equal => Verdict::Draw,
    };
    Ok(FinalOutcome {
        team_a: (a.team, total_a),
        team_b: (b.team, total_b),
        verdict,
    })
}

/// Data entry state of the final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalState {
    /// Sub-rounds are still being played
    Open,
    /// The outcome is fixed
    Resolved(FinalOutcome),
}

/// Live scoring state of the final
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalStage {
    finalists: [TeamId; FINALIST_COUNT],
    first: ScoreSheet,
    second: ScoreSheet,
    boards: [BuzzerBoard; FINALIST_COUNT],
    state: FinalState,
}

impl FinalStage {
    /// Opens the final for two distinct teams
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientTeams`] if both slots hold the same team.
    pub fn new(finalists: [TeamId; FINALIST_COUNT]) -> Result<Self, Error> {
        let [a, b] = finalists;
        if a == b {
            return Err(Error::InsufficientTeams {
                required: FINALIST_COUNT,
                available: 1,
            });
        }
        Ok(Self {
            finalists,
            first: ScoreSheet::new(finalists, BlankPolicy::Reject),
            second: ScoreSheet::new(finalists, BlankPolicy::Reject),
            boards: Default::default(),
            state: FinalState::Open,
        })
    }

    /// The two finalists in seeding order
    pub fn finalists(&self) -> [TeamId; FINALIST_COUNT] {
        self.finalists
    }

    /// Current state of the final
    pub fn state(&self) -> FinalState {
        self.state
    }

    /// The first numeric round's sheet
    pub fn first_round(&self) -> &ScoreSheet {
        &self.first
    }

    /// Mutable access to the first numeric round's sheet
    pub fn first_round_mut(&mut self) -> &mut ScoreSheet {
        &mut self.first
    }

    /// The second numeric round's sheet
    pub fn second_round(&self) -> &ScoreSheet {
        &self.second
    }

    /// Mutable access to the second numeric round's sheet
    pub fn second_round_mut(&mut self) -> &mut ScoreSheet {
        &mut self.second
    }

    fn slot(&self, team: TeamId) -> Result<usize, Error> {
        self.finalists
            .iter()
            .position(|t| *t == team)
            .ok_or(Error::UnknownTeam(team))
    }

    /// A finalist's buzzer board
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not in the final.
    pub fn board(&self, team: TeamId) -> Result<&BuzzerBoard, Error> {
        Ok(&self.boards[self.slot(team)?])
    }

    fn board_mut(&mut self, team: TeamId) -> Result<&mut BuzzerBoard, Error> {
        if matches!(self.state, FinalState::Resolved(_)) {
            warn!(%team, "rejected buzzer change after the final was resolved");
            return Err(Error::Locked);
        }
        let slot = self.slot(team)?;
        Ok(&mut self.boards[slot])
    }

    /// Toggles a finalist's buzzer cell between green and empty
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] after resolution, [`Error::UnknownTeam`]
    /// or [`Error::CellOutOfRange`] for bad addresses.
    pub fn toggle_buzzer(&mut self, team: TeamId, row: usize, column: usize) -> Result<Cell, Error> {
        self.board_mut(team)?.toggle(row, column)
    }

    /// Marks a finalist's buzzer cell as an incorrect buzz
    ///
    /// # Errors
    ///
    /// As [`FinalStage::toggle_buzzer`].
    pub fn mark_buzzer_wrong(&mut self, team: TeamId, row: usize, column: usize) -> Result<(), Error> {
        self.board_mut(team)?.mark_wrong(row, column)
    }

    /// Attributes a buzzer row to a member of the finalist's team
    ///
    /// # Errors
    ///
    /// As [`FinalStage::toggle_buzzer`].
    pub fn set_answered_by(
        &mut self,
        team: TeamId,
        row: usize,
        member: Option<String>,
    ) -> Result<(), Error> {
        self.board_mut(team)?.set_answered_by(row, member)
    }

    fn finalist_score(&self, slot: usize) -> Result<FinalistScore, Error> {
        let team = self.finalists[slot];
        let entry = |sheet: &ScoreSheet| -> Result<Points, Error> {
            if !sheet.state().is_locked() {
                return Err(Incomplete::RoundOpen.into());
            }
            sheet.get(team).ok_or_else(|| Incomplete::Score(team).into())
        };
        Ok(FinalistScore {
            team,
            first: entry(&self.first)?,
            second: entry(&self.second)?,
            buzzer: Points::whole(self.boards[slot].tally()),
        })
    }

    /// Resolves the final, freezing the buzzer boards
    ///
    /// Resolving again returns the same outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] unless both numeric rounds are
    /// locked with a score for each finalist.
    pub fn resolve(&mut self) -> Result<FinalOutcome, Error> {
        if let FinalState::Resolved(outcome) = self.state {
            return Ok(outcome);
        }
        let outcome = resolve(&self.finalist_score(0)?, &self.finalist_score(1)?)?;
        self.state = FinalState::Resolved(outcome);
        info!(
            team_a = %outcome.team_a.0,
            total_a = %outcome.team_a.1,
            team_b = %outcome.team_b.0,
            total_b = %outcome.team_b.1,
            verdict = ?outcome.verdict,
            "final resolved"
        );
        Ok(outcome)
    }

    /// Per-round scores for recording, in [`RoundKind::FINAL`] order
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] until the final is resolved.
    pub fn round_scores(&self) -> Result<[(RoundKind, Vec<RoundScore>); 3], Error> {
        if !matches!(self.state, FinalState::Resolved(_)) {
            return Err(Incomplete::Unresolved.into());
        }
        let buzzer = self
            .finalists
            .iter()
            .zip(&self.boards)
            .map(|(team, board)| RoundScore::new(*team, Points::whole(board.tally())))
            .collect();
        Ok([
            (RoundKind::FinalFirst, self.first.scores()?),
            (RoundKind::FinalSecond, self.second.scores()?),
            (RoundKind::FinalBuzzer, buzzer),
        ])
    }
}
