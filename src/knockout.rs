//! Knockout round one: subject circle sheet
//!
//! Each team answers questions in every subject and the operator marks a
//! circle per correct answer. The team's round total is the credit-weighted
//! number of marks divided by the normalization constant.

use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Incomplete},
    id::TeamId,
    marks::CircleSelection,
    points::Points,
    round::{RoundScore, RoundSheet, RoundState},
    subject::{Credits, Subject},
};

/// Scoring parameters for a circle-marked round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleScoring {
    /// Credit weight per subject
    pub credits: Credits,
    /// Raw points per selected circle
    pub mark_value: u32,
    /// Divisor applied to the weighted sum
    pub normalization: u32,
}

impl CircleScoring {
    /// Weighted contribution of one subject cell, before normalization
    pub fn weighted(&self, subject: Subject, marks: CircleSelection) -> Points {
        Points::whole(i64::from(marks.count() * self.mark_value))
            .times(i64::from(self.credits[subject]))
    }

    /// Rounded total for a full row of subject cells
    pub fn total(&self, row: &EnumMap<Subject, CircleSelection>) -> Points {
        row.iter()
            .map(|(subject, marks)| self.weighted(subject, *marks))
            .sum::<Points>()
            .div_round(i64::from(self.normalization))
    }
}

/// The knockout circle sheet covering every registered team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnockoutSheet {
    scoring: CircleScoring,
    rows: Vec<(TeamId, EnumMap<Subject, CircleSelection>)>,
    state: RoundState,
}

impl KnockoutSheet {
    /// Creates an open sheet with no circles marked
    pub fn new<I: IntoIterator<Item = TeamId>>(teams: I, scoring: CircleScoring) -> Self {
        Self {
            scoring,
            rows: teams
                .into_iter()
                .unique()
                .map(|team| (team, EnumMap::default()))
                .collect(),
            state: RoundState::Open,
        }
    }

    fn row(&self, team: TeamId) -> Result<&EnumMap<Subject, CircleSelection>, Error> {
        self.rows
            .iter()
            .find(|(id, _)| *id == team)
            .map(|(_, row)| row)
            .ok_or(Error::UnknownTeam(team))
    }

    /// Toggles a circle and returns whether it is now marked
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] once the sheet is locked,
    /// [`Error::UnknownTeam`] for teams not on the sheet and
    /// [`Error::CircleOutOfRange`] for invalid circles.
    pub fn toggle(&mut self, team: TeamId, subject: Subject, circle: u8) -> Result<bool, Error> {
        if let Err(e) = self.state.ensure_open() {
            warn!(%team, %subject, circle, "rejected circle toggle on a locked sheet");
            return Err(e);
        }
        let (_, row) = self
            .rows
            .iter_mut()
            .find(|(id, _)| *id == team)
            .ok_or(Error::UnknownTeam(team))?;
        let marked = row[subject].toggle(circle)?;
        debug!(%team, %subject, circle, marked, "knockout circle toggled");
        Ok(marked)
    }

    /// Marks currently selected for a team and subject
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not on the sheet.
    pub fn marks(&self, team: TeamId, subject: Subject) -> Result<CircleSelection, Error> {
        Ok(self.row(team)?[subject])
    }

    /// The running total for a team
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not on the sheet.
    pub fn total(&self, team: TeamId) -> Result<Points, Error> {
        Ok(self.scoring.total(self.row(team)?))
    }

    /// Locks the sheet; locking twice changes nothing
    pub fn lock(&mut self) {
        if self.state.lock() {
            info!(teams = self.rows.len(), "knockout circle sheet locked");
        }
    }
}

impl RoundSheet for KnockoutSheet {
    fn state(&self) -> RoundState {
        self.state
    }

    fn scores(&self) -> Result<Vec<RoundScore>, Error> {
        if !self.state.is_locked() {
            return Err(Incomplete::RoundOpen.into());
        }
        Ok(self
            .rows
            .iter()
            .map(|(team, row)| RoundScore {
                team: *team,
                total: self.scoring.total(row),
                breakdown: Some(EnumMap::from_fn(|subject| {
                    self.scoring.weighted(subject, row[subject])
                })),
            })
            .collect())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{constants::knockout, subject::default_credits};

    fn scoring() -> CircleScoring {
        CircleScoring {
            credits: default_credits(),
            mark_value: knockout::MARK_VALUE,
            normalization: knockout::NORMALIZATION,
        }
    }

    fn mark(sheet: &mut KnockoutSheet, team: TeamId, subject: Subject, count: u8) {
        for circle in 0..count {
            sheet.toggle(team, subject, circle).unwrap();
        }
    }

    #[test]
    fn test_no_marks_scores_zero() {
        let team = TeamId::new();
        let sheet = KnockoutSheet::new([team], scoring());
        assert_eq!(sheet.total(team), Ok(Points::ZERO));
    }

    #[test]
    fn test_weighted_total() {
        let team = TeamId::new();
        let mut sheet = KnockoutSheet::new([team], scoring());
        // 5*3 + 5*3 + 5*2 + 5*1 + 5*1 = 50 -> 5.00
        for subject in Subject::ALL {
            mark(&mut sheet, team, subject, 5);
        }
        assert_eq!(sheet.total(team), Ok(Points::whole(5)));
    }

    #[test]
    fn test_fractional_total() {
        let team = TeamId::new();
        let mut sheet = KnockoutSheet::new([team], scoring());
        // maths 2*3 + gk 1*1 = 7 -> 0.70
        mark(&mut sheet, team, Subject::Maths, 2);
        mark(&mut sheet, team, Subject::Gk, 1);
        assert_eq!(sheet.total(team), Ok(Points::from_hundredths(70)));
    }

    #[test]
    fn test_toggle_off_removes_mark() {
        let team = TeamId::new();
        let mut sheet = KnockoutSheet::new([team], scoring());
        assert_eq!(sheet.toggle(team, Subject::It, 3), Ok(true));
        assert_eq!(sheet.toggle(team, Subject::It, 3), Ok(false));
        assert_eq!(sheet.total(team), Ok(Points::ZERO));
    }

    #[test]
    fn test_locked_sheet_is_frozen() {
        let team = TeamId::new();
        let mut sheet = KnockoutSheet::new([team], scoring());
        mark(&mut sheet, team, Subject::Science, 3);
        sheet.lock();
        let before = sheet.scores().unwrap();

        assert_eq!(sheet.toggle(team, Subject::Science, 4), Err(Error::Locked));
        sheet.lock();
        assert_eq!(sheet.state(), RoundState::Locked);
        assert_eq!(sheet.scores().unwrap(), before);
    }

    #[test]
    fn test_scores_include_breakdown() {
        let team = TeamId::new();
        let mut sheet = KnockoutSheet::new([team], scoring());
        mark(&mut sheet, team, Subject::Maths, 4);
        mark(&mut sheet, team, Subject::Sports, 2);
        sheet.lock();

        let scores = sheet.scores().unwrap();
        let breakdown = scores[0].breakdown.unwrap();
        assert_eq!(breakdown[Subject::Maths], Points::whole(12));
        assert_eq!(breakdown[Subject::Sports], Points::whole(2));
        assert_eq!(breakdown[Subject::It], Points::ZERO);

        let weighted: Points = breakdown.values().copied().sum();
        assert_eq!(scores[0].total, weighted.div_round(10));
        assert_eq!(scores[0].total, Points::from_hundredths(140));
    }

    #[test]
    fn test_scores_require_lock() {
        let sheet = KnockoutSheet::new([TeamId::new()], scoring());
        assert_eq!(
            sheet.scores(),
            Err(Error::IncompleteInput(Incomplete::RoundOpen))
        );
    }
}
