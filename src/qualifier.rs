//! Qualifier round one: member-level scoring
//!
//! Every member of an advancing team picks a subject, earns circles for
//! correct answers and may receive extra points. A member's raw score is
//! `circles × mark_value + extra`; the team total weights each member's raw
//! score by the credit of the subject they chose and divides by the
//! normalization constant.
//!
//! Teams are finished one at a time. A finished team is locked even while
//! other teams are still being scored.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Incomplete},
    id::TeamId,
    knockout::CircleScoring,
    marks::CircleSelection,
    points::Points,
    round::{RoundScore, RoundSheet, RoundState},
    subject::Subject,
    teams::Team,
};

/// One member's entries on the qualifier sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    /// The member's display name
    pub name: String,
    /// The subject the member answers in
    pub subject: Option<Subject>,
    /// Correct answers marked by the operator
    pub circles: CircleSelection,
    /// Flat bonus added before credit weighting
    pub extra: Option<Points>,
}

impl MemberEntry {
    /// Raw score before credit weighting
    pub fn raw(&self, mark_value: u32) -> Points {
        Points::whole(i64::from(self.circles.count() * mark_value)) + self.extra.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TeamEntries {
    team: TeamId,
    members: Vec<MemberEntry>,
    state: RoundState,
    total: Option<Points>,
}

/// The member-level qualifier sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifierSheet {
    scoring: CircleScoring,
    teams: Vec<TeamEntries>,
}

impl QualifierSheet {
    /// Creates an open sheet for the given teams and their members
    pub fn new<'a, I: IntoIterator<Item = &'a Team>>(teams: I, scoring: CircleScoring) -> Self {
        let mut entries: Vec<TeamEntries> = Vec::new();
        for team in teams {
            if entries.iter().any(|e| e.team == team.id) {
                continue;
            }
            entries.push(TeamEntries {
                team: team.id,
                members: team
                    .members
                    .iter()
                    .map(|name| MemberEntry {
                        name: name.clone(),
                        ..MemberEntry::default()
                    })
                    .collect(),
                state: RoundState::Open,
                total: None,
            });
        }
        Self {
            scoring,
            teams: entries,
        }
    }

    fn entries(&self, team: TeamId) -> Result<&TeamEntries, Error> {
        self.teams
            .iter()
            .find(|e| e.team == team)
            .ok_or(Error::UnknownTeam(team))
    }

    fn member_mut(&mut self, team: TeamId, member: usize) -> Result<&mut MemberEntry, Error> {
        let entries = self
            .teams
            .iter_mut()
            .find(|e| e.team == team)
            .ok_or(Error::UnknownTeam(team))?;
        if let Err(e) = entries.state.ensure_open() {
            warn!(%team, member, "rejected qualifier change on a finished team");
            return Err(e);
        }
        entries
            .members
            .get_mut(member)
            .ok_or(Error::UnknownMember { team, member })
    }

    /// Chooses the subject a member answers in
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] once the team is finished, or
    /// [`Error::UnknownTeam`]/[`Error::UnknownMember`] for bad addresses.
    pub fn select_subject(
        &mut self,
        team: TeamId,
        member: usize,
        subject: Subject,
    ) -> Result<(), Error> {
        self.member_mut(team, member)?.subject = Some(subject);
        debug!(%team, member, %subject, "qualifier subject selected");
        Ok(())
    }

    /// Toggles a member's circle and returns whether it is now marked
    ///
    /// # Errors
    ///
    /// As [`QualifierSheet::select_subject`], plus
    /// [`Error::CircleOutOfRange`] for invalid circles.
    pub fn toggle(&mut self, team: TeamId, member: usize, circle: u8) -> Result<bool, Error> {
        let marked = self.member_mut(team, member)?.circles.toggle(circle)?;
        debug!(%team, member, circle, marked, "qualifier circle toggled");
        Ok(marked)
    }

    /// Sets or clears a member's extra points
    ///
    /// # Errors
    ///
    /// As [`QualifierSheet::select_subject`], plus
    /// [`Error::PointsOutOfRange`] past [`Points::MAX`].
    pub fn set_extra(
        &mut self,
        team: TeamId,
        member: usize,
        extra: Option<Points>,
    ) -> Result<(), Error> {
        if let Some(points) = extra.filter(|points| !points.in_range()) {
            return Err(Error::PointsOutOfRange(points));
        }
        self.member_mut(team, member)?.extra = extra;
        debug!(%team, member, ?extra, "qualifier extra points set");
        Ok(())
    }

    /// A team's member entries in roster order
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not on the sheet.
    pub fn members(&self, team: TeamId) -> Result<&[MemberEntry], Error> {
        Ok(&self.entries(team)?.members)
    }

    /// The running total for a team
    ///
    /// Members without a subject contribute nothing until one is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not on the sheet.
    pub fn total(&self, team: TeamId) -> Result<Points, Error> {
        let entries = self.entries(team)?;
        Ok(self.weighted_sum(&entries.members).div_round(i64::from(self.scoring.normalization)))
    }

    fn weighted_sum(&self, members: &[MemberEntry]) -> Points {
        members
            .iter()
            .filter_map(|m| {
                m.subject.map(|subject| {
                    m.raw(self.scoring.mark_value)
                        .times(i64::from(self.scoring.credits[subject]))
                })
            })
            .sum()
    }

    fn breakdown(&self, members: &[MemberEntry]) -> EnumMap<Subject, Points> {
        let mut breakdown: EnumMap<Subject, Points> = EnumMap::default();
        for member in members {
            if let Some(subject) = member.subject {
                breakdown[subject] += member
                    .raw(self.scoring.mark_value)
                    .times(i64::from(self.scoring.credits[subject]));
            }
        }
        breakdown
    }

    /// Finishes a team, fixing its total
    ///
    /// Finishing an already finished team returns the fixed total again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] naming the first member without a
    /// subject; the team stays open so the operator can correct it.
    pub fn finish_team(&mut self, team: TeamId) -> Result<Points, Error> {
        let entries = self.entries(team)?;
        if let (RoundState::Locked, Some(total)) = (entries.state, entries.total) {
            return Ok(total);
        }
        if let Some(member) = entries.members.iter().position(|m| m.subject.is_none()) {
            return Err(Incomplete::Subject { team, member }.into());
        }
        let total = self.total(team)?;

        let entries = self
            .teams
            .iter_mut()
            .find(|e| e.team == team)
            .ok_or(Error::UnknownTeam(team))?;
        entries.state.lock();
        entries.total = Some(total);
        info!(%team, %total, "qualifier team finished");
        Ok(total)
    }

    /// Lock state of a single team
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for teams not on the sheet.
    pub fn team_state(&self, team: TeamId) -> Result<RoundState, Error> {
        Ok(self.entries(team)?.state)
    }
}

impl RoundSheet for QualifierSheet {
    /// The sheet is locked once every team is finished
    fn state(&self) -> RoundState {
        if self.teams.iter().all(|e| e.state.is_locked()) {
            RoundState::Locked
        } else {
            RoundState::Open
        }
    }

    fn scores(&self) -> Result<Vec<RoundScore>, Error> {
        self.teams
            .iter()
            .map(|e| match (e.state, e.total) {
                (RoundState::Locked, Some(total)) => Ok(RoundScore {
                    team: e.team,
                    total,
                    breakdown: Some(self.breakdown(&e.members)),
                }),
                _ => Err(Incomplete::TeamOpen(e.team).into()),
            })
            .collect()
    }
}
