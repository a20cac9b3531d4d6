//! Qualification standings
//!
//! Two rounds of a stage are merged into a single ranking: a team's total
//! is the sum of its scores in both rounds, where a round it does not
//! appear in counts as zero. Ranking is by descending total; ties keep the
//! order in which teams first appeared across the two rounds.
//!
//! Everything here is a pure function of the round snapshots passed in.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{constants::finale::FINALIST_COUNT, error::Error, id::TeamId, points::Points};

/// One team's merged result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// The team
    pub team: TeamId,
    /// Score in the first round of the stage
    pub first: Points,
    /// Score in the second round of the stage
    pub second: Points,
    /// Sum of both rounds
    pub total: Points,
}

/// Ranked merge of two rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    ranked: Vec<Standing>,
}

impl Standings {
    /// Merges two rounds of `(team, score)` pairs into a ranking
    ///
    /// Repeated entries for the same team within a round are summed.
    pub fn merge(first: &[(TeamId, Points)], second: &[(TeamId, Points)]) -> Self {
        let mut order: Vec<Standing> = Vec::new();
        let mut index: HashMap<TeamId, usize> = HashMap::new();

        let mut slot = |team: TeamId| -> usize {
            *index.entry(team).or_insert_with(|| {
                order.push(Standing {
                    team,
                    first: Points::ZERO,
                    second: Points::ZERO,
                    total: Points::ZERO,
                });
                order.len() - 1
            })
        };

        let first_slots = first.iter().map(|(team, _)| slot(*team)).collect_vec();
        let second_slots = second.iter().map(|(team, _)| slot(*team)).collect_vec();

        for (i, (_, points)) in first_slots.into_iter().zip(first) {
            order[i].first = order[i].first.saturating_add(*points);
        }
        for (i, (_, points)) in second_slots.into_iter().zip(second) {
            order[i].second = order[i].second.saturating_add(*points);
        }

        let ranked = order
            .into_iter()
            .map(|s| Standing {
                total: s.first.saturating_add(s.second),
                ..s
            })
            .sorted_by(|a, b| b.total.cmp(&a.total))
            .collect();

        Self { ranked }
    }

    /// All standings, best first
    pub fn ranked(&self) -> &[Standing] {
        &self.ranked
    }

    /// Number of ranked teams
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether no team has a score
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// The first `n` standings, or all of them if fewer are ranked
    pub fn top_k(&self, n: usize) -> &[Standing] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// Exactly the first `n` standings
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientTeams`] when fewer than `n` teams are
    /// ranked.
    pub fn advancing(&self, n: usize) -> Result<&[Standing], Error> {
        if self.ranked.len() < n {
            return Err(Error::InsufficientTeams {
                required: n,
                available: self.ranked.len(),
            });
        }
        Ok(&self.ranked[..n])
    }

    /// The two teams that contest the final, best first
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientTeams`] when fewer than two distinct
    /// teams are ranked.
    pub fn finalists(&self) -> Result<[TeamId; FINALIST_COUNT], Error> {
        match self.advancing(FINALIST_COUNT)? {
            [a, b] => Ok([a.team, b.team]),
            other => Err(Error::InsufficientTeams {
                required: FINALIST_COUNT,
                available: other.len(),
            }),
        }
    }

    /// Every standing paired with whether it is among the first `n`
    pub fn flagged(&self, n: usize) -> impl Iterator<Item = (&Standing, bool)> + '_ {
        self.ranked.iter().enumerate().map(move |(i, s)| (s, i < n))
    }

    /// 1-indexed rank of a team
    pub fn position(&self, team: TeamId) -> Option<usize> {
        self.ranked.iter().position(|s| s.team == team).map(|i| i + 1)
    }

    /// The merged entry of a team
    pub fn get(&self, team: TeamId) -> Option<&Standing> {
        self.ranked.iter().find(|s| s.team == team)
    }
}
