//! Team registration and validation
//!
//! Teams are entered once at setup as drafts: a name and a list of member
//! names. Blank names fall back to `Team N` and `Member N`. Names are shown
//! on the public scoreboard, so they are trimmed, bounded in length and
//! screened for inappropriate content before a team is registered.

use std::collections::HashSet;

use garde::Validate;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::teams::{MAX_MEMBER_COUNT, MAX_NAME_LENGTH},
    id::TeamId,
};

/// A registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier assigned by the store
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Member names in roster order
    pub members: Vec<String>,
}

/// A validated team ready to be inserted into the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    /// Display name
    pub name: String,
    /// Member names in roster order
    pub members: Vec<String>,
}

/// Operator input for one team at setup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TeamDraft {
    /// Requested team name, blank for the default
    ///
    /// Length is checked in characters once surrounding whitespace is
    /// trimmed, when the draft is prepared.
    #[garde(skip)]
    pub name: String,
    /// Requested member names, blank entries for defaults
    #[garde(length(max = MAX_MEMBER_COUNT))]
    pub members: Vec<String>,
}

impl TeamDraft {
    /// Creates a draft from a team name and member names
    pub fn new<S: Into<String>, M: IntoIterator<Item = S>>(name: S, members: M) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors that can occur while registering teams
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The number of drafts does not match the configured team count
    #[error("expected {expected} teams, got {found}")]
    TeamCount {
        /// Configured team count
        expected: usize,
        /// Number of drafts supplied
        found: usize,
    },
    /// A draft lists more members than a team holds
    #[error("team {team} lists {found} members but teams hold {expected}")]
    MemberCount {
        /// 1-indexed position of the draft
        team: usize,
        /// Configured member count
        expected: usize,
        /// Number of members supplied
        found: usize,
    },
    /// A name exceeds the maximum length
    #[error("name is too long")]
    TooLong,
    /// A name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// Two teams share a name
    #[error("team name `{0}` is already in use")]
    Duplicate(String),
}

/// Trims a requested name, falling back when it is blank
fn clean_name(requested: &str, fallback: impl FnOnce() -> String) -> Result<String, Error> {
    let trimmed = rustrict::trim_whitespace(requested);
    if trimmed.is_empty() {
        return Ok(fallback());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::TooLong);
    }
    if trimmed.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(trimmed.to_owned())
}

/// Cleans a member list, padding it to `member_count` with default names
///
/// # Errors
///
/// Returns an [`Error`] for lists longer than `member_count` or names that
/// fail validation. `team` is the 1-indexed draft position used in errors.
pub fn prepare_members(
    team: usize,
    members: &[String],
    member_count: usize,
) -> Result<Vec<String>, Error> {
    if members.len() > member_count {
        return Err(Error::MemberCount {
            team,
            expected: member_count,
            found: members.len(),
        });
    }
    (0..member_count)
        .map(|i| {
            let requested = members.get(i).map_or("", String::as_str);
            clean_name(requested, || format!("Member {}", i + 1))
        })
        .collect()
}

/// Validates drafts and turns them into teams ready for the store
///
/// # Errors
///
/// Returns an [`Error`] when the count is wrong, a name is invalid, or two
/// teams end up with the same name.
pub fn prepare(
    drafts: &[TeamDraft],
    team_count: usize,
    member_count: usize,
) -> Result<Vec<NewTeam>, Error> {
    if drafts.len() != team_count {
        return Err(Error::TeamCount {
            expected: team_count,
            found: drafts.len(),
        });
    }

    let mut seen = HashSet::new();
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            if draft.validate().is_err() {
                return Err(Error::MemberCount {
                    team: i + 1,
                    expected: member_count,
                    found: draft.members.len(),
                });
            }
            let name = clean_name(&draft.name, || format!("Team {}", i + 1))?;
            if !seen.insert(name.to_lowercase()) {
                return Err(Error::Duplicate(name));
            }
            Ok(NewTeam {
                name,
                members: prepare_members(i + 1, &draft.members, member_count)?,
            })
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn blank_drafts(count: usize) -> Vec<TeamDraft> {
        vec![TeamDraft::default(); count]
    }

    #[test]
    fn test_defaults_fill_blanks() {
        let teams = prepare(&blank_drafts(2), 2, 3).unwrap();
        assert_eq!(teams[0].name, "Team 1");
        assert_eq!(teams[1].name, "Team 2");
        assert_eq!(teams[1].members, vec!["Member 1", "Member 2", "Member 3"]);
    }

    #[test]
    fn test_names_are_trimmed() {
        let drafts = vec![TeamDraft::new("  Owls ", ["Asha", "", " Ravi "])];
        let teams = prepare(&drafts, 1, 3).unwrap();
        assert_eq!(teams[0].name, "Owls");
        assert_eq!(teams[0].members, vec!["Asha", "Member 2", "Ravi"]);
    }

    #[test]
    fn test_short_member_list_is_padded() {
        let drafts = vec![TeamDraft::new("Owls", ["Asha"])];
        let teams = prepare(&drafts, 1, 2).unwrap();
        assert_eq!(teams[0].members, vec!["Asha", "Member 2"]);
    }

    #[test]
    fn test_wrong_team_count() {
        assert_eq!(
            prepare(&blank_drafts(3), 5, 5),
            Err(Error::TeamCount {
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn test_too_many_members() {
        let drafts = vec![TeamDraft::new("Owls", ["A", "B", "C"])];
        assert_eq!(
            prepare(&drafts, 1, 2),
            Err(Error::MemberCount {
                team: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_name_too_long() {
        let drafts = vec![TeamDraft::new("a".repeat(MAX_NAME_LENGTH + 1), Vec::<String>::new())];
        assert_eq!(prepare(&drafts, 1, 1), Err(Error::TooLong));

        let at_limit = vec![TeamDraft::new("a".repeat(MAX_NAME_LENGTH), Vec::<String>::new())];
        assert!(prepare(&at_limit, 1, 1).is_ok());
    }

    #[test]
    fn test_length_counts_trimmed_characters() {
        let devanagari = "टीम".repeat(5);
        assert_eq!(devanagari.chars().count(), 15);
        assert!(devanagari.len() > MAX_NAME_LENGTH);

        let padded = format!("  {}  ", "b".repeat(MAX_NAME_LENGTH - 2));
        let drafts = vec![
            TeamDraft::new(devanagari.clone(), vec![devanagari.clone()]),
            TeamDraft::new(padded, Vec::<String>::new()),
        ];
        let teams = prepare(&drafts, 2, 1).unwrap();
        assert_eq!(teams[0].name, devanagari);
        assert_eq!(teams[0].members, vec![devanagari]);
        assert_eq!(teams[1].name, "b".repeat(MAX_NAME_LENGTH - 2));

        let long = vec![TeamDraft::new("é".repeat(MAX_NAME_LENGTH + 1), Vec::<String>::new())];
        assert_eq!(prepare(&long, 1, 1), Err(Error::TooLong));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let drafts = vec![
            TeamDraft::new("Owls", Vec::<&str>::new()),
            TeamDraft::new("owls", Vec::<&str>::new()),
        ];
        assert_eq!(
            prepare(&drafts, 2, 1),
            Err(Error::Duplicate("owls".to_string()))
        );
    }

    #[test]
    fn test_draft_validation_bounds() {
        let mut draft = TeamDraft::new("Owls", vec!["x"; MAX_MEMBER_COUNT]);
        assert!(draft.validate().is_ok());
        draft.members.push("y".to_string());
        assert!(draft.validate().is_err());

        let padded = TeamDraft::new(format!("   {}   ", "a".repeat(MAX_NAME_LENGTH)), Vec::<String>::new());
        assert!(padded.validate().is_ok());
    }
}
