//! A competition played against a score store
//!
//! [`Competition`] is the only part of the crate that performs I/O. It
//! registers teams, hands out sheets for every round, records locked sheets
//! as score records and reads those records back to rank teams. Every
//! ranking is computed from records fetched on demand, so a competition can
//! be dropped and rebuilt from its store at any point.

use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    config::{self, Config},
    constants::finale::FINALIST_COUNT,
    error::{Error, Incomplete},
    final_round::{self, FinalOutcome, FinalStage, FinalState, FinalistScore},
    id::{RoundId, TeamId},
    knockout::KnockoutSheet,
    points::Points,
    qualifier::QualifierSheet,
    round::{RoundKind, RoundScore, RoundSheet, Stage},
    scoreboard::Scoreboard,
    sheet::{BlankPolicy, ScoreSheet},
    standings::Standings,
    store::{ScoreRecord, ScoreStore},
    teams::{self, Team, TeamDraft},
};

/// Checks that a sheet scores exactly the teams a round is played by
fn match_teams(expected: &[TeamId], scores: &[RoundScore]) -> Result<(), Error> {
    if let Some(stray) = scores
        .iter()
        .map(|score| score.team)
        .find(|team| !expected.contains(team))
    {
        return Err(Error::UnknownTeam(stray));
    }
    let available = expected
        .iter()
        .filter(|team| scores.iter().any(|score| score.team == **team))
        .count();
    if available < expected.len() {
        return Err(Error::InsufficientTeams {
            required: expected.len(),
            available,
        });
    }
    Ok(())
}

fn to_records(round: RoundId, scores: &[RoundScore]) -> Vec<ScoreRecord> {
    scores
        .iter()
        .map(|score| ScoreRecord::new(score.team, round, score.total))
        .collect_vec()
}

/// A competition bound to its score store
#[derive(Debug)]
pub struct Competition<S: ScoreStore> {
    config: Config,
    store: S,
}

impl<S: ScoreStore> Competition<S> {
    /// Creates a competition over a store
    ///
    /// The store may already hold a competition in progress; nothing is
    /// read until an operation needs it.
    ///
    /// # Errors
    ///
    /// Returns [`config::Error::Invalid`] if the configuration is out of
    /// bounds.
    pub fn new(config: Config, store: S) -> Result<Self, config::Error> {
        config.check()?;
        Ok(Self { config, store })
    }

    /// The competition's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Registers every team of the competition
    ///
    /// # Arguments
    ///
    /// * `drafts` - one draft per team, blank names are filled with
    ///   `Team N` and `Member N`
    ///
    /// # Returns
    ///
    /// The stored teams in registration order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if teams are already registered,
    /// [`Error::Team`] for invalid drafts and [`Error::Store`] if a write
    /// fails.
    pub fn register_teams(&mut self, drafts: &[TeamDraft]) -> Result<Vec<Team>, Error> {
        if !self.store.fetch_teams()?.is_empty() {
            warn!("rejected team registration, teams are already registered");
            return Err(Error::Locked);
        }
        let prepared = teams::prepare(drafts, self.config.team_count, self.config.member_count)?;
        let teams = prepared
            .into_iter()
            .map(|team| self.store.insert_team(team))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = teams.len(), "teams registered");
        Ok(teams)
    }

    /// Replaces a team's member names
    ///
    /// Blank names fall back to `Member N` and the list is padded to the
    /// configured member count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTeam`] for unregistered teams, [`Error::Team`]
    /// for invalid names and [`Error::Store`] if the write fails.
    pub fn update_members(&mut self, team: TeamId, members: &[String]) -> Result<(), Error> {
        let position = self
            .store
            .fetch_teams()?
            .iter()
            .position(|t| t.id == team)
            .ok_or(Error::UnknownTeam(team))?;
        let members = teams::prepare_members(position + 1, members, self.config.member_count)?;
        self.store.update_members(team, members)?;
        info!(%team, "team members updated");
        Ok(())
    }

    /// All registered teams in registration order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn teams(&self) -> Result<Vec<Team>, Error> {
        Ok(self.store.fetch_teams()?)
    }

    fn team_ids(&self) -> Result<Vec<TeamId>, Error> {
        Ok(self.teams()?.into_iter().map(|team| team.id).collect())
    }

    fn round_id(&mut self, kind: RoundKind) -> Result<RoundId, Error> {
        Ok(self.store.get_or_create_round(&kind.name())?)
    }

    fn records(&mut self, kind: RoundKind) -> Result<Vec<ScoreRecord>, Error> {
        let round = self.round_id(kind)?;
        Ok(self.store.fetch_scores(round)?)
    }

    /// Whether a round has records in the store
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn is_recorded(&mut self, kind: RoundKind) -> Result<bool, Error> {
        Ok(!self.records(kind)?.is_empty())
    }

    /// The circle sheet for knockout round one, covering every team
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the teams cannot be read.
    pub fn knockout_sheet(&self) -> Result<KnockoutSheet, Error> {
        Ok(KnockoutSheet::new(
            self.team_ids()?,
            self.config.knockout_scoring(),
        ))
    }

    /// The direct entry sheet for knockout round two
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the teams cannot be read.
    pub fn knockout_direct_sheet(&self) -> Result<ScoreSheet, Error> {
        Ok(ScoreSheet::new(self.team_ids()?, BlankPolicy::Zero))
    }

    /// Per-team totals of a recorded round
    ///
    /// Records of the same team are summed. Teams appear in the order of
    /// their first record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] if the round has no records and
    /// [`Error::Store`] if the store cannot be read.
    pub fn round_totals(&mut self, kind: RoundKind) -> Result<Vec<(TeamId, Points)>, Error> {
        let records = self.records(kind)?;
        if records.is_empty() {
            return Err(Error::MissingDependency(kind));
        }
        let mut totals: Vec<(TeamId, Points)> = Vec::new();
        for record in records {
            match totals.iter().position(|(team, _)| *team == record.team_id) {
                Some(i) => totals[i].1 = totals[i].1.saturating_add(record.points()),
                None => totals.push((record.team_id, record.points())),
            }
        }
        Ok(totals)
    }

    /// Records a locked knockout or qualifier sheet as a round
    ///
    /// One record is written per team on the sheet. Knockout sheets must
    /// cover every registered team and qualifier sheets exactly the teams
    /// advancing from the knockout. Final rounds go through
    /// [`Competition::record_final`].
    ///
    /// # Returns
    ///
    /// The scores that were written
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] while the sheet is open,
    /// [`Error::FinalRound`] for final rounds,
    /// [`Error::MissingDependency`] for qualifier rounds before the knockout
    /// is recorded, [`Error::UnknownTeam`] or [`Error::InsufficientTeams`]
    /// if the sheet's teams are not the round's teams,
    /// [`Error::AlreadyRecorded`] if the round already has records and
    /// [`Error::Store`] if the write fails.
    pub fn record_round<R: RoundSheet>(
        &mut self,
        kind: RoundKind,
        sheet: &R,
    ) -> Result<Vec<RoundScore>, Error> {
        if !sheet.state().is_locked() {
            return Err(Incomplete::RoundOpen.into());
        }
        let expected = match kind {
            RoundKind::KnockoutCircles | RoundKind::KnockoutDirect => self.team_ids()?,
            RoundKind::QualifierMembers | RoundKind::QualifierDirect => self
                .qualifier_teams()?
                .into_iter()
                .map(|team| team.id)
                .collect_vec(),
            RoundKind::FinalFirst | RoundKind::FinalSecond | RoundKind::FinalBuzzer => {
                warn!(%kind, "rejected recording of a final round outside the final");
                return Err(Error::FinalRound(kind));
            }
        };
        let scores = sheet.scores()?;
        if let Err(e) = match_teams(&expected, &scores) {
            warn!(%kind, error = %e, "rejected sheet with the wrong teams");
            return Err(e);
        }
        let round = self.unrecorded_round(kind)?;
        self.persist(kind, round, &scores)?;
        Ok(scores)
    }

    fn unrecorded_round(&mut self, kind: RoundKind) -> Result<RoundId, Error> {
        let round = self.round_id(kind)?;
        if !self.store.fetch_scores(round)?.is_empty() {
            warn!(%kind, "rejected recording of a round that already has records");
            return Err(Error::AlreadyRecorded(kind));
        }
        Ok(round)
    }

    fn persist(&mut self, kind: RoundKind, round: RoundId, scores: &[RoundScore]) -> Result<(), Error> {
        let records = to_records(round, scores);
        self.store.persist_scores(round, &records)?;
        info!(%kind, %round, teams = records.len(), "round recorded");
        Ok(())
    }

    /// Ranking after both knockout rounds
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] until both knockout rounds are
    /// recorded.
    pub fn knockout_standings(&mut self) -> Result<Standings, Error> {
        self.standings(RoundKind::KNOCKOUT)
    }

    fn standings(&mut self, [first, second]: [RoundKind; 2]) -> Result<Standings, Error> {
        let first = self.round_totals(first)?;
        let second = self.round_totals(second)?;
        Ok(Standings::merge(&first, &second))
    }

    /// The teams advancing from the knockout, best first
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] until the knockout is recorded
    /// and [`Error::InsufficientTeams`] if fewer teams were ranked than
    /// advance.
    pub fn qualifier_teams(&mut self) -> Result<Vec<Team>, Error> {
        let standings = self.knockout_standings()?;
        let advancing = standings.advancing(self.config.knockout_advancing)?;
        let teams = self.teams()?;
        advancing
            .iter()
            .map(|standing| {
                teams
                    .iter()
                    .find(|team| team.id == standing.team)
                    .cloned()
                    .ok_or(Error::UnknownTeam(standing.team))
            })
            .collect()
    }

    /// The member sheet for qualifier round one
    ///
    /// # Errors
    ///
    /// As [`Competition::qualifier_teams`].
    pub fn qualifier_sheet(&mut self) -> Result<QualifierSheet, Error> {
        let teams = self.qualifier_teams()?;
        Ok(QualifierSheet::new(&teams, self.config.qualifier_scoring()))
    }

    /// The direct entry sheet for qualifier round two
    ///
    /// # Errors
    ///
    /// As [`Competition::qualifier_teams`].
    pub fn qualifier_direct_sheet(&mut self) -> Result<ScoreSheet, Error> {
        let teams = self.qualifier_teams()?;
        Ok(ScoreSheet::new(
            teams.into_iter().map(|team| team.id),
            BlankPolicy::Zero,
        ))
    }

    /// Ranking after both qualifier rounds
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] until both qualifier rounds are
    /// recorded.
    pub fn qualifier_standings(&mut self) -> Result<Standings, Error> {
        self.standings(RoundKind::QUALIFIER)
    }

    /// The two finalists, best first
    ///
    /// # Errors
    ///
    /// As [`Competition::qualifier_standings`], plus
    /// [`Error::InsufficientTeams`] if fewer than two teams were ranked.
    pub fn finalists(&mut self) -> Result<[TeamId; FINALIST_COUNT], Error> {
        self.qualifier_standings()?.finalists()
    }

    /// Opens the final for the two finalists
    ///
    /// # Errors
    ///
    /// As [`Competition::finalists`].
    pub fn final_stage(&mut self) -> Result<FinalStage, Error> {
        FinalStage::new(self.finalists()?)
    }

    /// Records a resolved final
    ///
    /// All three final rounds are checked before anything is written. The
    /// store has no transactions, so if a write fails the rounds written
    /// before it stay recorded. Calling again with the same stage writes
    /// the remaining rounds; rounds already holding exactly the stage's
    /// scores are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteInput`] if the final is not resolved,
    /// [`Error::UnknownTeam`] if it was played by teams other than the
    /// finalists, [`Error::AlreadyRecorded`] if a final round holds other
    /// scores or every final round is already recorded and [`Error::Store`]
    /// if a write fails.
    pub fn record_final(&mut self, stage: &FinalStage) -> Result<FinalOutcome, Error> {
        let FinalState::Resolved(outcome) = stage.state() else {
            return Err(Incomplete::Unresolved.into());
        };
        let finalists = self.finalists()?;
        if let Some(stray) = stage
            .finalists()
            .into_iter()
            .find(|team| !finalists.contains(team))
        {
            return Err(Error::UnknownTeam(stray));
        }

        let rounds = stage.round_scores()?;
        let mut pending = Vec::new();
        for (kind, scores) in &rounds {
            let round = self.round_id(*kind)?;
            let existing = self.store.fetch_scores(round)?;
            if existing.is_empty() {
                pending.push((*kind, round, scores));
                continue;
            }
            let records = to_records(round, scores);
            if existing.len() != records.len() || !records.iter().all(|r| existing.contains(r)) {
                warn!(%kind, "rejected final, round holds other scores");
                return Err(Error::AlreadyRecorded(*kind));
            }
        }
        let Some(&(first, ..)) = pending.first() else {
            warn!("rejected final, every final round is already recorded");
            return Err(Error::AlreadyRecorded(RoundKind::FinalFirst));
        };
        if first != RoundKind::FinalFirst {
            info!(%first, "resuming a partially recorded final");
        }
        let total = pending.len();
        for (written, (kind, round, scores)) in pending.into_iter().enumerate() {
            if let Err(e) = self.persist(kind, round, scores) {
                warn!(%kind, written, total, "final only partially recorded");
                return Err(e);
            }
        }
        info!(winner = ?outcome.winner(), "final recorded");
        Ok(outcome)
    }

    /// The outcome of the recorded final
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] for any final round without
    /// records and [`Error::InsufficientTeams`] if the final rounds do not
    /// name two distinct teams.
    pub fn outcome(&mut self) -> Result<FinalOutcome, Error> {
        let [first, second, buzzer] = RoundKind::FINAL;
        let first = self.round_totals(first)?;
        let second = self.round_totals(second)?;
        let buzzer = self.round_totals(buzzer)?;

        let teams = first
            .iter()
            .chain(&second)
            .chain(&buzzer)
            .map(|(team, _)| *team)
            .unique()
            .collect_vec();
        let &[a, b] = teams.as_slice() else {
            return Err(Error::InsufficientTeams {
                required: FINALIST_COUNT,
                available: teams.len(),
            });
        };

        let lookup = |totals: &[(TeamId, Points)], team: TeamId| {
            totals
                .iter()
                .find(|(id, _)| *id == team)
                .map(|(_, points)| *points)
                .unwrap_or_default()
        };
        let score = |team: TeamId| FinalistScore {
            team,
            first: lookup(&first, team),
            second: lookup(&second, team),
            buzzer: lookup(&buzzer, team),
        };
        final_round::resolve(&score(a), &score(b))
    }

    /// The stage the competition is in, derived from the store
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn stage(&mut self) -> Result<Stage, Error> {
        if self.teams()?.is_empty() {
            return Ok(Stage::Setup);
        }
        let mut recorded = |kinds: &[RoundKind]| -> Result<bool, Error> {
            for kind in kinds {
                if !self.is_recorded(*kind)? {
                    return Ok(false);
                }
            }
            Ok(true)
        };
        Ok(if recorded(&RoundKind::FINAL)? {
            Stage::Finished
        } else if recorded(&RoundKind::QUALIFIER)? {
            Stage::Final
        } else if recorded(&RoundKind::KNOCKOUT)? {
            Stage::Qualifier
        } else {
            Stage::Knockout
        })
    }

    /// The running scoreboard over every recorded round
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn scoreboard(&mut self) -> Result<Scoreboard, Error> {
        let teams = self.teams()?;
        let mut records = Vec::new();
        for kind in RoundKind::all() {
            records.extend(self.records(kind)?);
        }
        Ok(Scoreboard::new(&teams, &records))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        store::{self, MemoryStore},
        subject::Subject,
        teams::NewTeam,
    };

    /// A store whose every call fails
    struct OfflineStore;

    impl ScoreStore for OfflineStore {
        fn fetch_scores(&self, _: RoundId) -> Result<Vec<ScoreRecord>, store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }

        fn fetch_teams(&self) -> Result<Vec<Team>, store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }

        fn persist_scores(&mut self, _: RoundId, _: &[ScoreRecord]) -> Result<(), store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }

        fn get_or_create_round(&mut self, _: &str) -> Result<RoundId, store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }

        fn insert_team(&mut self, _: NewTeam) -> Result<Team, store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }

        fn update_members(&mut self, _: TeamId, _: Vec<String>) -> Result<(), store::Error> {
            Err(store::Error::Unavailable("offline".to_string()))
        }
    }

    fn small_config() -> Config {
        Config {
            team_count: 3,
            member_count: 2,
            knockout_advancing: 2,
            ..Config::default()
        }
    }

    fn registered() -> (Competition<MemoryStore>, Vec<Team>) {
        let mut competition = Competition::new(small_config(), MemoryStore::new()).unwrap();
        let teams = competition
            .register_teams(&vec![TeamDraft::default(); 3])
            .unwrap();
        (competition, teams)
    }

    /// A memory store that fails writes once its budget is spent
    struct FlakyStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl ScoreStore for FlakyStore {
        fn fetch_scores(&self, round: RoundId) -> Result<Vec<ScoreRecord>, store::Error> {
            self.inner.fetch_scores(round)
        }

        fn fetch_teams(&self) -> Result<Vec<Team>, store::Error> {
            self.inner.fetch_teams()
        }

        fn persist_scores(
            &mut self,
            round: RoundId,
            records: &[ScoreRecord],
        ) -> Result<(), store::Error> {
            if self.writes_left == 0 {
                return Err(store::Error::Unavailable("flaky".to_string()));
            }
            self.writes_left -= 1;
            self.inner.persist_scores(round, records)
        }

        fn get_or_create_round(&mut self, name: &str) -> Result<RoundId, store::Error> {
            self.inner.get_or_create_round(name)
        }

        fn insert_team(&mut self, team: NewTeam) -> Result<Team, store::Error> {
            self.inner.insert_team(team)
        }

        fn update_members(&mut self, team: TeamId, members: Vec<String>) -> Result<(), store::Error> {
            self.inner.update_members(team, members)
        }
    }

    fn locked_sheet(entries: &[(TeamId, i64)]) -> ScoreSheet {
        let mut sheet = ScoreSheet::new(entries.iter().map(|(team, _)| *team), BlankPolicy::Zero);
        for (team, points) in entries {
            sheet.set(*team, Points::whole(*points)).unwrap();
        }
        sheet.lock().unwrap();
        sheet
    }

    fn record_direct<S: ScoreStore>(
        competition: &mut Competition<S>,
        kind: RoundKind,
        entries: &[(TeamId, i64)],
    ) {
        competition
            .record_round(kind, &locked_sheet(entries))
            .unwrap();
    }

    /// Records the knockout and qualifier so that the first two teams reach
    /// the final
    fn play_to_final<S: ScoreStore>(competition: &mut Competition<S>, teams: &[Team]) {
        let entries = [(teams[0].id, 5), (teams[1].id, 3), (teams[2].id, 1)];
        for kind in RoundKind::KNOCKOUT {
            record_direct(competition, kind, &entries);
        }
        for kind in RoundKind::QUALIFIER {
            record_direct(competition, kind, &entries[..2]);
        }
    }

    fn resolved_final(finalists: [TeamId; 2]) -> (FinalStage, FinalOutcome) {
        let mut stage = FinalStage::new(finalists).unwrap();
        for (team, points) in finalists.into_iter().zip([7, 4]) {
            stage.first_round_mut().set(team, Points::whole(points)).unwrap();
            stage.second_round_mut().set(team, Points::whole(points)).unwrap();
        }
        stage.first_round_mut().lock().unwrap();
        stage.second_round_mut().lock().unwrap();
        let outcome = stage.resolve().unwrap();
        (stage, outcome)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            knockout_advancing: 9,
            ..small_config()
        };
        assert!(matches!(
            Competition::new(config, MemoryStore::new()),
            Err(config::Error::Invalid(_))
        ));
    }

    #[test]
    fn test_register_teams_once() {
        let (mut competition, teams) = registered();
        assert_eq!(teams.len(), 3);
        assert_eq!(teams[2].name, "Team 3");
        assert_eq!(teams[0].members, vec!["Member 1", "Member 2"]);
        assert_eq!(
            competition.register_teams(&vec![TeamDraft::default(); 3]),
            Err(Error::Locked)
        );
    }

    #[test]
    fn test_register_wrong_count() {
        let mut competition = Competition::new(small_config(), MemoryStore::new()).unwrap();
        assert_eq!(
            competition.register_teams(&[TeamDraft::default()]),
            Err(Error::Team(teams::Error::TeamCount {
                expected: 3,
                found: 1
            }))
        );
        assert!(competition.teams().unwrap().is_empty());
    }

    #[test]
    fn test_update_members() {
        let (mut competition, teams) = registered();
        competition
            .update_members(teams[1].id, &["Asha".to_string()])
            .unwrap();
        assert_eq!(
            competition.teams().unwrap()[1].members,
            vec!["Asha", "Member 2"]
        );
        let stranger = TeamId::new();
        assert_eq!(
            competition.update_members(stranger, &[]),
            Err(Error::UnknownTeam(stranger))
        );
    }

    #[test]
    fn test_round_totals_sum_and_keep_order() {
        let (mut competition, teams) = registered();
        let round = competition.round_id(RoundKind::KnockoutDirect).unwrap();
        let records = [
            ScoreRecord::new(teams[1].id, round, Points::whole(2)),
            ScoreRecord::new(teams[0].id, round, Points::whole(1)),
            ScoreRecord::new(teams[1].id, round, Points::from_hundredths(50)),
        ];
        competition.store.persist_scores(round, &records).unwrap();

        assert_eq!(
            competition.round_totals(RoundKind::KnockoutDirect).unwrap(),
            vec![
                (teams[1].id, Points::from_hundredths(250)),
                (teams[0].id, Points::whole(1)),
            ]
        );
    }

    #[test]
    fn test_missing_dependency() {
        let (mut competition, _) = registered();
        assert_eq!(
            competition.round_totals(RoundKind::KnockoutCircles),
            Err(Error::MissingDependency(RoundKind::KnockoutCircles))
        );
        assert_eq!(
            competition.knockout_standings().map(|_| ()),
            Err(Error::MissingDependency(RoundKind::KnockoutCircles))
        );
        assert_eq!(
            competition.finalists(),
            Err(Error::MissingDependency(RoundKind::QualifierMembers))
        );
    }

    #[test]
    fn test_record_requires_locked_sheet() {
        let (mut competition, _) = registered();
        let sheet = competition.knockout_direct_sheet().unwrap();
        assert_eq!(
            competition.record_round(RoundKind::KnockoutDirect, &sheet),
            Err(Error::IncompleteInput(Incomplete::RoundOpen))
        );
        assert!(!competition.is_recorded(RoundKind::KnockoutDirect).unwrap());
    }

    #[test]
    fn test_record_round_once() {
        let (mut competition, teams) = registered();
        let mut sheet = competition.knockout_sheet().unwrap();
        sheet.toggle(teams[0].id, Subject::Maths, 0).unwrap();
        sheet.lock();

        let scores = competition
            .record_round(RoundKind::KnockoutCircles, &sheet)
            .unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].total, Points::from_hundredths(30));
        assert_eq!(
            competition.record_round(RoundKind::KnockoutCircles, &sheet),
            Err(Error::AlreadyRecorded(RoundKind::KnockoutCircles))
        );
        assert_eq!(
            competition.round_totals(RoundKind::KnockoutCircles).unwrap()[0],
            (teams[0].id, Points::from_hundredths(30))
        );
    }

    #[test]
    fn test_stage_follows_records() {
        let (mut competition, teams) = registered();
        assert_eq!(competition.stage(), Ok(Stage::Knockout));

        let entries = [(teams[0].id, 5), (teams[1].id, 3), (teams[2].id, 1)];
        record_direct(&mut competition, RoundKind::KnockoutCircles, &entries);
        assert_eq!(competition.stage(), Ok(Stage::Knockout));
        record_direct(&mut competition, RoundKind::KnockoutDirect, &entries);
        assert_eq!(competition.stage(), Ok(Stage::Qualifier));

        let advancing = competition.qualifier_teams().unwrap();
        assert_eq!(
            advancing.iter().map(|t| t.id).collect_vec(),
            vec![teams[0].id, teams[1].id]
        );

        record_direct(&mut competition, RoundKind::QualifierMembers, &entries[..2]);
        record_direct(&mut competition, RoundKind::QualifierDirect, &entries[..2]);
        assert_eq!(competition.stage(), Ok(Stage::Final));
        assert_eq!(competition.finalists(), Ok([teams[0].id, teams[1].id]));
    }

    #[test]
    fn test_eliminated_team_cannot_enter_qualifier() {
        let (mut competition, teams) = registered();
        let entries = [(teams[0].id, 5), (teams[1].id, 3), (teams[2].id, 1)];
        for kind in RoundKind::KNOCKOUT {
            record_direct(&mut competition, kind, &entries);
        }

        for kind in RoundKind::QUALIFIER {
            assert_eq!(
                competition.record_round(kind, &locked_sheet(&[(teams[2].id, 100)])),
                Err(Error::UnknownTeam(teams[2].id))
            );
            assert_eq!(
                competition.record_round(kind, &locked_sheet(&entries)),
                Err(Error::UnknownTeam(teams[2].id))
            );
            assert!(!competition.is_recorded(kind).unwrap());
        }
    }

    #[test]
    fn test_qualifier_needs_knockout() {
        let (mut competition, teams) = registered();
        let sheet = locked_sheet(&[(teams[0].id, 5), (teams[1].id, 3)]);
        assert_eq!(
            competition.record_round(RoundKind::QualifierDirect, &sheet),
            Err(Error::MissingDependency(RoundKind::KnockoutCircles))
        );
        assert!(!competition.is_recorded(RoundKind::QualifierDirect).unwrap());
    }

    #[test]
    fn test_final_rounds_only_recorded_with_final() {
        let (mut competition, teams) = registered();
        play_to_final(&mut competition, &teams);
        let sheet = locked_sheet(&[(teams[0].id, 9), (teams[1].id, 1)]);
        for kind in RoundKind::FINAL {
            assert_eq!(
                competition.record_round(kind, &sheet),
                Err(Error::FinalRound(kind))
            );
        }
        assert_eq!(competition.stage(), Ok(Stage::Final));
    }

    #[test]
    fn test_knockout_sheet_covers_every_team() {
        let (mut competition, teams) = registered();
        let partial = locked_sheet(&[(teams[0].id, 5), (teams[1].id, 3)]);
        assert_eq!(
            competition.record_round(RoundKind::KnockoutDirect, &partial),
            Err(Error::InsufficientTeams {
                required: 3,
                available: 2
            })
        );

        let stranger = TeamId::new();
        let mixed = locked_sheet(&[(teams[0].id, 5), (teams[1].id, 3), (stranger, 1)]);
        assert_eq!(
            competition.record_round(RoundKind::KnockoutDirect, &mixed),
            Err(Error::UnknownTeam(stranger))
        );
        assert!(!competition.is_recorded(RoundKind::KnockoutDirect).unwrap());
    }

    #[test]
    fn test_stage_setup_without_teams() {
        let mut competition = Competition::new(small_config(), MemoryStore::new()).unwrap();
        assert_eq!(competition.stage(), Ok(Stage::Setup));
    }

    #[test]
    fn test_outcome_needs_two_teams() {
        let (mut competition, teams) = registered();
        for kind in RoundKind::FINAL {
            let round = competition.round_id(kind).unwrap();
            let record = ScoreRecord::new(teams[0].id, round, Points::whole(4));
            competition.store.persist_scores(round, &[record]).unwrap();
        }
        assert_eq!(
            competition.outcome(),
            Err(Error::InsufficientTeams {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_record_final_requires_resolution() {
        let (mut competition, teams) = registered();
        let stage = FinalStage::new([teams[0].id, teams[1].id]).unwrap();
        assert_eq!(
            competition.record_final(&stage),
            Err(Error::IncompleteInput(Incomplete::Unresolved))
        );
    }

    #[test]
    fn test_failed_final_write_can_be_resumed() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            writes_left: 5,
        };
        let mut competition = Competition::new(small_config(), store).unwrap();
        let teams = competition
            .register_teams(&vec![TeamDraft::default(); 3])
            .unwrap();
        play_to_final(&mut competition, &teams);
        let (stage, outcome) = resolved_final([teams[0].id, teams[1].id]);

        assert_eq!(
            competition.record_final(&stage),
            Err(Error::Store(store::Error::Unavailable("flaky".to_string())))
        );
        assert!(competition.is_recorded(RoundKind::FinalFirst).unwrap());
        assert!(!competition.is_recorded(RoundKind::FinalSecond).unwrap());
        assert_eq!(competition.stage(), Ok(Stage::Final));

        competition.store.writes_left = 2;
        assert_eq!(competition.record_final(&stage), Ok(outcome));
        assert_eq!(competition.outcome(), Ok(outcome));
        assert_eq!(
            competition.record_final(&stage),
            Err(Error::AlreadyRecorded(RoundKind::FinalFirst))
        );
    }

    #[test]
    fn test_record_final_rejects_conflicting_round() {
        let (mut competition, teams) = registered();
        play_to_final(&mut competition, &teams);
        let round = competition.round_id(RoundKind::FinalSecond).unwrap();
        let stale = ScoreRecord::new(teams[0].id, round, Points::whole(1));
        competition.store.persist_scores(round, &[stale]).unwrap();

        let (stage, _) = resolved_final([teams[0].id, teams[1].id]);
        assert_eq!(
            competition.record_final(&stage),
            Err(Error::AlreadyRecorded(RoundKind::FinalSecond))
        );
        assert!(!competition.is_recorded(RoundKind::FinalFirst).unwrap());
    }

    #[test]
    fn test_store_failures_surface() {
        let mut competition = Competition::new(small_config(), OfflineStore).unwrap();
        let offline = Error::Store(store::Error::Unavailable("offline".to_string()));
        assert_eq!(competition.teams(), Err(offline.clone()));
        assert_eq!(competition.stage(), Err(offline.clone()));
        assert_eq!(
            competition.round_totals(RoundKind::KnockoutDirect),
            Err(offline.clone())
        );
        assert_eq!(
            competition.register_teams(&[]).map(|_| ()),
            Err(offline)
        );
    }
}
