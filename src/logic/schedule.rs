//! Schedule generation for a tournament, persistence into a match store, and stats read back
//! from the stored matches.

use crate::logic::pairing::{enumerate_pairings, pairs_by_team};
use crate::logic::round_robin::{build_round_robin, Round};
use crate::models::{GameMatch, PairId, TeamId, Tournament, TournamentError, TournamentId};
use crate::store::MatchStore;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Match-count distribution derived from the stored matches (display/validation only).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleStats {
    pub total_matches: usize,
    /// Highest round number present; `None` when nothing is scheduled.
    pub total_rounds: Option<u32>,
    pub matches_per_pair: BTreeMap<PairId, u32>,
    pub matches_per_team: BTreeMap<TeamId, u32>,
    /// Mean over pairs that appear in at least one match; 0 when there are none.
    pub avg_matches_per_pair: f64,
}

/// Build (but do not store) the schedule for `tournament`.
///
/// The status/team-count check runs first: a tournament outside Draft, or with fewer than
/// 2 teams, fails with `IneligibleTournament` whatever its pairs look like (so a single team
/// with 3 pairs is ineligible, not under-rostered). Only then are teams without pairs
/// dropped, and `InsufficientRosteredTeams` is returned if fewer than 2 remain.
pub fn generate_schedule(tournament: &Tournament) -> Result<Vec<Round>, TournamentError> {
    if !tournament.can_generate_schedule() {
        return Err(TournamentError::IneligibleTournament);
    }
    let teams_with_pairs = pairs_by_team(&tournament.teams).len();
    if teams_with_pairs < 2 {
        return Err(TournamentError::InsufficientRosteredTeams { teams_with_pairs });
    }

    let candidates = enumerate_pairings(&tournament.teams);
    Ok(build_round_robin(
        &candidates,
        tournament.rounds,
        tournament.max_matches_per_pair,
    ))
}

/// Replace every stored match of `tournament_id` with one `Scheduled` match per assignment.
/// Store errors are returned as `Persistence` and leave the previous matches in place.
pub fn persist_schedule<S: MatchStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    schedule: &[Round],
) -> Result<(), TournamentError> {
    let matches: Vec<GameMatch> = schedule
        .iter()
        .flat_map(|round| round.matches.iter())
        .map(|a| GameMatch::scheduled(tournament_id, a))
        .collect();
    let count = matches.len();
    store.replace_matches(tournament_id, matches)?;
    info!(
        "Saved schedule for tournament {}: {} round(s), {} match(es)",
        tournament_id,
        schedule.len(),
        count
    );
    Ok(())
}

/// Generate the schedule, store it (replacing any previous one), and return it.
pub fn generate_and_persist<S: MatchStore + ?Sized>(
    store: &S,
    tournament: &Tournament,
) -> Result<Vec<Round>, TournamentError> {
    let schedule = generate_schedule(tournament)?;
    persist_schedule(store, tournament.id, &schedule)?;
    Ok(schedule)
}

/// Cancel `tournament` (Draft or Active) and mark its scheduled matches cancelled.
/// The tournament is left untouched when the transition is refused or the store fails.
pub fn cancel_tournament<S: MatchStore + ?Sized>(
    store: &S,
    tournament: &mut Tournament,
) -> Result<usize, TournamentError> {
    let mut cancelled = tournament.clone();
    cancelled.cancel()?;
    let count = store.cancel_matches(tournament.id)?;
    *tournament = cancelled;
    info!("Cancelled tournament {} and {} match(es)", tournament.id, count);
    Ok(count)
}

/// Count matches per pair and per team from what is stored for `tournament`.
pub fn schedule_stats<S: MatchStore + ?Sized>(
    store: &S,
    tournament: &Tournament,
) -> Result<ScheduleStats, TournamentError> {
    let matches = store.matches(tournament.id)?;
    Ok(stats_from_matches(tournament, &matches))
}

/// Stats for a given set of matches. Pairs missing from the roster are counted per pair only.
pub fn stats_from_matches(tournament: &Tournament, matches: &[GameMatch]) -> ScheduleStats {
    let mut matches_per_pair: BTreeMap<PairId, u32> = BTreeMap::new();
    let mut matches_per_team: BTreeMap<TeamId, u32> = BTreeMap::new();

    for m in matches {
        for pair_id in [&m.home_pair_id, &m.away_pair_id] {
            *matches_per_pair.entry(pair_id.clone()).or_insert(0) += 1;
            match tournament.team_of(pair_id) {
                Some(team) => *matches_per_team.entry(team.id.clone()).or_insert(0) += 1,
                None => warn!(
                    "Match {} references pair {} which is not on the roster of tournament {}",
                    m.match_number, pair_id, tournament.id
                ),
            }
        }
    }

    let avg_matches_per_pair = if matches_per_pair.is_empty() {
        0.0
    } else {
        let total: u32 = matches_per_pair.values().sum();
        f64::from(total) / matches_per_pair.len() as f64
    };

    ScheduleStats {
        total_matches: matches.len(),
        total_rounds: matches.iter().map(|m| m.round_number).max(),
        matches_per_pair,
        matches_per_team,
        avg_matches_per_pair,
    }
}
