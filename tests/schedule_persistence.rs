//! Integration tests for storing schedules, stats read-back, and fixture export.

use pairs_tournament_web::{
    cancel_tournament, fixtures_csv, generate_and_persist, persist_schedule, schedule_stats, GameMatch,
    InMemoryMatchStore, MatchStatus, MatchStore, PairId, StoreError, TeamId, Tournament,
    TournamentError, TournamentId, TournamentSettings, TournamentStatus,
};
use std::cell::Cell;

/// Store whose writes always fail; counts how often it was asked to write.
#[derive(Default)]
struct FailingStore {
    writes: Cell<u32>,
}

impl MatchStore for FailingStore {
    fn replace_matches(&self, _: TournamentId, _: Vec<GameMatch>) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        Err(StoreError::Backend("disk full".into()))
    }

    fn matches(&self, _: TournamentId) -> Result<Vec<GameMatch>, StoreError> {
        Ok(Vec::new())
    }
}

/// Two teams of two pairs, added through the roster API.
fn club_night(max_matches_per_pair: u32) -> (Tournament, Vec<TeamId>, Vec<PairId>) {
    let settings = TournamentSettings {
        rounds: 4,
        max_matches_per_pair,
        ..TournamentSettings::default()
    };
    let mut t = Tournament::new("Club night", settings).unwrap();
    let red = t.add_team("Red").unwrap();
    let blue = t.add_team("Blue").unwrap();
    let pairs = vec![
        t.add_pair(&red, "Ann", "Bob", None).unwrap(),
        t.add_pair(&red, "Cat", "Dan", Some("Cats".into())).unwrap(),
        t.add_pair(&blue, "Eve", "Fay", None).unwrap(),
        t.add_pair(&blue, "Gus", "Hal", None).unwrap(),
    ];
    (t, vec![red, blue], pairs)
}

#[test]
fn persisted_matches_mirror_the_schedule() {
    let (t, _, _) = club_night(2);
    let store = InMemoryMatchStore::new();
    let rounds = generate_and_persist(&store, &t).unwrap();

    let stored = store.matches(t.id).unwrap();
    let assigned: Vec<_> = rounds.iter().flat_map(|r| r.matches.iter()).collect();
    assert_eq!(stored.len(), assigned.len());
    for (m, a) in stored.iter().zip(assigned) {
        assert_eq!(m.tournament_id, t.id);
        assert_eq!(m.home_pair_id, a.home_pair_id);
        assert_eq!(m.away_pair_id, a.away_pair_id);
        assert_eq!(m.round_number, a.round_number);
        assert_eq!(m.match_number, a.match_number);
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(m.court_number.is_none());
        assert!(m.scheduled_at.is_none() && m.started_at.is_none() && m.ended_at.is_none());
    }
}

#[test]
fn regenerating_replaces_previous_matches() {
    let (mut t, teams, _) = club_night(2);
    let store = InMemoryMatchStore::new();
    generate_and_persist(&store, &t).unwrap();
    let first: Vec<_> = store.matches(t.id).unwrap().into_iter().map(|m| m.id).collect();

    t.add_pair(&teams[0], "Ivy", "Jo", None).unwrap();
    generate_and_persist(&store, &t).unwrap();
    let second = store.matches(t.id).unwrap();

    assert!(second.iter().all(|m| !first.contains(&m.id)));
    let numbers: Vec<u32> = second.iter().map(|m| m.match_number).collect();
    let expected: Vec<u32> = (1..=second.len() as u32).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn store_failure_is_surfaced_unchanged() {
    let (t, _, _) = club_night(2);
    let store = FailingStore::default();
    assert_eq!(
        generate_and_persist(&store, &t),
        Err(TournamentError::Persistence(StoreError::Backend("disk full".into())))
    );
    assert_eq!(store.writes.get(), 1);
}

#[test]
fn insufficient_roster_never_touches_storage() {
    let mut t = Tournament::new("Solo", TournamentSettings::default()).unwrap();
    let only = t.add_team("Only").unwrap();
    let empty = t.add_team("Empty").unwrap();
    for (a, b) in [("A", "B"), ("C", "D"), ("E", "F")] {
        t.add_pair(&only, a, b, None).unwrap();
    }
    let store = FailingStore::default();
    assert_eq!(
        generate_and_persist(&store, &t),
        Err(TournamentError::InsufficientRosteredTeams { teams_with_pairs: 1 })
    );
    assert_eq!(store.writes.get(), 0);

    t.remove_team(&empty).unwrap();
    assert_eq!(
        generate_and_persist(&store, &t),
        Err(TournamentError::IneligibleTournament)
    );
    assert_eq!(store.writes.get(), 0);
}

#[test]
fn stats_are_read_from_storage() {
    let (t, teams, pairs) = club_night(2);
    let store = InMemoryMatchStore::new();

    let empty = schedule_stats(&store, &t).unwrap();
    assert_eq!(empty.total_matches, 0);
    assert_eq!(empty.total_rounds, None);
    assert!(empty.matches_per_pair.is_empty());
    assert_eq!(empty.avg_matches_per_pair, 0.0);

    generate_and_persist(&store, &t).unwrap();
    let stats = schedule_stats(&store, &t).unwrap();
    assert_eq!(stats.total_matches, 4);
    assert_eq!(stats.total_rounds, Some(2));
    for p in &pairs {
        assert_eq!(stats.matches_per_pair[p], 2);
    }
    for team in &teams {
        assert_eq!(stats.matches_per_team[team], 4);
    }
    assert_eq!(stats.avg_matches_per_pair, 2.0);

    // Stats follow storage, not a fresh schedule: an empty replacement clears them.
    persist_schedule(&store, t.id, &[]).unwrap();
    assert_eq!(schedule_stats(&store, &t).unwrap().total_matches, 0);
}

#[test]
fn csv_lists_fixtures_with_labels() {
    let (t, _, _) = club_night(1);
    let store = InMemoryMatchStore::new();
    generate_and_persist(&store, &t).unwrap();
    let csv = fixtures_csv(&t, &store.matches(t.id).unwrap()).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "round,match,home_team,home_pair,away_team,away_pair,status");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,1,"));
    assert!(lines[2].starts_with("1,2,"));
    assert!(lines.iter().any(|l| l.contains("Cats")));
    assert!(lines[1..].iter().all(|l| l.ends_with(",scheduled")));
}

#[test]
fn cancelling_marks_stored_matches_and_blocks_regeneration() {
    let (mut t, _, _) = club_night(2);
    let store = InMemoryMatchStore::new();
    generate_and_persist(&store, &t).unwrap();

    assert_eq!(cancel_tournament(&store, &mut t).unwrap(), 4);
    assert_eq!(t.status, TournamentStatus::Cancelled);
    assert!(t.ended_at.is_some());
    let stored = store.matches(t.id).unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|m| m.status == MatchStatus::Cancelled));

    assert_eq!(
        cancel_tournament(&store, &mut t),
        Err(TournamentError::InvalidState)
    );
    assert_eq!(
        generate_and_persist(&store, &t).unwrap_err(),
        TournamentError::IneligibleTournament
    );
}
