//! Match persistence: the store trait and the in-memory store used by the web app.
//!
//! A store replaces a tournament's whole match set in one step. Callers never see a
//! half-written set: either the old matches or the full new set are visible.

use crate::models::{GameMatch, MatchStatus, PairId, TournamentId};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Errors raised by a [`MatchStore`]. When one is returned, stored matches are unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// A writer panicked while holding the lock.
    LockPoisoned,
    /// Two rows share the same (home, away) pairing.
    DuplicatePairing { home: PairId, away: PairId },
    /// A row belongs to a different tournament than the one being replaced.
    ForeignTournament(TournamentId),
    /// Backend-specific failure.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::LockPoisoned => write!(f, "match store lock poisoned"),
            StoreError::DuplicatePairing { home, away } => {
                write!(f, "duplicate pairing {} vs {}", home, away)
            }
            StoreError::ForeignTournament(id) => {
                write!(f, "match belongs to another tournament ({})", id)
            }
            StoreError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable home for a tournament's matches.
pub trait MatchStore {
    /// Delete every match of `tournament_id` and insert `matches`, as one atomic unit.
    fn replace_matches(
        &self,
        tournament_id: TournamentId,
        matches: Vec<GameMatch>,
    ) -> Result<(), StoreError>;

    /// Matches of `tournament_id`, ordered by round then match number.
    fn matches(&self, tournament_id: TournamentId) -> Result<Vec<GameMatch>, StoreError>;

    /// Mark every `Scheduled` match of `tournament_id` as `Cancelled`. Returns how many changed.
    fn cancel_matches(&self, tournament_id: TournamentId) -> Result<usize, StoreError> {
        let mut matches = self.matches(tournament_id)?;
        let mut cancelled = 0;
        for m in matches.iter_mut().filter(|m| m.status == MatchStatus::Scheduled) {
            m.status = MatchStatus::Cancelled;
            cancelled += 1;
        }
        if cancelled > 0 {
            self.replace_matches(tournament_id, matches)?;
        }
        Ok(cancelled)
    }
}

/// Check the rules a match table enforces: rows belong to the tournament, (home, away) unique.
fn validate_rows(tournament_id: TournamentId, matches: &[GameMatch]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for m in matches {
        if m.tournament_id != tournament_id {
            return Err(StoreError::ForeignTournament(m.tournament_id));
        }
        if !seen.insert((&m.home_pair_id, &m.away_pair_id)) {
            return Err(StoreError::DuplicatePairing {
                home: m.home_pair_id.clone(),
                away: m.away_pair_id.clone(),
            });
        }
    }
    Ok(())
}

/// Process-local store. The write lock serializes writers; a replacement is a single swap.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    matches: RwLock<HashMap<TournamentId, Vec<GameMatch>>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every match of a tournament (e.g. when the tournament itself is deleted).
    pub fn remove_tournament(&self, tournament_id: TournamentId) -> Result<(), StoreError> {
        let mut g = self.matches.write().map_err(|_| StoreError::LockPoisoned)?;
        g.remove(&tournament_id);
        Ok(())
    }
}

impl MatchStore for InMemoryMatchStore {
    fn replace_matches(
        &self,
        tournament_id: TournamentId,
        mut matches: Vec<GameMatch>,
    ) -> Result<(), StoreError> {
        // Validate and order before taking the lock: a rejected set never touches stored state.
        validate_rows(tournament_id, &matches)?;
        matches.sort_by_key(|m| (m.round_number, m.match_number));

        let mut g = self.matches.write().map_err(|_| StoreError::LockPoisoned)?;
        if matches.is_empty() {
            g.remove(&tournament_id);
        } else {
            g.insert(tournament_id, matches);
        }
        Ok(())
    }

    fn matches(&self, tournament_id: TournamentId) -> Result<Vec<GameMatch>, StoreError> {
        let g = self.matches.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(g.get(&tournament_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::MatchAssignment;
    use uuid::Uuid;

    fn pid(s: &str) -> PairId {
        PairId::new(s).unwrap()
    }

    fn row(t: TournamentId, home: &str, away: &str, round_number: u32, match_number: u32) -> GameMatch {
        let assignment = MatchAssignment {
            home_pair_id: pid(home),
            away_pair_id: pid(away),
            round_number,
            match_number,
        };
        GameMatch::scheduled(t, &assignment)
    }

    #[test]
    fn replace_swaps_whole_set() {
        let store = InMemoryMatchStore::new();
        let t = Uuid::new_v4();
        store
            .replace_matches(t, vec![row(t, "a", "b", 1, 1)])
            .unwrap();
        store
            .replace_matches(
                t,
                vec![
                    row(t, "c", "d", 2, 2),
                    row(t, "a", "d", 1, 1),
                ],
            )
            .unwrap();
        let stored = store.matches(t).unwrap();
        let numbers: Vec<u32> = stored.iter().map(|m| m.match_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(stored.iter().all(|m| m.home_pair_id != pid("a") || m.away_pair_id != pid("b")));
    }

    #[test]
    fn rejected_set_leaves_previous_matches() {
        let store = InMemoryMatchStore::new();
        let t = Uuid::new_v4();
        let original = vec![row(t, "a", "b", 1, 1)];
        store.replace_matches(t, original.clone()).unwrap();

        let err = store
            .replace_matches(
                t,
                vec![
                    row(t, "c", "d", 1, 1),
                    row(t, "c", "d", 2, 2),
                ],
            )
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicatePairing { home: pid("c"), away: pid("d") }
        );
        assert_eq!(store.matches(t).unwrap(), original);
    }

    #[test]
    fn tournaments_are_isolated() {
        let store = InMemoryMatchStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .replace_matches(a, vec![row(a, "x", "y", 1, 1)])
            .unwrap();
        assert!(store.matches(b).unwrap().is_empty());
        assert_eq!(
            store.replace_matches(b, vec![row(a, "x", "y", 1, 1)]),
            Err(StoreError::ForeignTournament(a))
        );
        store.remove_tournament(a).unwrap();
        assert!(store.matches(a).unwrap().is_empty());
    }

    #[test]
    fn cancel_marks_scheduled_matches_only_once() {
        let store = InMemoryMatchStore::new();
        let t = Uuid::new_v4();
        store
            .replace_matches(t, vec![row(t, "a", "b", 1, 1), row(t, "c", "d", 1, 2)])
            .unwrap();
        assert_eq!(store.cancel_matches(t).unwrap(), 2);
        assert!(store
            .matches(t)
            .unwrap()
            .iter()
            .all(|m| m.status == MatchStatus::Cancelled));
        assert_eq!(store.cancel_matches(t).unwrap(), 0);
        assert_eq!(store.cancel_matches(Uuid::new_v4()).unwrap(), 0);
    }
}
