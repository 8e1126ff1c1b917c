//! Greedy round-robin builder: assigns pairing candidates to rounds.

use crate::logic::pairing::PairingCandidate;
use crate::models::PairId;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One accepted fixture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchAssignment {
    pub home_pair_id: PairId,
    pub away_pair_id: PairId,
    pub round_number: u32,
    pub match_number: u32,
}

/// A round that produced at least one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Round {
    pub round_number: u32,
    pub matches: Vec<MatchAssignment>,
}

/// Rematch key: the two pair ids, smaller first, so home/away swaps collide.
fn pairing_key<'a>(a: &'a PairId, b: &'a PairId) -> (&'a PairId, &'a PairId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Build the schedule from `candidates` (already in their deterministic order).
///
/// For each round 1..=`max_rounds`, scan every candidate once and accept it when:
/// - the pairing has not been played in an earlier round,
/// - neither pair already plays this round,
/// - both pairs are below `max_matches_per_pair`.
///
/// No backtracking: a round may be under-filled when an early choice blocks a later one.
/// Rounds with no accepted match are left out. Match numbers run 1, 2, 3... across rounds.
pub fn build_round_robin(
    candidates: &[PairingCandidate],
    max_rounds: u32,
    max_matches_per_pair: u32,
) -> Vec<Round> {
    let mut matches_played: HashMap<&PairId, u32> = HashMap::new();
    let mut used_pairings: HashSet<(&PairId, &PairId)> = HashSet::new();
    let mut match_number = 0u32;
    let mut rounds = Vec::new();

    for round_number in 1..=max_rounds {
        let mut committed: HashSet<&PairId> = HashSet::new();
        let mut matches = Vec::new();

        for c in candidates {
            let (home, away) = (&c.home_pair_id, &c.away_pair_id);
            let key = pairing_key(home, away);
            if used_pairings.contains(&key) {
                continue;
            }
            if committed.contains(home) || committed.contains(away) {
                continue;
            }
            let home_count = matches_played.get(home).copied().unwrap_or(0);
            let away_count = matches_played.get(away).copied().unwrap_or(0);
            if home_count >= max_matches_per_pair || away_count >= max_matches_per_pair {
                continue;
            }

            match_number += 1;
            matches.push(MatchAssignment {
                home_pair_id: home.clone(),
                away_pair_id: away.clone(),
                round_number,
                match_number,
            });
            committed.insert(home);
            committed.insert(away);
            used_pairings.insert(key);
            matches_played.insert(home, home_count + 1);
            matches_played.insert(away, away_count + 1);
        }

        if matches.is_empty() {
            debug!("Round {} produced no matches; dropped", round_number);
            continue;
        }
        debug!("Round {}: {} match(es)", round_number, matches.len());
        rounds.push(Round {
            round_number,
            matches,
        });
    }

    rounds
}
