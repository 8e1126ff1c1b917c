//! Cross-team pairing enumeration: every legal pair-vs-pair combination, in a fixed order.

use crate::models::{PairId, Team, TeamId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A possible match between two pairs of different teams. Never persisted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PairingCandidate {
    pub home_team_id: TeamId,
    pub home_pair_id: PairId,
    pub away_team_id: TeamId,
    pub away_pair_id: PairId,
    /// `homeTeam_homePair_awayTeam_awayPair`; candidates are sorted by this string.
    pub sort_key: String,
}

impl PairingCandidate {
    fn new(
        home_team_id: &TeamId,
        home_pair_id: &PairId,
        away_team_id: &TeamId,
        away_pair_id: &PairId,
    ) -> Self {
        let sort_key = format!(
            "{}_{}_{}_{}",
            home_team_id, home_pair_id, away_team_id, away_pair_id
        );
        Self {
            home_team_id: home_team_id.clone(),
            home_pair_id: home_pair_id.clone(),
            away_team_id: away_team_id.clone(),
            away_pair_id: away_pair_id.clone(),
            sort_key,
        }
    }
}

/// Pairs of each team, keyed (and so ordered) by team id. Teams without pairs are left out.
pub fn pairs_by_team(teams: &[Team]) -> BTreeMap<TeamId, Vec<PairId>> {
    teams
        .iter()
        .filter(|t| !t.pairs.is_empty())
        .map(|t| {
            let pairs = t.sorted_pairs().into_iter().map(|p| p.id.clone()).collect();
            (t.id.clone(), pairs)
        })
        .collect()
}

/// Enumerate every cross-team pairing of `teams`.
///
/// 1. Drop teams with no pairs; order the rest by team id (lexicographic).
/// 2. For each team pair (i, j) with i before j: one candidate per (pair of i) x (pair of j),
///    home from i, away from j, pairs in their declared order.
/// 3. Sort the whole list by `sort_key`.
///
/// Returns an empty list when fewer than two teams have pairs.
pub fn enumerate_pairings(teams: &[Team]) -> Vec<PairingCandidate> {
    let by_team = pairs_by_team(teams);
    let entries: Vec<(&TeamId, &Vec<PairId>)> = by_team.iter().collect();

    let mut candidates = Vec::new();
    for (i, (home_team, home_pairs)) in entries.iter().enumerate() {
        for (away_team, away_pairs) in &entries[i + 1..] {
            for home_pair in home_pairs.iter() {
                for away_pair in away_pairs.iter() {
                    candidates.push(PairingCandidate::new(
                        home_team, home_pair, away_team, away_pair,
                    ));
                }
            }
        }
    }

    candidates.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    candidates
}
