//! Team and TeamId.

use crate::models::pair::{Pair, PairId};
use crate::models::tournament::{TournamentError, TournamentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque team identifier. Ordered lexicographically by its string form.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Wrap an existing identifier. Surrounding whitespace is trimmed; empty ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, TournamentError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(TournamentError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default team colour (hex).
const DEFAULT_TEAM_COLOR: &str = "#3B82F6";

/// A named group of pairs. Matches never happen inside one team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
    pub pairs: Vec<Pair>,
}

impl Team {
    /// Create a team with a fresh id and no pairs.
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        sort_order: i32,
    ) -> Result<Self, TournamentError> {
        Self::with_id(TeamId::generate(), tournament_id, name, sort_order)
    }

    /// Same as [`Team::new`] with a caller-supplied id.
    pub fn with_id(
        id: TeamId,
        tournament_id: TournamentId,
        name: impl Into<String>,
        sort_order: i32,
    ) -> Result<Self, TournamentError> {
        if sort_order < 0 {
            return Err(TournamentError::NegativeSortOrder(sort_order));
        }
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::EmptyTeamName);
        }
        Ok(Self {
            id,
            tournament_id,
            name,
            description: None,
            color: DEFAULT_TEAM_COLOR.to_string(),
            sort_order,
            pairs: Vec::new(),
        })
    }

    /// Pairs in their declared order: `sort_order`, then id to break ties.
    pub fn sorted_pairs(&self) -> Vec<&Pair> {
        let mut pairs: Vec<&Pair> = self.pairs.iter().collect();
        pairs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        pairs
    }

    pub fn pair(&self, id: &PairId) -> Option<&Pair> {
        self.pairs.iter().find(|p| &p.id == id)
    }

    /// Next free sort position (one past the current maximum).
    pub(crate) fn next_pair_sort_order(&self) -> Result<i32, TournamentError> {
        next_sort_order(self.pairs.iter().map(|p| p.sort_order))
    }
}

/// One past the largest of `orders`, or 0 when there are none.
pub(crate) fn next_sort_order(orders: impl Iterator<Item = i32>) -> Result<i32, TournamentError> {
    match orders.max() {
        Some(max) => max.checked_add(1).ok_or(TournamentError::SortOrderOverflow),
        None => Ok(0),
    }
}
