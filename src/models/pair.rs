//! Pair and PairId: the two-player unit that is scheduled into matches.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque pair identifier. Ordered lexicographically by its string form.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
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

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two players entered together under one team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub id: PairId,
    pub team_id: TeamId,
    pub player1_name: String,
    pub player2_name: String,
    /// Explicit label; when absent the label is derived from the player names.
    pub display_name: Option<String>,
    /// Position within the team (lower first).
    pub sort_order: i32,
}

impl Pair {
    /// Create a pair with a fresh id. Player names must be non-empty and `sort_order` non-negative.
    pub fn new(
        team_id: TeamId,
        player1_name: impl Into<String>,
        player2_name: impl Into<String>,
        sort_order: i32,
    ) -> Result<Self, TournamentError> {
        Self::with_id(PairId::generate(), team_id, player1_name, player2_name, sort_order)
    }

    /// Same as [`Pair::new`] but with a caller-supplied id (e.g. loaded from storage).
    pub fn with_id(
        id: PairId,
        team_id: TeamId,
        player1_name: impl Into<String>,
        player2_name: impl Into<String>,
        sort_order: i32,
    ) -> Result<Self, TournamentError> {
        if sort_order < 0 {
            return Err(TournamentError::NegativeSortOrder(sort_order));
        }
        let player1_name = player1_name.into().trim().to_string();
        let player2_name = player2_name.into().trim().to_string();
        if player1_name.is_empty() || player2_name.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        Ok(Self {
            id,
            team_id,
            player1_name,
            player2_name,
            display_name: None,
            sort_order,
        })
    }

    /// Set an explicit display label (blank labels clear it).
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        let name = display_name.into().trim().to_string();
        self.display_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Label shown in fixtures: explicit display name, else "Player 1 & Player 2".
    pub fn label(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} & {}", self.player1_name, self.player2_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> TeamId {
        TeamId::new("T1").unwrap()
    }

    #[test]
    fn pair_id_rejects_blank() {
        assert_eq!(PairId::new("   "), Err(TournamentError::EmptyIdentifier));
        assert_eq!(PairId::new(" P1 ").unwrap().as_str(), "P1");
    }

    #[test]
    fn label_falls_back_to_player_names() {
        let p = Pair::new(team(), "Ann", "Bob", 0).unwrap();
        assert_eq!(p.label(), "Ann & Bob");
        let p = p.with_display_name("Smashers");
        assert_eq!(p.label(), "Smashers");
        let p = p.with_display_name("  ");
        assert_eq!(p.label(), "Ann & Bob");
    }

    #[test]
    fn rejects_negative_sort_order_and_empty_names() {
        assert_eq!(
            Pair::new(team(), "Ann", "Bob", -1),
            Err(TournamentError::NegativeSortOrder(-1))
        );
        assert_eq!(
            Pair::new(team(), "Ann", " ", 0),
            Err(TournamentError::EmptyPlayerName)
        );
    }
}
