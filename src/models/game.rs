//! Match (game) between two pairs of different teams.

use crate::logic::MatchAssignment;
use crate::models::pair::PairId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a single match. Matches are cancelled together with their tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

/// A persisted fixture: one home pair against one away pair in a numbered round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub home_pair_id: PairId,
    pub away_pair_id: PairId,
    /// 1-based; only rounds that produced at least one match exist.
    pub round_number: u32,
    /// Tournament-wide sequence, starting at 1, in generation order.
    pub match_number: u32,
    /// Court assignment is left to the organiser; never set by the scheduler.
    pub court_number: Option<u32>,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    /// New match for `assignment`, in `Scheduled` status with no court and no timestamps.
    pub fn scheduled(tournament_id: TournamentId, assignment: &MatchAssignment) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            home_pair_id: assignment.home_pair_id.clone(),
            away_pair_id: assignment.away_pair_id.clone(),
            round_number: assignment.round_number,
            match_number: assignment.match_number,
            court_number: None,
            status: MatchStatus::Scheduled,
            scheduled_at: None,
            started_at: None,
            ended_at: None,
        }
    }
}
