//! Tournament, its settings and status, and the domain error type.

use crate::models::pair::{Pair, PairId};
use crate::models::team::{next_sort_order, Team, TeamId};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Schedule requested outside Draft, or with fewer than 2 teams.
    IneligibleTournament,
    /// Fewer than 2 teams remain once teams without pairs are dropped.
    InsufficientRosteredTeams { teams_with_pairs: usize },
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// A setting is outside its allowed range.
    InvalidSetting { name: &'static str, value: u32, min: u32, max: u32 },
    /// Identifiers must not be empty.
    EmptyIdentifier,
    EmptyTeamName,
    EmptyPlayerName,
    /// Sort orders must be zero or positive.
    NegativeSortOrder(i32),
    /// No sort position is left after the current maximum.
    SortOrderOverflow,
    /// A pair id is already used in this tournament.
    DuplicatePair(PairId),
    /// A pair claims a different team than the one it is listed under.
    PairTeamMismatch { pair: PairId, team: TeamId },
    TeamNotFound(TeamId),
    PairNotFound(PairId),
    /// Reorder list does not name every team/pair exactly once.
    IncompleteOrdering,
    /// Storage failed; nothing was changed.
    Persistence(StoreError),
    /// Fixture export failed.
    Export(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::IneligibleTournament => write!(
                f,
                "Tournament must be in draft status with at least 2 teams to generate schedule"
            ),
            TournamentError::InsufficientRosteredTeams { teams_with_pairs } => write!(
                f,
                "At least 2 teams with pairs are required (found {})",
                teams_with_pairs
            ),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::InvalidSetting { name, value, min, max } => {
                write!(f, "{} must be between {} and {} (got {})", name, min, max, value)
            }
            TournamentError::EmptyIdentifier => write!(f, "Identifier must not be empty"),
            TournamentError::EmptyTeamName => write!(f, "Team name must not be empty"),
            TournamentError::EmptyPlayerName => write!(f, "Player names must not be empty"),
            TournamentError::NegativeSortOrder(v) => {
                write!(f, "Sort order must not be negative (got {})", v)
            }
            TournamentError::SortOrderOverflow => write!(f, "No sort position left"),
            TournamentError::DuplicatePair(id) => {
                write!(f, "Pair {} is already on the roster", id)
            }
            TournamentError::PairTeamMismatch { pair, team } => {
                write!(f, "Pair {} does not belong to team {}", pair, team)
            }
            TournamentError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            TournamentError::PairNotFound(id) => write!(f, "Pair {} not found", id),
            TournamentError::IncompleteOrdering => {
                write!(f, "Ordering must list every entry exactly once")
            }
            TournamentError::Persistence(e) => write!(f, "Failed to save schedule: {}", e),
            TournamentError::Export(msg) => write!(f, "Failed to export fixtures: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for TournamentError {
    fn from(e: StoreError) -> Self {
        TournamentError::Persistence(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle phase. Scheduling is only allowed in `Draft`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Roster being built; not started.
    #[default]
    Draft,
    Active,
    Completed,
    /// Abandoned from Draft or Active.
    Cancelled,
}

fn default_pairs_per_team() -> u32 {
    4
}

fn default_rounds() -> u32 {
    4
}

fn default_max_matches_per_pair() -> u32 {
    4
}

fn default_points_per_set() -> u32 {
    24
}

/// Tunable tournament parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentSettings {
    #[serde(default = "default_pairs_per_team")]
    pub pairs_per_team: u32,
    /// Maximum number of rounds the scheduler attempts.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_max_matches_per_pair")]
    pub max_matches_per_pair: u32,
    #[serde(default = "default_points_per_set")]
    pub points_per_set: u32,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            pairs_per_team: default_pairs_per_team(),
            rounds: default_rounds(),
            max_matches_per_pair: default_max_matches_per_pair(),
            points_per_set: default_points_per_set(),
        }
    }
}

fn check_range(name: &'static str, value: u32, min: u32, max: u32) -> Result<(), TournamentError> {
    if value < min || value > max {
        return Err(TournamentError::InvalidSetting { name, value, min, max });
    }
    Ok(())
}

impl TournamentSettings {
    pub fn validate(&self) -> Result<(), TournamentError> {
        check_range("pairs_per_team", self.pairs_per_team, 2, 10)?;
        check_range("rounds", self.rounds, 1, 20)?;
        check_range("max_matches_per_pair", self.max_matches_per_pair, 1, 20)?;
        check_range("points_per_set", self.points_per_set, 1, 100)?;
        Ok(())
    }
}

/// Tournament roster and parameters. Matches live in the match store, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub pairs_per_team: u32,
    pub rounds: u32,
    pub max_matches_per_pair: u32,
    pub points_per_set: u32,
    pub status: TournamentStatus,
    pub teams: Vec<Team>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a new Draft tournament with no teams. Settings are validated.
    pub fn new(name: impl Into<String>, settings: TournamentSettings) -> Result<Self, TournamentError> {
        settings.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            description: None,
            pairs_per_team: settings.pairs_per_team,
            rounds: settings.rounds,
            max_matches_per_pair: settings.max_matches_per_pair,
            points_per_set: settings.points_per_set,
            status: TournamentStatus::Draft,
            teams: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        })
    }

    /// Replace the settings (Draft only).
    pub fn update_settings(&mut self, settings: TournamentSettings) -> Result<(), TournamentError> {
        self.require_draft()?;
        settings.validate()?;
        self.pairs_per_team = settings.pairs_per_team;
        self.rounds = settings.rounds;
        self.max_matches_per_pair = settings.max_matches_per_pair;
        self.points_per_set = settings.points_per_set;
        Ok(())
    }

    /// Draft with at least two teams (pairs are checked later, by the scheduler).
    pub fn can_generate_schedule(&self) -> bool {
        self.status == TournamentStatus::Draft && self.teams.len() >= 2
    }

    fn require_draft(&self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Draft {
            return Err(TournamentError::InvalidState);
        }
        Ok(())
    }

    /// Teams in declared order: `sort_order`, then id.
    pub fn sorted_teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.iter().collect();
        teams.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        teams
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    fn team_mut(&mut self, id: &TeamId) -> Result<&mut Team, TournamentError> {
        self.teams
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TournamentError::TeamNotFound(id.clone()))
    }

    /// Team that owns `pair_id`, if the pair is on the roster.
    pub fn team_of(&self, pair_id: &PairId) -> Option<&Team> {
        self.teams.iter().find(|t| t.pair(pair_id).is_some())
    }

    pub fn pair(&self, pair_id: &PairId) -> Option<&Pair> {
        self.teams.iter().find_map(|t| t.pair(pair_id))
    }

    /// Add a team at the end of the current order (Draft only). Returns the new team's id.
    pub fn add_team(&mut self, name: impl Into<String>) -> Result<TeamId, TournamentError> {
        self.require_draft()?;
        let sort_order = next_sort_order(self.teams.iter().map(|t| t.sort_order))?;
        let team = Team::new(self.id, name, sort_order)?;
        let id = team.id.clone();
        self.teams.push(team);
        Ok(id)
    }

    /// Insert a fully built team (Draft only), e.g. one loaded from storage.
    /// A team with the same id is replaced. Every pair must name this team, and no pair id
    /// may already be used by another team or appear twice.
    pub fn insert_team(&mut self, mut team: Team) -> Result<(), TournamentError> {
        self.require_draft()?;
        if team.sort_order < 0 {
            return Err(TournamentError::NegativeSortOrder(team.sort_order));
        }
        let mut seen = HashSet::new();
        for pair in &team.pairs {
            if pair.team_id != team.id {
                return Err(TournamentError::PairTeamMismatch {
                    pair: pair.id.clone(),
                    team: team.id.clone(),
                });
            }
            if pair.sort_order < 0 {
                return Err(TournamentError::NegativeSortOrder(pair.sort_order));
            }
            let taken = self
                .teams
                .iter()
                .any(|t| t.id != team.id && t.pair(&pair.id).is_some());
            if taken || !seen.insert(&pair.id) {
                return Err(TournamentError::DuplicatePair(pair.id.clone()));
            }
        }
        team.tournament_id = self.id;
        self.teams.retain(|t| t.id != team.id);
        self.teams.push(team);
        Ok(())
    }

    /// Remove a team and all its pairs (Draft only).
    pub fn remove_team(&mut self, team_id: &TeamId) -> Result<(), TournamentError> {
        self.require_draft()?;
        let idx = self
            .teams
            .iter()
            .position(|t| &t.id == team_id)
            .ok_or_else(|| TournamentError::TeamNotFound(team_id.clone()))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Add a pair at the end of a team's order (Draft only). Returns the new pair's id.
    pub fn add_pair(
        &mut self,
        team_id: &TeamId,
        player1_name: impl Into<String>,
        player2_name: impl Into<String>,
        display_name: Option<String>,
    ) -> Result<PairId, TournamentError> {
        self.require_draft()?;
        let team = self.team_mut(team_id)?;
        let mut pair = Pair::new(
            team.id.clone(),
            player1_name,
            player2_name,
            team.next_pair_sort_order()?,
        )?;
        if let Some(name) = display_name {
            pair = pair.with_display_name(name);
        }
        let id = pair.id.clone();
        team.pairs.push(pair);
        Ok(id)
    }

    /// Remove a pair from a team (Draft only).
    pub fn remove_pair(&mut self, team_id: &TeamId, pair_id: &PairId) -> Result<(), TournamentError> {
        self.require_draft()?;
        let team = self.team_mut(team_id)?;
        let idx = team
            .pairs
            .iter()
            .position(|p| &p.id == pair_id)
            .ok_or_else(|| TournamentError::PairNotFound(pair_id.clone()))?;
        team.pairs.remove(idx);
        Ok(())
    }

    /// Set team order: `order[i]` gets `sort_order = i`. Must list every team exactly once.
    pub fn reorder_teams(&mut self, order: &[TeamId]) -> Result<(), TournamentError> {
        self.require_draft()?;
        if order.len() != self.teams.len() {
            return Err(TournamentError::IncompleteOrdering);
        }
        for id in order {
            if self.team(id).is_none() {
                return Err(TournamentError::TeamNotFound(id.clone()));
            }
        }
        let mut seen = HashSet::new();
        if !order.iter().all(|id| seen.insert(id)) {
            return Err(TournamentError::IncompleteOrdering);
        }
        for (idx, id) in order.iter().enumerate() {
            self.team_mut(id)?.sort_order = idx as i32;
        }
        Ok(())
    }

    /// Set pair order within one team, same rules as [`Tournament::reorder_teams`].
    pub fn reorder_pairs(&mut self, team_id: &TeamId, order: &[PairId]) -> Result<(), TournamentError> {
        self.require_draft()?;
        let team = self.team_mut(team_id)?;
        if order.len() != team.pairs.len() {
            return Err(TournamentError::IncompleteOrdering);
        }
        for id in order {
            if team.pair(id).is_none() {
                return Err(TournamentError::PairNotFound(id.clone()));
            }
        }
        let mut seen = HashSet::new();
        if !order.iter().all(|id| seen.insert(id)) {
            return Err(TournamentError::IncompleteOrdering);
        }
        for (idx, id) in order.iter().enumerate() {
            if let Some(p) = team.pairs.iter_mut().find(|p| &p.id == id) {
                p.sort_order = idx as i32;
            }
        }
        Ok(())
    }

    /// Draft -> Active.
    pub fn start(&mut self) -> Result<(), TournamentError> {
        self.require_draft()?;
        self.status = TournamentStatus::Active;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Active -> Completed.
    pub fn complete(&mut self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Active {
            return Err(TournamentError::InvalidState);
        }
        self.status = TournamentStatus::Completed;
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    /// Draft or Active -> Cancelled.
    pub fn cancel(&mut self) -> Result<(), TournamentError> {
        match self.status {
            TournamentStatus::Draft | TournamentStatus::Active => {
                self.status = TournamentStatus::Cancelled;
                self.ended_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(TournamentError::InvalidState),
        }
    }
}
