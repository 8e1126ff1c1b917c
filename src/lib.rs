//! Pairs tournament web app: library with models, scheduling logic, and match storage.

pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use export::{fixtures_csv, write_fixtures_csv};
pub use logic::{
    build_round_robin, cancel_tournament, enumerate_pairings, generate_and_persist, generate_schedule,
    pairs_by_team, persist_schedule, schedule_stats, stats_from_matches, MatchAssignment,
    PairingCandidate, Round, ScheduleStats,
};
pub use models::{
    GameMatch, MatchId, MatchStatus, Pair, PairId, Team, TeamId, Tournament, TournamentError,
    TournamentId, TournamentSettings, TournamentStatus,
};
pub use store::{InMemoryMatchStore, MatchStore, StoreError};
