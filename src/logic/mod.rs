//! Scheduling logic: pairing enumeration, round building, and schedule persistence.

mod pairing;
mod round_robin;
mod schedule;

pub use pairing::{enumerate_pairings, pairs_by_team, PairingCandidate};
pub use round_robin::{build_round_robin, MatchAssignment, Round};
pub use schedule::{
    cancel_tournament, generate_and_persist, generate_schedule, persist_schedule, schedule_stats,
    stats_from_matches, ScheduleStats,
};
