//! Data structures for the pairs tournament: teams, pairs, matches, tournament state.

mod game;
mod pair;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchStatus};
pub use pair::{Pair, PairId};
pub use team::{Team, TeamId};
pub use tournament::{
    Tournament, TournamentError, TournamentId, TournamentSettings, TournamentStatus,
};
