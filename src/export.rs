//! Fixture list export (CSV), for printing or spreadsheets.

use crate::models::{GameMatch, PairId, Tournament, TournamentError};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FixtureRow<'a> {
    round: u32,
    #[serde(rename = "match")]
    match_number: u32,
    home_team: &'a str,
    home_pair: String,
    away_team: &'a str,
    away_pair: String,
    status: &'static str,
}

fn export_err(e: impl std::fmt::Display) -> TournamentError {
    TournamentError::Export(e.to_string())
}

/// Team name and pair label, falling back to the raw id for pairs no longer on the roster.
fn describe<'a>(tournament: &'a Tournament, pair_id: &PairId) -> (&'a str, String) {
    let team = tournament.team_of(pair_id).map(|t| t.name.as_str()).unwrap_or("");
    let label = tournament
        .pair(pair_id)
        .map(|p| p.label())
        .unwrap_or_else(|| pair_id.to_string());
    (team, label)
}

/// Write one CSV row per match (with a header), in round/match order.
pub fn write_fixtures_csv<W: Write>(
    writer: W,
    tournament: &Tournament,
    matches: &[GameMatch],
) -> Result<(), TournamentError> {
    let mut ordered: Vec<&GameMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| (m.round_number, m.match_number));

    let mut wtr = csv::Writer::from_writer(writer);
    for m in ordered {
        let (home_team, home_pair) = describe(tournament, &m.home_pair_id);
        let (away_team, away_pair) = describe(tournament, &m.away_pair_id);
        wtr.serialize(FixtureRow {
            round: m.round_number,
            match_number: m.match_number,
            home_team,
            home_pair,
            away_team,
            away_pair,
            status: m.status.as_str(),
        })
        .map_err(export_err)?;
    }
    wtr.flush().map_err(export_err)?;
    Ok(())
}

/// Convenience wrapper returning the CSV as a string.
pub fn fixtures_csv(tournament: &Tournament, matches: &[GameMatch]) -> Result<String, TournamentError> {
    let mut buf = Vec::new();
    write_fixtures_csv(&mut buf, tournament, matches)?;
    String::from_utf8(buf).map_err(export_err)
}
