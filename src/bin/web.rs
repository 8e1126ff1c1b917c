//! Single binary web server: REST API for rosters and schedule generation.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST (e.g. 127.0.0.1), PORT (e.g. 8080).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pairs_tournament_web::{
    cancel_tournament, fixtures_csv, generate_and_persist, schedule_stats, InMemoryMatchStore,
    MatchStore, PairId, TeamId, Tournament, TournamentError, TournamentId, TournamentSettings,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory tournaments by ID. Entries (and their matches) are removed after inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;
type Matches = Data<InMemoryMatchStore>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(flatten)]
    settings: TournamentSettings,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct AddPairBody {
    player1_name: String,
    player2_name: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct TeamOrderBody {
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct PairOrderBody {
    pair_ids: Vec<PairId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id.
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

/// Path segments: tournament id, team id and pair id.
#[derive(Deserialize)]
struct TournamentPairPath {
    id: TournamentId,
    team_id: TeamId,
    pair_id: PairId,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "lock error" }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

/// Domain errors are the caller's to fix (400); storage failures are ours (500).
fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::Persistence(_) | TournamentError::Export(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
        TournamentError::TeamNotFound(_) | TournamentError::PairNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Run `f` on the tournament under the write lock, refreshing its activity time.
/// Responds with the updated tournament on success.
fn update_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match f(&mut entry.tournament) {
        Ok(()) => HttpResponse::Ok().json(&entry.tournament),
        Err(e) => error_response(&e),
    }
}

/// Schedule `id` while holding the state write lock, so the tournament cannot be deleted,
/// started or edited between the eligibility check and the store write.
fn generate_locked(state: &AppState, matches: &InMemoryMatchStore, id: TournamentId) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match generate_and_persist(matches, &entry.tournament) {
        Ok(rounds) => HttpResponse::Ok().json(rounds),
        Err(e) => error_response(&e),
    }
}

/// Remove the tournament and its matches under the state write lock.
fn delete_locked(state: &AppState, matches: &InMemoryMatchStore, id: TournamentId) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if g.remove(&id).is_none() {
        return not_found();
    }
    if let Err(e) = matches.remove_tournament(id) {
        return error_response(&e.into());
    }
    log::info!("Deleted tournament {}", id);
    HttpResponse::NoContent().finish()
}

/// Copy of the tournament, refreshing its activity time. The map lock is released on return.
fn snapshot(state: &AppState, id: TournamentId) -> Result<Tournament, HttpResponse> {
    let mut g = state.write().map_err(|_| lock_error())?;
    let entry = g.get_mut(&id).ok_or_else(not_found)?;
    entry.last_activity = Instant::now();
    Ok(entry.tournament.clone())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pairs-tournament-web",
    })
}

/// Create a new Draft tournament (settings default when omitted).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut tournament = match Tournament::new(body.name, body.settings) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    tournament.description = body.description;
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    log::info!("Created tournament {}", id);
    let entry = g.entry(id).or_insert(TournamentEntry {
        tournament,
        last_activity: Instant::now(),
    });
    HttpResponse::Ok().json(&entry.tournament)
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match snapshot(&state, path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(resp) => resp,
    }
}

/// Delete a tournament and its matches.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    delete_locked(&state, matches.get_ref(), path.id)
}

/// Replace the tournament settings (Draft only).
#[put("/api/tournaments/{id}/settings")]
async fn api_update_settings(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentSettings>,
) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.update_settings(*body))
}

/// Add a team (Draft only).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let body = body.into_inner();
    update_tournament(&state, path.id, |t| {
        let team_id = t.add_team(body.name)?;
        if let Some(color) = body.color.filter(|c| !c.trim().is_empty()) {
            if let Some(team) = t.teams.iter_mut().find(|team| team.id == team_id) {
                team.color = color;
            }
        }
        Ok(())
    })
}

/// Remove a team and its pairs (Draft only).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.remove_team(&path.team_id))
}

/// Reorder all teams (Draft only).
#[put("/api/tournaments/{id}/teams/order")]
async fn api_reorder_teams(state: AppState, path: Path<TournamentPath>, body: Json<TeamOrderBody>) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.reorder_teams(&body.team_ids))
}

/// Add a pair to a team (Draft only).
#[post("/api/tournaments/{id}/teams/{team_id}/pairs")]
async fn api_add_pair(state: AppState, path: Path<TournamentTeamPath>, body: Json<AddPairBody>) -> HttpResponse {
    let body = body.into_inner();
    update_tournament(&state, path.id, |t| {
        t.add_pair(&path.team_id, body.player1_name, body.player2_name, body.display_name)
            .map(|_| ())
    })
}

/// Remove a pair (Draft only).
#[delete("/api/tournaments/{id}/teams/{team_id}/pairs/{pair_id}")]
async fn api_remove_pair(state: AppState, path: Path<TournamentPairPath>) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.remove_pair(&path.team_id, &path.pair_id))
}

/// Reorder a team's pairs (Draft only).
#[put("/api/tournaments/{id}/teams/{team_id}/pairs/order")]
async fn api_reorder_pairs(
    state: AppState,
    path: Path<TournamentTeamPath>,
    body: Json<PairOrderBody>,
) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.reorder_pairs(&path.team_id, &body.pair_ids))
}

/// Generate the schedule and replace any stored matches. Returns the rounds.
#[post("/api/tournaments/{id}/schedule")]
async fn api_generate_schedule(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    generate_locked(&state, matches.get_ref(), path.id)
}

/// Stored matches in round/match order.
#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = snapshot(&state, path.id) {
        return resp;
    }
    match matches.matches(path.id) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(&e.into()),
    }
}

/// Match-count distribution of the stored schedule.
#[get("/api/tournaments/{id}/schedule/stats")]
async fn api_schedule_stats(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match snapshot(&state, path.id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match schedule_stats(matches.get_ref(), &tournament) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(&e),
    }
}

/// Fixture list as CSV.
#[get("/api/tournaments/{id}/matches.csv")]
async fn api_matches_csv(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match snapshot(&state, path.id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let csv = matches
        .matches(path.id)
        .map_err(TournamentError::from)
        .and_then(|list| fixtures_csv(&tournament, &list));
    match csv {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => error_response(&e),
    }
}

/// Draft -> Active.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.start())
}

/// Active -> Completed.
#[post("/api/tournaments/{id}/complete")]
async fn api_complete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update_tournament(&state, path.id, |t| t.complete())
}

/// Draft or Active -> Cancelled; stored matches are marked cancelled.
#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: AppState, matches: Matches, path: Path<TournamentPath>) -> HttpResponse {
    update_tournament(&state, path.id, |t| {
        cancel_tournament(matches.get_ref(), t).map(|_| ())
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_delete_tournament)
        .service(api_update_settings)
        .service(api_reorder_teams)
        .service(api_add_team)
        .service(api_remove_team)
        .service(api_reorder_pairs)
        .service(api_add_pair)
        .service(api_remove_pair)
        .service(api_generate_schedule)
        .service(api_matches_csv)
        .service(api_list_matches)
        .service(api_schedule_stats)
        .service(api_start_tournament)
        .service(api_complete_tournament)
        .service(api_cancel_tournament);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));
    let matches = Data::new(InMemoryMatchStore::new());

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    let matches_cleanup = matches.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let stale: Vec<TournamentId> = g
                .iter()
                .filter(|(_, entry)| entry.last_activity.elapsed() >= INACTIVITY_TIMEOUT)
                .map(|(id, _)| *id)
                .collect();
            for id in &stale {
                g.remove(id);
                if let Err(e) = matches_cleanup.remove_tournament(*id) {
                    log::warn!("Could not drop matches of tournament {}: {}", id, e);
                }
            }
            if !stale.is_empty() {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", stale.len());
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(matches.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
