//! REST API: every route is declared in `configure`.
//!
//! Caller identity comes from the `X-User-Id` and `X-Superuser` headers set by the
//! authentication layer in front of this service.

use crate::error::TournamentError;
use crate::logic::{parse_score, RosterChange, TournamentFilter};
use crate::models::{
    BracketMatchId, Caller, Format, GroupId, GroupMatchId, Level, PlayerId, TournamentDraft,
    TournamentId,
};
use crate::service::{TournamentDetail, TournamentService};
use actix_web::{
    delete,
    dev::Payload,
    get,
    http::{header::HeaderMap, StatusCode},
    post, put,
    web::{self, Data, Json, Path, Query},
    FromRequest, HttpRequest, HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

pub type AppState = Data<TournamentService>;

pub const USER_HEADER: &str = "x-user-id";
pub const SUPERUSER_HEADER: &str = "x-superuser";

impl ResponseError for TournamentError {
    fn status_code(&self) -> StatusCode {
        match self {
            TournamentError::Validation(_) => StatusCode::BAD_REQUEST,
            TournamentError::Unauthorized => StatusCode::FORBIDDEN,
            TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
            TournamentError::Capacity { .. } | TournamentError::InvalidStage { .. } => {
                StatusCode::CONFLICT
            }
            TournamentError::Eligibility(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TournamentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Identity from request headers. A missing or malformed user id means anonymous.
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let is_superuser = user_id.is_some()
        && headers
            .get(SUPERUSER_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
    Caller {
        user_id,
        is_superuser,
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(caller_from_headers(req.headers())))
    }
}

/// Malformed JSON bodies become validation errors with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| TournamentError::Validation(err.to_string()).into())
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

#[derive(Deserialize)]
struct GroupMatchPath {
    id: GroupMatchId,
}

#[derive(Deserialize)]
struct BracketMatchPath {
    id: BracketMatchId,
}

/// Comma-separated `fmt` and `levels` (levels use a dot: `3.5,4.0`); unparseable entries are ignored.
#[derive(Deserialize)]
struct ListQuery {
    q: Option<String>,
    city: Option<String>,
    fmt: Option<String>,
    levels: Option<String>,
}

fn comma_list(raw: &Option<String>) -> impl Iterator<Item = &str> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl ListQuery {
    fn into_filter(self) -> TournamentFilter {
        let formats = comma_list(&self.fmt)
            .filter_map(|s| s.parse::<u32>().ok())
            .filter_map(|n| Format::try_from(n).ok())
            .collect();
        let levels = comma_list(&self.levels)
            .filter_map(|s| s.parse::<Level>().ok())
            .collect();
        TournamentFilter {
            q: self.q,
            city: self.city,
            formats,
            levels,
        }
    }
}

#[derive(Deserialize)]
struct GenerateGroupsBody {
    group_size: Option<usize>,
}

#[derive(Deserialize)]
struct PromoteBody {
    take: Option<usize>,
}

#[derive(Deserialize)]
struct RegisterBody {
    player_id: PlayerId,
}

/// A score may arrive as a number or as a form string ("" clears).
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Number(u32),
    Text(String),
}

impl ScoreValue {
    fn resolve(value: Option<ScoreValue>) -> Result<Option<u32>, TournamentError> {
        match value {
            None => Ok(None),
            Some(ScoreValue::Number(n)) => Ok(Some(n)),
            Some(ScoreValue::Text(s)) => parse_score(&s),
        }
    }
}

#[derive(Deserialize)]
struct ScoreBody {
    #[serde(default)]
    p1_score: Option<ScoreValue>,
    #[serde(default)]
    p2_score: Option<ScoreValue>,
}

/// Roster change result plus the refreshed tournament.
#[derive(Serialize)]
struct RosterResponse {
    result: RosterChange,
    tournament: TournamentDetail,
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tennis-tournaments",
    })
}

/// List tournaments with optional filters (?q=&city=&fmt=16,32&levels=3.0,3.5).
#[get("/api/tournaments")]
async fn api_list_tournaments(
    state: AppState,
    query: Query<ListQuery>,
) -> Result<HttpResponse, TournamentError> {
    let filter = query.into_inner().into_filter();
    Ok(HttpResponse::Ok().json(state.list_tournaments(&filter)?))
}

#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    caller: Caller,
    body: Json<TournamentDraft>,
) -> Result<HttpResponse, TournamentError> {
    let t = state.create_tournament(&caller, body.into_inner())?;
    Ok(HttpResponse::Created().json(state.tournament(t.id)?))
}

/// Tournament with participants, groups (with tables) and bracket rounds.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
    body: Json<TournamentDraft>,
) -> Result<HttpResponse, TournamentError> {
    state.update_tournament(&caller, path.id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    state.delete_tournament(&caller, path.id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the caller's own player profile.
#[post("/api/tournaments/{id}/join")]
async fn api_join(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    let result = state.join(&caller, path.id)?;
    Ok(HttpResponse::Ok().json(RosterResponse {
        result,
        tournament: state.tournament(path.id)?,
    }))
}

#[post("/api/tournaments/{id}/leave")]
async fn api_leave(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    let result = state.leave(&caller, path.id)?;
    Ok(HttpResponse::Ok().json(RosterResponse {
        result,
        tournament: state.tournament(path.id)?,
    }))
}

/// Register a specific player (the player's owner or the organizer).
#[post("/api/tournaments/{id}/players")]
async fn api_register_player(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
    body: Json<RegisterBody>,
) -> Result<HttpResponse, TournamentError> {
    let result = state.register_player(&caller, path.id, body.player_id)?;
    Ok(HttpResponse::Ok().json(RosterResponse {
        result,
        tournament: state.tournament(path.id)?,
    }))
}

#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_withdraw_player(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPlayerPath>,
) -> Result<HttpResponse, TournamentError> {
    let result = state.withdraw_player(&caller, path.id, path.player_id)?;
    Ok(HttpResponse::Ok().json(RosterResponse {
        result,
        tournament: state.tournament(path.id)?,
    }))
}

/// (Re)generate groups; optional body `{"group_size": n}`.
#[post("/api/tournaments/{id}/groups")]
async fn api_generate_groups(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
    body: Option<Json<GenerateGroupsBody>>,
) -> Result<HttpResponse, TournamentError> {
    let group_size = body.and_then(|b| b.group_size);
    state.generate_groups(&caller, path.id, group_size)?;
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

/// (Re)generate the knockout bracket from all registered players.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    state.generate_knockout(&caller, path.id)?;
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

/// Seed the bracket from group tables; optional body `{"take": n}`.
#[post("/api/tournaments/{id}/promote")]
async fn api_promote(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
    body: Option<Json<PromoteBody>>,
) -> Result<HttpResponse, TournamentError> {
    let take = body.and_then(|b| b.take);
    state.promote(&caller, path.id, take)?;
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

#[post("/api/tournaments/{id}/finish")]
async fn api_finish(
    state: AppState,
    caller: Caller,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, TournamentError> {
    state.finish(&caller, path.id)?;
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

/// Group with its matches and standings table.
#[get("/api/groups/{id}")]
async fn api_get_group(
    state: AppState,
    path: Path<GroupPath>,
) -> Result<HttpResponse, TournamentError> {
    Ok(HttpResponse::Ok().json(state.group(path.id)?))
}

#[put("/api/group-matches/{id}/score")]
async fn api_group_score(
    state: AppState,
    caller: Caller,
    path: Path<GroupMatchPath>,
    body: Json<ScoreBody>,
) -> Result<HttpResponse, TournamentError> {
    let body = body.into_inner();
    let p1 = ScoreValue::resolve(body.p1_score)?;
    let p2 = ScoreValue::resolve(body.p2_score)?;
    Ok(HttpResponse::Ok().json(state.record_group_score(&caller, path.id, p1, p2)?))
}

#[put("/api/bracket-matches/{id}/score")]
async fn api_bracket_score(
    state: AppState,
    caller: Caller,
    path: Path<BracketMatchPath>,
    body: Json<ScoreBody>,
) -> Result<HttpResponse, TournamentError> {
    let body = body.into_inner();
    let p1 = ScoreValue::resolve(body.p1_score)?;
    let p2 = ScoreValue::resolve(body.p2_score)?;
    Ok(HttpResponse::Ok().json(state.record_bracket_score(&caller, path.id, p1, p2)?))
}

/// The full routing table.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(api_health)
        .service(api_list_tournaments)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_update_tournament)
        .service(api_delete_tournament)
        .service(api_join)
        .service(api_leave)
        .service(api_register_player)
        .service(api_withdraw_player)
        .service(api_generate_groups)
        .service(api_generate_bracket)
        .service(api_promote)
        .service(api_finish)
        .service(api_get_group)
        .service(api_group_score)
        .service(api_bracket_score);
}
