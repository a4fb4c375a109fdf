//! JSON REST surface over [`GameService`].
//!
//! Service calls are synchronous and may touch SQLite, so each handler runs
//! its call on the blocking thread pool.

use crate::service::{CreatedMatch, GameService, JoinedMatch, MatchLookup, MoveOutcome};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kings_valley::{MatchError, MatchSnapshot, Position};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Body of `POST /api/game/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Creator's display name.
    pub player_name: String,
}

/// Body of `POST /api/game/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameRequest {
    /// Join code shared by the creator.
    pub room_code: String,
    /// Joiner's display name.
    pub player_name: String,
}

/// Body of `POST /api/game/move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeMoveRequest {
    /// Match id.
    pub game_id: String,
    /// Id of the player making the move.
    pub player_id: String,
    /// Origin row.
    pub from_row: i32,
    /// Origin column.
    pub from_col: i32,
    /// Destination row.
    pub to_row: i32,
    /// Destination column.
    pub to_col: i32,
}

/// Error body returned for every rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind, e.g. `not_your_turn`.
    pub error: String,
    /// Human-readable message.
    pub detail: String,
}

/// A [`MatchError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub MatchError);

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            MatchError::NotFound(_) | MatchError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
            MatchError::MatchFull => StatusCode::CONFLICT,
            MatchError::OutOfBounds(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MatchError::IllegalMove { .. }
            | MatchError::NotYourTurn(_)
            | MatchError::NotInProgress(_) => StatusCode::BAD_REQUEST,
            MatchError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MatchError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            MatchError::OutOfBounds(_) => "out_of_bounds",
            MatchError::IllegalMove { .. } => "illegal_move",
            MatchError::NotYourTurn(_) => "not_your_turn",
            MatchError::NotInProgress(_) => "not_in_progress",
            MatchError::UnknownPlayer(_) => "unknown_player",
            MatchError::MatchFull => "match_full",
            MatchError::NotFound(_) => "not_found",
            MatchError::Unavailable(_) => "unavailable",
            MatchError::InvariantViolation(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, %status, "Request failed");
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Runs a service call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MatchError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MatchError::Unavailable(format!("worker failed: {e}")))?
        .map_err(ApiError::from)
}

/// Builds the `/api` router.
pub fn router(service: GameService) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/game/create", post(create_game))
        .route("/api/game/join", post(join_game))
        .route("/api/game/move", post(make_move))
        .route("/api/game/room/{code}", get(get_game_by_code))
        .route("/api/game/{id}", get(get_game))
        .route("/api/game/{id}/moves/{row}/{col}", get(legal_moves))
        .with_state(service)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "King's Valley Game API" }))
}

#[instrument(skip(service))]
async fn create_game(
    State(service): State<GameService>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreatedMatch>, ApiError> {
    let created = blocking(move || service.create_match(&req.player_name)).await?;
    Ok(Json(created))
}

#[instrument(skip(service))]
async fn join_game(
    State(service): State<GameService>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<JoinedMatch>, ApiError> {
    let joined = blocking(move || service.join_match(&req.room_code, &req.player_name)).await?;
    Ok(Json(joined))
}

#[instrument(skip(service))]
async fn get_game(
    State(service): State<GameService>,
    Path(id): Path<String>,
) -> Result<Json<MatchSnapshot>, ApiError> {
    let state = blocking(move || service.get_state(&MatchLookup::Id(id))).await?;
    Ok(Json(state))
}

#[instrument(skip(service))]
async fn get_game_by_code(
    State(service): State<GameService>,
    Path(code): Path<String>,
) -> Result<Json<MatchSnapshot>, ApiError> {
    let state = blocking(move || service.get_state(&MatchLookup::Code(code))).await?;
    Ok(Json(state))
}

#[instrument(skip(service))]
async fn make_move(
    State(service): State<GameService>,
    Json(req): Json<MakeMoveRequest>,
) -> Result<Json<MoveOutcome>, ApiError> {
    let from = Position::new(req.from_row, req.from_col);
    let to = Position::new(req.to_row, req.to_col);
    let outcome =
        blocking(move || service.submit_move(&req.game_id, &req.player_id, from, to)).await?;
    Ok(Json(outcome))
}

#[instrument(skip(service))]
async fn legal_moves(
    State(service): State<GameService>,
    Path((id, row, col)): Path<(String, i32, i32)>,
) -> Result<Json<Vec<Position>>, ApiError> {
    let targets = blocking(move || service.legal_moves(&id, Position::new(row, col))).await?;
    Ok(Json(targets))
}
