use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use snake_common::games::snake::{ActivePlayer, GameMode};
use snake_common::{PlayerId, SessionToken};

use crate::store::{LeaderboardEntry, Session, StoreError, User};
use crate::web_server::WebServerState;

pub fn api_router() -> Router<WebServerState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(current_user))
        .route("/api/leaderboard", get(leaderboard).post(submit_score))
        .route("/api/players", get(active_players))
        .route("/api/players/{id}", get(active_player))
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::UserExists => StatusCode::CONFLICT,
            StoreError::InvalidCredentials | StoreError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(SessionToken::new(token))
}

// --- Auth ---

#[derive(Deserialize)]
struct SignupRequest {
    username: String,
    email: String,
    password: String,
}

async fn signup(
    State(state): State<WebServerState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state
        .store
        .signup(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<WebServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = state.store.login(&payload.email, &payload.password).await?;
    Ok(Json(session))
}

async fn logout(State(state): State<WebServerState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.store.logout(&token).await;
    }
    StatusCode::NO_CONTENT
}

async fn current_user(
    State(state): State<WebServerState>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Missing bearer token"))?;
    let user = state
        .store
        .current_user(&token)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Session expired"))?;
    Ok(Json(user))
}

// --- Leaderboard ---

#[derive(Deserialize)]
struct LeaderboardQuery {
    mode: Option<GameMode>,
}

async fn leaderboard(
    State(state): State<WebServerState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<LeaderboardEntry>> {
    Json(state.store.leaderboard(query.mode).await)
}

#[derive(Deserialize)]
struct SubmitScoreRequest {
    score: u32,
    mode: GameMode,
}

async fn submit_score(
    State(state): State<WebServerState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitScoreRequest>,
) -> Result<(StatusCode, Json<LeaderboardEntry>), ApiError> {
    let token = bearer_token(&headers).ok_or(StoreError::NotAuthenticated)?;
    let entry = state
        .store
        .submit_score(&token, payload.score, payload.mode)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// --- Watch list ---

async fn active_players(State(state): State<WebServerState>) -> Json<Vec<ActivePlayer>> {
    Json(state.store.active_players().await)
}

async fn active_player(
    State(state): State<WebServerState>,
    Path(id): Path<String>,
) -> Result<Json<ActivePlayer>, ApiError> {
    state
        .store
        .active_player(&PlayerId::new(id))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Player not found"))
}
