use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    extract::{Path, Query, State, WebSocketUpgrade, ws::rejection::WebSocketUpgradeRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use snake_common::games::SessionRng;
use snake_common::games::snake::SnakeSettings;
use snake_common::{PlayerId, SessionToken, log, log_warn};

use crate::broadcaster::WatchBroadcaster;
use crate::routes::api_router;
use crate::store::Store;
use crate::ws_handler::{handle_play_socket, handle_watch_socket};

#[derive(Clone)]
pub struct WebServerState {
    pub store: Store,
    pub broadcaster: WatchBroadcaster,
    pub settings: SnakeSettings,
    session_seed: u64,
    session_counter: Arc<AtomicU64>,
}

impl WebServerState {
    pub fn new(store: Store, broadcaster: WatchBroadcaster, settings: SnakeSettings, session_seed: u64) -> Self {
        Self {
            store,
            broadcaster,
            settings,
            session_seed,
            session_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Each play session gets its own generator, derived from the server seed.
    pub fn next_session(&self) -> (u64, SessionRng) {
        let number = self.session_counter.fetch_add(1, Ordering::Relaxed) + 1;
        (number, SessionRng::new(self.session_seed.wrapping_add(number)))
    }
}

pub fn build_router(state: WebServerState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = api_router()
        .route("/ws/play", get(play_upgrade_handler))
        .route("/ws/watch/{id}", get(watch_upgrade_handler));

    if let Some(dir) = static_dir {
        log!("Serving static files from {} on /ui", dir.display());
        app = app.nest_service("/ui", ServeDir::new(dir));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server(
    addr: SocketAddr,
    state: WebServerState,
    static_dir: Option<PathBuf>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log!("Web server listening on {}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

#[derive(Deserialize)]
struct PlayQuery {
    token: Option<String>,
}

/// Unknown or empty tokens downgrade the connection to a guest session.
async fn resolve_play_token(store: &Store, token: Option<String>) -> Option<SessionToken> {
    let token = SessionToken::new(token.filter(|t| !t.is_empty())?);
    if store.current_user(&token).await.is_none() {
        log_warn!("Play socket presented an unknown session token, continuing as guest");
        return None;
    }
    Some(token)
}

async fn play_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
    Query(query): Query<PlayQuery>,
) -> impl IntoResponse {
    let token = resolve_play_token(&state.store, query.token).await;
    ws.on_upgrade(move |socket| handle_play_socket(socket, state, token))
}

async fn watch_upgrade_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<WebServerState>,
    Path(id): Path<String>,
) -> Response {
    let player_id = PlayerId::new(id);
    if state.store.active_player(&player_id).await.is_none() {
        return (StatusCode::NOT_FOUND, "Player not found").into_response();
    }

    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| handle_watch_socket(socket, state, player_id))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}
