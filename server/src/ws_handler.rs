use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use snake_common::games::snake::ActivePlayer;
use snake_common::{PlayerId, SessionToken, log, log_debug, log_error, log_warn};

use crate::play_session::{PlayCommand, PlayEvent, PlaySession};
use crate::web_server::WebServerState;

const PLAY_CHANNEL_CAPACITY: usize = 32;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WatchEvent<'a> {
    Player { player: &'a ActivePlayer },
}

pub async fn handle_play_socket(socket: WebSocket, state: WebServerState, token: Option<SessionToken>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (command_tx, command_rx) = mpsc::channel::<PlayCommand>(PLAY_CHANNEL_CAPACITY);
    let (event_tx, mut event_rx) = mpsc::channel::<PlayEvent>(PLAY_CHANNEL_CAPACITY);

    let (number, rng) = state.next_session();
    let label = format!("play-{}", number);
    log!(
        "[{}] player connected ({}, seed {})",
        label,
        if token.is_some() { "signed in" } else { "guest" },
        rng.seed()
    );

    let session = PlaySession::new(label.clone(), state.settings, state.store.clone(), token, rng);
    let session_task = tokio::spawn(session.run(command_rx, event_tx));

    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    log_error!("Failed to encode play event: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log_warn!("[{}] socket error: {}", label, e);
                break;
            }
        };

        let command = match serde_json::from_str::<PlayCommand>(text.as_str()) {
            Ok(command) => command,
            Err(e) => {
                log_warn!("[{}] ignoring malformed command: {}", label, e);
                continue;
            }
        };

        if command_tx.send(command).await.is_err() {
            break;
        }
    }

    drop(command_tx);
    if let Err(e) = session_task.await {
        log_error!("[{}] play session task failed: {}", label, e);
    }
    send_task.abort();

    log!("[{}] player disconnected", label);
}

pub async fn handle_watch_socket(socket: WebSocket, state: WebServerState, player_id: PlayerId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Subscribe before the snapshot so no step falls between the two.
    let mut updates = player_updates(state.broadcaster.subscribe(), player_id.clone());
    log!("Watcher attached to {} ({} watching)", player_id, state.broadcaster.watcher_count());

    if let Some(player) = state.store.active_player(&player_id).await
        && !send_player(&mut ws_sender, &player).await
    {
        return;
    }

    loop {
        tokio::select! {
            update = updates.next() => {
                match update {
                    Some(player) => {
                        if !send_player(&mut ws_sender, &player).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    log!("Watcher detached from {}", player_id);
}

/// Snapshots of one player from the watch channel. Lagged frames are skipped.
pub fn player_updates(
    receiver: broadcast::Receiver<Arc<ActivePlayer>>,
    player_id: PlayerId,
) -> impl Stream<Item = Arc<ActivePlayer>> + Send + Unpin + 'static {
    tokio_stream::StreamExt::filter_map(BroadcastStream::new(receiver), move |update| match update {
        Ok(player) if player.id == player_id => Some(player),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            log_debug!("Watcher of {} lagged, skipped {} updates", player_id, skipped);
            None
        }
    })
}

async fn send_player(ws_sender: &mut SplitSink<WebSocket, Message>, player: &ActivePlayer) -> bool {
    match serde_json::to_string(&WatchEvent::Player { player }) {
        Ok(text) => ws_sender.send(Message::Text(text.into())).await.is_ok(),
        Err(e) => {
            log_error!("Failed to encode watch event: {}", e);
            true
        }
    }
}
