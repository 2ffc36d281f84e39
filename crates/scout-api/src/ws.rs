//! Realtime WebSocket endpoints.
//!
//! Each socket is registered with the [`NotificationHub`] through a bounded
//! queue drained by a writer task. The hub never waits on that queue, so a
//! slow client is dropped instead of stalling publishers.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use scout_models::{Channel, RealtimeMessage, Scope};
use scout_realtime::{ConnectionId, NotificationHub, OUTBOUND_QUEUE_SIZE};

use crate::metrics;
use crate::state::AppState;

/// Global counter for active WebSocket connections.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// `/realtime`
pub async fn ws_global(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    upgrade(ws, state, Channel::Global.into(), "global")
}

/// `/realtime/players`
pub async fn ws_players(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    upgrade(ws, state, Channel::Players.into(), "players")
}

/// `/realtime/highlights`
pub async fn ws_highlights(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    upgrade(ws, state, Channel::Highlights.into(), "highlights")
}

/// `/realtime/analytics`
pub async fn ws_analytics(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    upgrade(ws, state, Channel::Analytics.into(), "analytics")
}

/// `/realtime/player/:player_id`
pub async fn ws_player(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> impl IntoResponse {
    upgrade(ws, state, Scope::player(player_id), "player")
}

fn upgrade(ws: WebSocketUpgrade, state: AppState, scope: Scope, endpoint: &'static str) -> impl IntoResponse {
    metrics::record_ws_connection(endpoint);
    let hub = state.hub.clone();

    ws.on_upgrade(move |socket| async move {
        let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_ws_active_connections(count);
        let _active = scopeguard::guard((), |_| {
            let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
            metrics::set_ws_active_connections(count);
        });

        handle_socket(socket, hub, scope, endpoint).await;
    })
}

async fn handle_socket(socket: WebSocket, hub: Arc<NotificationHub>, scope: Scope, endpoint: &'static str) {
    let (mut ws_sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_SIZE);
    let id = hub.register(tx).await;

    // Greeting goes out before any scoped traffic can be queued
    if !send(&hub, id, &RealtimeMessage::connected(&scope), endpoint).await {
        hub.disconnect(id).await;
        return;
    }
    if let Err(e) = hub.subscribe(id, scope.clone()).await {
        warn!(connection_id = %id, "Subscription failed: {}", e);
        hub.disconnect(id).await;
        return;
    }
    info!(connection_id = %id, scope = %scope, "Realtime client connected");

    let writer = tokio::spawn(async move {
        let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                payload = rx.recv() => {
                    let Some(text) = payload else { break };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if ws_sender.send(Message::Ping(Vec::new())).await.is_err() {
                        debug!("Heartbeat failed, client disconnected");
                        break;
                    }
                }
            }
        }
        // Dropping `rx` here makes the hub prune this connection on its next send
    });
    let _writer = scopeguard::guard(writer.abort_handle(), |handle| handle.abort());

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(_)) | Ok(Message::Binary(_)) => {
                metrics::record_ws_message_received(endpoint);
                if !send(&hub, id, &RealtimeMessage::pong(), endpoint).await {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Protocol-level ping/pong is answered by the socket itself
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = %id, "WebSocket receive error: {}", e);
                break;
            }
        }
    }

    hub.disconnect(id).await;
    info!(connection_id = %id, scope = %scope, "Realtime client disconnected");
}

/// Queue a message for one connection; false once the connection is gone.
async fn send(hub: &NotificationHub, id: ConnectionId, message: &RealtimeMessage, endpoint: &str) -> bool {
    match hub.send_personal(id, message).await {
        Ok(true) => {
            metrics::record_ws_message_sent(endpoint, message.type_name());
            true
        }
        Ok(false) => false,
        Err(e) => {
            warn!(connection_id = %id, "Failed to encode {}: {}", message.type_name(), e);
            true
        }
    }
}
