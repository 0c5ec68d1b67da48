use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    http::HeaderMap,
    response::IntoResponse,
};
use calendify_core::config::{HANDSHAKE_TIMEOUT_MS, HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES};
use calendify_core::types::ConnId;
use calendify_protocol::frames::EventFrame;
use calendify_users::User;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::ws::{handshake, message, send};

/// Per-connection queue depth for owner events.
const PUSH_QUEUE: usize = 64;

/// WS connection states: linear progression, no backwards transitions.
pub enum ConnState {
    AwaitingConnect,
    Authenticated(User),
    Closing,
}

/// What the connection knows before the first frame arrives.
pub struct ConnContext {
    pub conn_id: String,
    /// Identity asserted by the upstream proxy on the upgrade request.
    pub proxy_subject: Option<String>,
    /// Registered in `AppState::ws_clients` once authenticated.
    pub push_tx: mpsc::Sender<String>,
}

/// Axum handler: upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let proxy_subject =
        crate::auth::proxy_subject(&headers, &state.config.gateway.auth.proxy_header);
    ws.max_message_size(MAX_PAYLOAD_BYTES)
        .on_upgrade(move |socket| run_connection(socket, state, proxy_subject))
}

/// Per-connection event loop; lives for the entire WS session.
async fn run_connection(socket: WebSocket, state: Arc<AppState>, proxy_subject: Option<String>) {
    let (push_tx, mut push_rx) = mpsc::channel::<String>(PUSH_QUEUE);
    let ctx = ConnContext {
        conn_id: ConnId::new().to_string(),
        proxy_subject,
        push_tx,
    };
    let conn_id = ctx.conn_id.as_str();
    info!(conn_id, "new WS connection");

    let (tx, mut rx) = socket.split();
    let shared_tx: send::SharedSink = Arc::new(tokio::sync::Mutex::new(tx));

    let nonce = handshake::make_nonce();
    if send::text(&shared_tx, handshake::challenge_event(&nonce)).await.is_err() {
        return;
    }
    let mut conn_state = ConnState::AwaitingConnect;

    // handshake must complete within 10s
    let deadline =
        tokio::time::Instant::now() + std::time::Duration::from_millis(HANDSHAKE_TIMEOUT_MS);
    let mut handshake_timer = Box::pin(tokio::time::sleep_until(deadline));

    // heartbeat tick after auth
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_PAYLOAD_BYTES {
                            warn!(conn_id, size = text.len(), "payload too large");
                            break;
                        }
                        let (next, reply) =
                            message::handle(&ctx, text.as_str(), conn_state, &state).await;
                        conn_state = next;
                        if let Some(res) = reply {
                            if send::json(&shared_tx, &res).await.is_err() { break; }
                        }
                        if matches!(conn_state, ConnState::Closing) { break; }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let mut guard = shared_tx.lock().await;
                        let _ = guard.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(conn_id, error = %e, "WS read error");
                        break;
                    }
                    _ => {}
                }
            }

            Some(payload) = push_rx.recv() => {
                if send::text(&shared_tx, payload).await.is_err() {
                    break;
                }
            }

            _ = tick.tick() => {
                if matches!(conn_state, ConnState::Authenticated(_)) {
                    let ev = EventFrame::new(
                        "tick",
                        serde_json::json!({ "ts": chrono::Utc::now().timestamp_millis() }),
                    ).with_seq(state.next_seq());
                    if send::json(&shared_tx, &ev).await.is_err() {
                        break;
                    }
                }
            }

            _ = &mut handshake_timer, if matches!(conn_state, ConnState::AwaitingConnect) => {
                warn!(conn_id, "handshake timeout");
                break;
            }
        }
    }

    state.ws_clients.remove(conn_id);
    info!(conn_id, "WS connection closed");
}
