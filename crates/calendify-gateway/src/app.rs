use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use calendify_core::config::{CalendifyConfig, MAX_PAYLOAD_BYTES};
use calendify_core::types::UserId;
use calendify_protocol::frames::EventFrame;
use calendify_roster::RosterManager;
use calendify_users::UserResolver;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tracing::debug;

/// An authenticated WS connection: who it belongs to and how to reach it.
pub struct WsClient {
    pub user_id: UserId,
    pub tx: mpsc::Sender<String>,
}

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: CalendifyConfig,
    pub event_seq: AtomicU64,
    pub users: UserResolver,
    pub roster: RosterManager,
    /// Authenticated WS connections: conn_id -> client.
    pub ws_clients: DashMap<String, WsClient>,
}

impl AppState {
    pub fn new(config: CalendifyConfig, users: UserResolver, roster: RosterManager) -> Self {
        Self {
            config,
            event_seq: AtomicU64::new(0),
            users,
            roster,
            ws_clients: DashMap::new(),
        }
    }

    /// Monotonically increasing sequence for pushed events.
    pub fn next_seq(&self) -> u64 {
        self.event_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Push an event to every WS connection owned by `owner`. Other users
    /// never see it. Slow clients with a full queue miss the event.
    pub fn notify_owner(&self, owner: &UserId, event: &str, payload: serde_json::Value) {
        let frame = EventFrame::new(event, payload).with_seq(self.next_seq());
        let Ok(json) = serde_json::to_string(&frame) else {
            return;
        };
        let mut delivered = 0usize;
        for entry in self.ws_clients.iter() {
            if entry.value().user_id == *owner && entry.value().tx.try_send(json.clone()).is_ok() {
                delivered += 1;
            }
        }
        debug!(owner = %owner, event, delivered, "owner event pushed");
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route("/rpc/{method}", post(crate::http::rpc::rpc_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// In-memory state for handler tests.
#[cfg(test)]
pub(crate) fn test_state(mode: calendify_core::config::AuthMode) -> Arc<AppState> {
    let mut config = CalendifyConfig::default();
    config.gateway.auth.mode = mode;
    let users = UserResolver::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
    let roster = RosterManager::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
    Arc::new(AppState::new(config, users, roster))
}
