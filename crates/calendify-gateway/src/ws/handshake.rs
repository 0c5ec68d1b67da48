use calendify_core::config::{
    HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES, PROTOCOL_VERSION,
};
use calendify_protocol::{
    frames::EventFrame,
    handshake::{ClientPolicy, HelloOk, ServerInfo},
    methods,
};
use calendify_users::User;
use serde_json::json;
use uuid::Uuid;

/// Random nonce for the connect challenge.
pub fn make_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The `connect.challenge` event that opens every WS session.
pub fn challenge_event(nonce: &str) -> String {
    let frame = EventFrame::new("connect.challenge", json!({ "nonce": nonce }));
    serde_json::to_string(&frame).unwrap_or_default()
}

/// The `hello-ok` payload sent after successful authentication.
pub fn hello_ok_payload(user: &User) -> HelloOk {
    HelloOk {
        protocol: PROTOCOL_VERSION,
        server: ServerInfo {
            name: "calendify".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            node_id: "primary".to_string(),
        },
        user_id: user.id.clone(),
        methods: methods::ALL.iter().map(|m| m.to_string()).collect(),
        policy: ClientPolicy {
            max_message_size: MAX_PAYLOAD_BYTES,
            tick_interval_ms: HEARTBEAT_INTERVAL_SECS * 1000,
        },
    }
}
