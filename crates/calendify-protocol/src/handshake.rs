use serde::{Deserialize, Serialize};

/// Client → Server: first frame on a WebSocket.
/// Sent as: `REQ connect { auth: { mode: "token", token: "..." } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub auth: AuthPayload,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Discriminated auth payload; `mode` decides which fields are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AuthPayload {
    Token { token: String },
    /// Identity comes from the proxy header on the upgrade request.
    TrustedProxy,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
}

/// Server → Client: successful handshake payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloOk {
    pub protocol: u32,
    pub server: ServerInfo,
    /// The authenticated caller.
    pub user_id: String,
    /// Every RPC method this server answers.
    pub methods: Vec<String>,
    pub policy: ClientPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientPolicy {
    pub max_message_size: usize,
    pub tick_interval_ms: u64,
}
