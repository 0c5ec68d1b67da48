use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Wire protocol constants
pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 18790;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_PAYLOAD_BYTES: usize = 128 * 1024; // 128 KB hard cap per frame
pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000; // close if client doesn't auth in 10s
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // tick event cadence
pub const DEFAULT_PROXY_HEADER: &str = "x-forwarded-user";

/// Top-level config (calendify.toml + CALENDIFY_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendifyConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    /// Header carrying the upstream identity in `trusted-proxy` mode.
    #[serde(default = "default_proxy_header")]
    pub proxy_header: String,
    /// Subject every request acts as in `none` mode.
    #[serde(default = "default_dev_user")]
    pub dev_user: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            proxy_header: default_proxy_header(),
            dev_user: default_dev_user(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Per-user API tokens issued with `calendify token issue`.
    #[default]
    Token,
    /// An upstream identity provider sets `proxy_header`.
    TrustedProxy,
    /// Single local user; development only.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_proxy_header() -> String {
    DEFAULT_PROXY_HEADER.to_string()
}
fn default_dev_user() -> String {
    "local".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.calendify/calendify.db", home)
}

impl CalendifyConfig {
    /// Load config from a TOML file with CALENDIFY_* env var overrides.
    ///
    /// Uses the explicit path when given, otherwise ~/.calendify/calendify.toml.
    /// A missing file is not an error: every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CalendifyConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CALENDIFY_").split("_"))
            .extract()
            .map_err(|e| crate::error::CalendifyError::Config(e.to_string()))?;

        tracing::debug!(path = %path, mode = ?config.gateway.auth.mode, "config loaded");
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.calendify/calendify.toml", home)
}
