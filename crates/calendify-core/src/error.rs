use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// A WS frame that is out of order or malformed for the current state.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    /// Message is shown to clients as-is.
    #[error("{0}")]
    InvalidParams(String),

    /// Also used when the record exists but belongs to another user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CalendifyError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        CalendifyError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Short error code string sent to clients in RES frames.
    pub fn code(&self) -> &'static str {
        match self {
            CalendifyError::Config(_) => "CONFIG_ERROR",
            CalendifyError::AuthFailed(_) => "AUTH_FAILED",
            CalendifyError::Protocol(_) => "PROTOCOL_ERROR",
            CalendifyError::MethodNotFound { .. } => "METHOD_NOT_FOUND",
            CalendifyError::InvalidParams(_) => "INVALID_PARAMS",
            CalendifyError::NotFound { .. } => "NOT_FOUND",
            CalendifyError::Conflict(_) => "CONFLICT",
            CalendifyError::Database(_) => "DATABASE_ERROR",
            CalendifyError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendifyError>;
