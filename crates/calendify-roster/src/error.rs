use calendify_core::CalendifyError;
use thiserror::Error;

/// Errors from the store/employee/schedule/shift repository.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Missing, or owned by someone else. The two are never distinguished.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A required field is missing or malformed. The message is client-facing.
    #[error("{0}")]
    Validation(String),

    /// A write would break a uniqueness rule.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl RosterError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RosterError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<RosterError> for CalendifyError {
    fn from(e: RosterError) -> Self {
        match e {
            RosterError::NotFound { entity, id } => CalendifyError::not_found(entity, id),
            RosterError::Validation(msg) => CalendifyError::InvalidParams(msg),
            RosterError::Conflict(msg) => CalendifyError::Conflict(msg),
            RosterError::Database(e) => CalendifyError::Database(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
