use calendify_core::CalendifyError;
use thiserror::Error;

/// All user-layer errors. The gateway maps them to wire codes through
/// `CalendifyError`.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    /// Unknown token. Deliberately says nothing about why.
    #[error("invalid API token")]
    InvalidToken,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

impl From<UserError> for CalendifyError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => CalendifyError::not_found("User", id),
            UserError::InvalidToken => CalendifyError::AuthFailed("invalid API token".to_string()),
            UserError::Validation(msg) => CalendifyError::InvalidParams(msg),
            UserError::DatabaseError(e) => CalendifyError::Database(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, UserError>;
