use calendify_core::types::new_record_id;
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::{row_to_user, USER_COLUMNS};
use crate::error::{Result, UserError};
use crate::types::{ApiToken, IssuedToken, User};

/// Prefix on every issued token, so leaked ones are easy to grep for.
pub const TOKEN_PREFIX: &str = "cal_";

/// Lowercase hex SHA-256 of the plaintext token. This is all that is stored.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// 256 bits of randomness from two v4 UUIDs.
fn generate_token() -> String {
    format!(
        "{TOKEN_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Create a new token for `user_id`. The plaintext is only in the return value.
pub fn issue_token(conn: &Connection, user_id: &str, label: Option<&str>) -> Result<IssuedToken> {
    let token = generate_token();
    let record = ApiToken {
        id: new_record_id(),
        user_id: user_id.to_string(),
        label: label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        created_at: Utc::now().to_rfc3339(),
        last_used_at: None,
    };
    conn.execute(
        "INSERT INTO api_tokens (id, user_id, token_hash, label, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id,
            record.user_id,
            hash_token(&token),
            record.label,
            record.created_at,
        ],
    )?;
    Ok(IssuedToken { token, record })
}

/// Look up the owner of a token and stamp `last_used_at`.
pub fn find_user_by_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    let digest = hash_token(token);
    let sql = format!(
        "SELECT {USER_COLUMNS}
         FROM users u
         JOIN api_tokens t ON t.user_id = u.id
         WHERE t.token_hash = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let user = match stmt.query_row(params![digest], row_to_user) {
        Ok(u) => u,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(UserError::DatabaseError(e)),
    };
    conn.execute(
        "UPDATE api_tokens SET last_used_at = ?2 WHERE token_hash = ?1",
        params![digest, Utc::now().to_rfc3339()],
    )?;
    Ok(Some(user))
}

pub fn list_tokens_for_user(conn: &Connection, user_id: &str) -> Result<Vec<ApiToken>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, label, created_at, last_used_at
         FROM api_tokens WHERE user_id = ?1
         ORDER BY created_at ASC",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok(ApiToken {
                id: row.get(0)?,
                user_id: row.get(1)?,
                label: row.get(2)?,
                created_at: row.get(3)?,
                last_used_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
