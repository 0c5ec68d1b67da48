use calendify_core::types::new_record_id;
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::db::{row_to_user, USER_COLUMNS};
use crate::error::{Result, UserError};
use crate::types::{User, UserIdentity};

/// Insert a brand-new user. The id is generated here so the caller has the
/// canonical id without a follow-up query.
pub fn create_user(conn: &Connection, display_name: &str) -> Result<User> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(UserError::Validation("Display name is required".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let user = User {
        id: new_record_id(),
        display_name: display_name.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    conn.execute(
        "INSERT INTO users (id, display_name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![user.id, user.display_name, user.created_at, user.updated_at],
    )?;
    Ok(user)
}

/// Load a user by primary key. `None` when absent; callers decide whether
/// that is exceptional.
pub fn get_user(conn: &Connection, user_id: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    match stmt.query_row(params![user_id], row_to_user) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(UserError::DatabaseError(e)),
    }
}

/// Link an external account to an existing user. UNIQUE(provider, subject)
/// rejects a second link at the DB level.
pub fn add_identity(
    conn: &Connection,
    user_id: &str,
    provider: &str,
    subject: &str,
) -> Result<UserIdentity> {
    let identity = UserIdentity {
        id: new_record_id(),
        user_id: user_id.to_string(),
        provider: provider.to_string(),
        subject: subject.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    conn.execute(
        "INSERT INTO user_identities (id, user_id, provider, subject, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            identity.id,
            identity.user_id,
            identity.provider,
            identity.subject,
            identity.created_at,
        ],
    )?;
    Ok(identity)
}

/// Given a provider + subject, return the owning user.
pub fn find_user_by_identity(
    conn: &Connection,
    provider: &str,
    subject: &str,
) -> Result<Option<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS}
         FROM users u
         JOIN user_identities i ON i.user_id = u.id
         WHERE i.provider = ?1 AND i.subject = ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    match stmt.query_row(params![provider, subject], row_to_user) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(UserError::DatabaseError(e)),
    }
}

pub fn list_identities_for_user(conn: &Connection, user_id: &str) -> Result<Vec<UserIdentity>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, provider, subject, created_at
         FROM user_identities WHERE user_id = ?1
         ORDER BY created_at ASC",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok(UserIdentity {
                id: row.get(0)?,
                user_id: row.get(1)?,
                provider: row.get(2)?,
                subject: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
