use rusqlite::{Connection, Result};

use crate::types::User;

/// Column order shared by every user SELECT in this crate.
pub(crate) const USER_COLUMNS: &str = "u.id, u.display_name, u.created_at, u.updated_at";

pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Initialise all tables for the users subsystem. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_users_table(conn)?;
    create_identities_table(conn)?;
    create_tokens_table(conn)?;
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY NOT NULL,
            display_name  TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );",
    )
}

fn create_identities_table(conn: &Connection) -> Result<()> {
    // One user per external account.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_identities (
            id          TEXT PRIMARY KEY NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            provider    TEXT NOT NULL,
            subject     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(provider, subject)
        );",
    )
}

fn create_tokens_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS api_tokens (
            id            TEXT PRIMARY KEY NOT NULL,
            user_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash    TEXT NOT NULL UNIQUE,   -- sha256, lowercase hex
            label         TEXT,
            created_at    TEXT NOT NULL,
            last_used_at  TEXT
        );",
    )
}
