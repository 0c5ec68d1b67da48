use rusqlite::Connection;

use crate::error::Result;

/// Initialise the roster schema. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_stores_table(conn)?;
    create_employees_table(conn)?;
    create_schedules_table(conn)?;
    create_shifts_table(conn)?;
    Ok(())
}

fn create_stores_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS stores (
            id            TEXT PRIMARY KEY NOT NULL,
            store_number  INTEGER NOT NULL,
            name          TEXT NOT NULL,
            location      TEXT NOT NULL,
            owner_id      TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_stores_owner
            ON stores (owner_id, created_at);",
    )?;
    Ok(())
}

fn create_employees_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS employees (
            id               TEXT PRIMARY KEY NOT NULL,
            employee_number  INTEGER NOT NULL,
            name             TEXT NOT NULL,
            store_id         TEXT NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            owner_id         TEXT NOT NULL,
            created_at       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_employees_store
            ON employees (owner_id, store_id, created_at);",
    )?;
    Ok(())
}

fn create_schedules_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schedules (
            id                TEXT PRIMARY KEY NOT NULL,
            end_of_week_date  TEXT NOT NULL,   -- YYYY-MM-DD, as entered
            store_id          TEXT NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            owner_id          TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_schedules_owner
            ON schedules (owner_id, created_at);",
    )?;
    Ok(())
}

fn create_shifts_table(conn: &Connection) -> Result<()> {
    // One shift per employee per day of a schedule; the week grid relies on it.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS shifts (
            id           TEXT PRIMARY KEY NOT NULL,
            employee_id  TEXT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            schedule_id  TEXT NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
            day_of_week  INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
            start_time   TEXT NOT NULL,   -- HH:MM:SS
            end_time     TEXT NOT NULL,
            notes        TEXT,
            owner_id     TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE (employee_id, schedule_id, day_of_week)
        );
        CREATE INDEX IF NOT EXISTS idx_shifts_schedule
            ON shifts (owner_id, schedule_id);",
    )?;
    Ok(())
}
