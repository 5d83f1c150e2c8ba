use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY,
            username     TEXT NOT NULL UNIQUE,
            password     TEXT,
            external_id  TEXT UNIQUE,
            email        TEXT,
            display_name TEXT,
            auth_method  TEXT NOT NULL DEFAULT 'local',
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            expires_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user
            ON sessions(user_id);

        CREATE TABLE IF NOT EXISTS user_settings (
            user_id                  TEXT PRIMARY KEY REFERENCES users(id),
            vapi_private_key         TEXT,
            assistant_id             TEXT,
            phone_number_id          TEXT,
            default_customer_number  TEXT,
            updated_at               TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calls (
            id             TEXT PRIMARY KEY,
            user_id        TEXT REFERENCES users(id),
            name           TEXT NOT NULL,
            company        TEXT,
            email          TEXT,
            phone          TEXT,
            status         TEXT NOT NULL,
            notes          TEXT,
            recording_url  TEXT,
            timestamp      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_calls_timestamp
            ON calls(timestamp);

        CREATE INDEX IF NOT EXISTS idx_calls_status
            ON calls(status);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
