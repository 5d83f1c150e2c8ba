use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::Database;
use crate::models::{CallRow, SettingsRow, UserRow};
use dialdesk_types::api::{LogCallRequest, UpdateSettingsRequest};
use dialdesk_types::models::CallStats;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, auth_method) VALUES (?1, ?2, ?3, 'local')",
                params![id, username, password_hash],
            )?;
            Ok(())
        })
    }

    pub fn create_federated_user(
        &self,
        id: &str,
        username: &str,
        external_id: &str,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, external_id, email, display_name, auth_method)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'federated')",
                params![id, username, external_id, email, display_name],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "id", id))
    }

    pub fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "external_id", external_id))
    }

    // -- Sessions --

    pub fn create_session(&self, token: &str, user_id: &str, expires_at: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
                params![token, user_id, expires_at],
            )?;
            Ok(())
        })
    }

    /// Resolve a bearer token to a user id. Expired sessions are
    /// indistinguishable from unknown tokens; expired rows stay in place.
    pub fn get_user_id_by_session(&self, token: &str, now: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let user_id = conn
                .query_row(
                    "SELECT user_id FROM sessions WHERE token = ?1 AND expires_at > ?2",
                    params![token, now],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(user_id)
        })
    }

    /// Idempotent: deleting an absent token is not an error.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    // -- Settings --

    pub fn get_user_settings(&self, user_id: &str) -> Result<Option<SettingsRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, vapi_private_key, assistant_id, phone_number_id,
                            default_customer_number, updated_at
                     FROM user_settings WHERE user_id = ?1",
                    [user_id],
                    map_settings_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Partial upsert: absent fields keep their stored value, present fields
    /// overwrite, updated_at is always stamped.
    pub fn upsert_user_settings(
        &self,
        user_id: &str,
        update: &UpdateSettingsRequest,
        updated_at: &str,
    ) -> Result<SettingsRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user_settings
                     (user_id, vapi_private_key, assistant_id, phone_number_id,
                      default_customer_number, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                     vapi_private_key        = COALESCE(excluded.vapi_private_key, vapi_private_key),
                     assistant_id            = COALESCE(excluded.assistant_id, assistant_id),
                     phone_number_id         = COALESCE(excluded.phone_number_id, phone_number_id),
                     default_customer_number = COALESCE(excluded.default_customer_number, default_customer_number),
                     updated_at              = excluded.updated_at",
                params![
                    user_id,
                    update.vapi_private_key,
                    update.assistant_id,
                    update.phone_number_id,
                    update.default_customer_number,
                    updated_at
                ],
            )?;

            let row = conn.query_row(
                "SELECT user_id, vapi_private_key, assistant_id, phone_number_id,
                        default_customer_number, updated_at
                 FROM user_settings WHERE user_id = ?1",
                [user_id],
                map_settings_row,
            )?;
            Ok(row)
        })
    }

    // -- Calls --

    pub fn insert_call(&self, id: &str, call: &LogCallRequest, timestamp: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO calls (id, name, company, email, phone, status, notes, recording_url, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    call.name,
                    call.company,
                    call.email,
                    call.phone,
                    call.status,
                    call.notes,
                    call.recording_url,
                    timestamp
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_calls(&self) -> Result<Vec<CallRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, company, email, phone, status, notes, recording_url, timestamp
                 FROM calls ORDER BY timestamp DESC",
            )?;

            let rows = stmt
                .query_map([], map_call_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring match over the local call log.
    pub fn search_calls(&self, query: &str) -> Result<Vec<CallRow>> {
        let pattern = format!("%{}%", escape_like(query));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, company, email, phone, status, notes, recording_url, timestamp
                 FROM calls
                 WHERE name LIKE ?1 ESCAPE '\\'
                    OR company LIKE ?1 ESCAPE '\\'
                    OR email LIKE ?1 ESCAPE '\\'
                    OR phone LIKE ?1 ESCAPE '\\'
                    OR status LIKE ?1 ESCAPE '\\'
                 ORDER BY timestamp DESC",
            )?;

            let rows = stmt
                .query_map([&pattern], map_call_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn call_stats(&self) -> Result<CallStats> {
        self.with_conn(|conn| {
            let (total, completed, pending, failed): (u32, u32, u32, u32) = conn.query_row(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE status = 'completed'),
                        COUNT(*) FILTER (WHERE status = 'pending'),
                        COUNT(*) FILTER (WHERE status = 'failed')
                 FROM calls",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

            let success_rate = if total > 0 {
                (f64::from(completed) / f64::from(total) * 100.0).round() as u32
            } else {
                0
            };

            Ok(CallStats {
                total_calls: total,
                completed_calls: completed,
                pending_calls: pending,
                failed_calls: failed,
                success_rate,
            })
        })
    }
}

// Column is always a fixed identifier from the wrappers above, never user
// input.
fn query_user_by(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, external_id, email, display_name, auth_method, created_at
         FROM users WHERE {} = ?1",
        column
    );

    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                external_id: row.get(3)?,
                email: row.get(4)?,
                display_name: row.get(5)?,
                auth_method: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_settings_row(row: &Row) -> rusqlite::Result<SettingsRow> {
    Ok(SettingsRow {
        user_id: row.get(0)?,
        vapi_private_key: row.get(1)?,
        assistant_id: row.get(2)?,
        phone_number_id: row.get(3)?,
        default_customer_number: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_call_row(row: &Row) -> rusqlite::Result<CallRow> {
    Ok(CallRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        company: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        recording_url: row.get(8)?,
        timestamp: row.get(9)?,
    })
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
