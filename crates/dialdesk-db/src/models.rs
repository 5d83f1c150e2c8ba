//! Database row types — these map directly to SQLite rows.
//! Distinct from dialdesk-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

pub struct UserRow {
    pub id: String,
    pub username: String,
    /// Absent for federated accounts.
    pub password: Option<String>,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub auth_method: String,
    pub created_at: String,
}

pub struct SettingsRow {
    pub user_id: String,
    pub vapi_private_key: Option<String>,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub default_customer_number: Option<String>,
    pub updated_at: String,
}

pub struct CallRow {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub recording_url: Option<String>,
    pub timestamp: String,
}

/// Rows we write carry RFC 3339 timestamps; datetime('now') defaults store
/// "YYYY-MM-DD HH:MM:SS" without a timezone. Accept both.
pub fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}
