use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user provider configuration. Created lazily on first save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: Uuid,
    pub vapi_private_key: Option<String>,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub default_customer_number: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A locally logged call, reported by the provider webhook. Independent of
/// the provider's own call objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free text; completed/pending/failed are the statuses the dashboard
    /// aggregates on.
    pub status: String,
    pub notes: Option<String>,
    pub recording_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total_calls: u32,
    pub completed_calls: u32,
    pub pending_calls: u32,
    pub failed_calls: u32,
    /// round(100 × completed / total); 0 when the log is empty.
    pub success_rate: u32,
}
