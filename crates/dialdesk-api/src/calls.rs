use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use dialdesk_db::models::{CallRow, parse_timestamp};
use dialdesk_types::api::{LogCallRequest, LogCallResponse};
use dialdesk_types::models::CallRecord;

use crate::auth::AppState;
use crate::error::ApiError;

/// Inbound webhook from the provider. Authenticated by shared secret; the
/// provider holds no user session.
pub async fn log_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LogCallRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let expected = state.webhook_key.as_deref().ok_or_else(|| {
        ApiError::Unconfigured("Server configuration error: webhook key not configured".into())
    })?;

    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if provided != Some(expected) {
        return Err(ApiError::Unauthorized);
    }

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if req.status.trim().is_empty() {
        return Err(ApiError::Validation("status is required".into()));
    }

    let call_id = Uuid::new_v4();
    state
        .db
        .insert_call(&call_id.to_string(), &req, &Utc::now().to_rfc3339())?;

    Ok((
        StatusCode::CREATED,
        Json(LogCallResponse {
            message: "Call logged successfully".into(),
            call_id,
        }),
    ))
}

pub async fn list_calls(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let calls: Vec<CallRecord> = state.db.list_calls()?.into_iter().map(to_api).collect();
    Ok(Json(calls))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_calls(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let calls: Vec<CallRecord> = state
        .db
        .search_calls(query.q.trim())?
        .into_iter()
        .map(to_api)
        .collect();
    Ok(Json(calls))
}

pub async fn call_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.call_stats()?))
}

fn to_api(row: CallRow) -> CallRecord {
    let id = row.id.parse().unwrap_or_else(|e| {
        warn!("Corrupt call id '{}': {}", row.id, e);
        Uuid::default()
    });

    CallRecord {
        id,
        name: row.name,
        company: row.company,
        email: row.email,
        phone: row.phone,
        status: row.status,
        notes: row.notes,
        recording_url: row.recording_url,
        timestamp: parse_timestamp(&row.timestamp, "call"),
        user_id: row.user_id.and_then(|raw| raw.parse().ok()),
    }
}
