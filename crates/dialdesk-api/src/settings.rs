use anyhow::anyhow;
use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use dialdesk_db::models::{SettingsRow, parse_timestamp};
use dialdesk_types::api::UpdateSettingsRequest;
use dialdesk_types::models::UserSettings;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// "No settings yet" is a valid state: respond with an empty object, never
/// 404.
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    match state.db.get_user_settings(&user.user_id)? {
        Some(row) => {
            let value = serde_json::to_value(to_api(row)?).map_err(anyhow::Error::from)?;
            Ok(Json(value))
        }
        None => Ok(Json(json!({}))),
    }
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .upsert_user_settings(&user.user_id, &update, &Utc::now().to_rfc3339())?;

    Ok(Json(to_api(row)?))
}

fn to_api(row: SettingsRow) -> Result<UserSettings, ApiError> {
    let user_id: Uuid = row
        .user_id
        .parse()
        .map_err(|e| anyhow!("Corrupt user id '{}': {}", row.user_id, e))?;

    Ok(UserSettings {
        user_id,
        vapi_private_key: row.vapi_private_key,
        assistant_id: row.assistant_id,
        phone_number_id: row.phone_number_id,
        default_customer_number: row.default_customer_number,
        updated_at: parse_timestamp(&row.updated_at, "user_settings"),
    })
}
