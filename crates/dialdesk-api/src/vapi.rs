//! Pass-through handlers for the provider API. Every request builds a client
//! from the caller's stored settings so key changes take effect immediately.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use dialdesk_types::api::CreateCallRequest;
use dialdesk_vapi::{VapiClient, VapiOptions};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Key fallback order: per-user setting, then the process-wide default.
/// Stored empty strings count as unset.
fn client_for(state: &AppState, user: &AuthUser) -> Result<VapiClient, ApiError> {
    let settings = state.db.get_user_settings(&user.user_id)?;

    let (private_key, assistant_id, phone_number_id) = match settings {
        Some(row) => (
            row.vapi_private_key
                .filter(|key| !key.is_empty())
                .or_else(|| state.vapi_private_key.clone()),
            row.assistant_id.filter(|id| !id.is_empty()),
            row.phone_number_id.filter(|id| !id.is_empty()),
        ),
        None => (state.vapi_private_key.clone(), None, None),
    };

    Ok(VapiClient::new(VapiOptions {
        private_key,
        assistant_id,
        phone_number_id,
    }))
}

pub async fn list_calls(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_for(&state, &user)?;
    Ok(Json(client.get_calls().await?))
}

pub async fn get_call(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(call_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_for(&state, &user)?;
    Ok(Json(client.get_call(&call_id).await?))
}

pub async fn create_call(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateCallRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.phone_number.trim().is_empty() {
        return Err(ApiError::Validation("Phone number is required".into()));
    }

    let client = client_for(&state, &user)?;
    Ok(Json(
        client
            .create_call(&req.phone_number, req.assistant_id.as_deref())
            .await?,
    ))
}

pub async fn get_assistant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    assistant_id: Option<Path<String>>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_for(&state, &user)?;

    let id = assistant_id
        .map(|Path(id)| id)
        .or_else(|| client.assistant_id().map(str::to_string))
        .ok_or_else(|| ApiError::Unconfigured("No assistant id supplied or configured".into()))?;

    Ok(Json(client.get_assistant(&id).await?))
}

pub async fn get_phone_number(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    phone_number_id: Option<Path<String>>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_for(&state, &user)?;

    let id = phone_number_id
        .map(|Path(id)| id)
        .or_else(|| client.phone_number_id().map(str::to_string))
        .ok_or_else(|| {
            ApiError::Unconfigured("No phone number id supplied or configured".into())
        })?;

    Ok(Json(client.get_phone_number(&id).await?))
}
