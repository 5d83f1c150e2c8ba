use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth::AppState;
use crate::error::ApiError;

/// Authenticated user id, inserted by [`require_auth`] for downstream
/// handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Resolve the bearer token against the session store. Missing, unknown and
/// expired tokens are indistinguishable: all yield 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let user_id = state
        .db
        .get_user_id_by_session(token, Utc::now().timestamp())?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}

/// Extract the token from an Authorization header, with or without the
/// conventional `Bearer ` prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() { None } else { Some(token) }
}
