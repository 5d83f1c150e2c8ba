use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use rand_core::RngCore;
use uuid::Uuid;

use dialdesk_db::Database;
use dialdesk_types::api::{AuthResponse, GoogleLoginRequest, LoginRequest, SignupRequest, UserProfile};

use crate::error::ApiError;
use crate::identity::{ExternalProfile, GoogleIdentity, IdentityProvider};
use crate::middleware::bearer_token;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Process-wide provider key, used when a user has not stored their own.
    pub vapi_private_key: Option<String>,
    /// Shared secret expected in X-API-KEY on the call-logging webhook.
    pub webhook_key: Option<String>,
    pub identity: Option<GoogleIdentity>,
}

/// Fixed session lifetime. Sessions are never renewed on use.
const SESSION_TTL_DAYS: i64 = 7;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation("Username must be 3-32 characters".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("Password must be at least 8 characters".into()));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    state.db.create_user(&user_id.to_string(), &req.username, &password_hash)?;

    let token = mint_session(&state.db, &user_id.to_string())?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile {
                id: user_id,
                username: req.username,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized)?;

    // Federated accounts carry no local password to verify against.
    let stored_hash = user.password.as_deref().ok_or(ApiError::Unauthorized)?;
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!("Corrupt password hash: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow!("Corrupt user id '{}': {}", user.id, e))?;

    // A fresh session per login; earlier sessions stay valid until expiry.
    let token = mint_session(&state.db, &user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile {
            id: user_id,
            username: user.username,
        },
    }))
}

pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = state
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::Unconfigured("Google sign-in is not configured".into()))?;

    let profile = identity.exchange(&req.id_token).await?;

    let user = match state.db.get_user_by_external_id(&profile.subject)? {
        Some(user) => user,
        None => {
            let username = pick_username(&state.db, &profile)?;
            let user_id = Uuid::new_v4();
            state.db.create_federated_user(
                &user_id.to_string(),
                &username,
                &profile.subject,
                profile.email.as_deref(),
                profile.display_name.as_deref(),
            )?;
            state
                .db
                .get_user_by_id(&user_id.to_string())?
                .ok_or_else(|| anyhow!("Just-created user missing"))?
        }
    };

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow!("Corrupt user id '{}': {}", user.id, e))?;

    let token = mint_session(&state.db, &user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile {
            id: user_id,
            username: user.username,
        },
    }))
}

/// Drop the caller's session. Deleting an already-deleted token succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.db.delete_session(token)?;
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Mint an opaque bearer session: 48 random bytes hex-encoded, valid for a
/// fixed seven days.
fn mint_session(db: &Database, user_id: &str) -> Result<String, ApiError> {
    let mut bytes = [0u8; 48];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let expires_at = (Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp();
    db.create_session(&token, user_id, expires_at)?;

    Ok(token)
}

/// Derive a username for a first-time federated login: display name, then the
/// email local part, then a generated handle; suffixed when already taken.
fn pick_username(db: &Database, profile: &ExternalProfile) -> Result<String, ApiError> {
    let base = profile
        .display_name
        .clone()
        .or_else(|| {
            profile
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("user-{}", &Uuid::new_v4().to_string()[..8]));

    if db.get_user_by_username(&base)?.is_none() {
        return Ok(base);
    }

    Ok(format!("{}-{}", base, &Uuid::new_v4().to_string()[..8]))
}
