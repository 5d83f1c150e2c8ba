pub mod auth;
pub mod calls;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod settings;
pub mod vapi;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::AppState;

/// Full API route table. CORS and trace layers are applied by the binary.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", post(auth::google_login))
        // Webhook: authenticated by shared secret inside the handler, not by
        // a user session.
        .route("/api/logCall", post(calls::log_call))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/calls", get(calls::list_calls))
        .route("/api/calls/search", get(calls::search_calls))
        .route("/api/stats", get(calls::call_stats))
        .route("/api/vapi/calls", get(vapi::list_calls).post(vapi::create_call))
        .route("/api/vapi/calls/{call_id}", get(vapi::get_call))
        .route("/api/vapi/assistant", get(vapi::get_assistant))
        .route("/api/vapi/assistant/{assistant_id}", get(vapi::get_assistant))
        .route("/api/vapi/phone", get(vapi::get_phone_number))
        .route("/api/vapi/phone/{phone_number_id}", get(vapi::get_phone_number))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}
