use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use dialdesk_vapi::VapiError;

use crate::identity::IdentityError;

/// One taxonomy for everything a handler can fail with, rendered as a JSON
/// `{message}` body the dashboard shows verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unconfigured(String),
    #[error(transparent)]
    Provider(#[from] VapiError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Unconfigured(_) | ApiError::Provider(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                // Internal detail is logged, never leaked. Provider detail
                // passes through to the caller.
                ApiError::Internal(err) => error!("Internal error: {:#}", err),
                other => error!("{}", other),
            }
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(_) | IdentityError::Audience => ApiError::Unauthorized,
            IdentityError::Http(e) => ApiError::Internal(e.into()),
        }
    }
}
