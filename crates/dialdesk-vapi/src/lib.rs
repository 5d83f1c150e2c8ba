//! Thin client for the Vapi voice-calling REST API. Responses are passed
//! through as raw JSON; the dashboard renders whatever the provider returns.

pub mod phone;

use reqwest::{Client, Method};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use crate::phone::format_to_e164;

const DEFAULT_BASE_URL: &str = "https://api.vapi.ai";

#[derive(Debug, Error)]
pub enum VapiError {
    /// No private key configured for this user or process. Checked before
    /// any request is issued.
    #[error("Vapi private key missing. Please configure it in settings.")]
    MissingKey,
    /// Non-2xx answer from the provider, relayed with its detail. Never
    /// retried.
    #[error("Vapi API error: {status} {status_text} - {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Per-user client configuration, resolved from stored settings with the
/// process-wide key as fallback.
#[derive(Debug, Clone, Default)]
pub struct VapiOptions {
    pub private_key: Option<String>,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VapiClient {
    http: Client,
    base_url: String,
    options: VapiOptions,
}

impl VapiClient {
    pub fn new(options: VapiOptions) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            options,
        }
    }

    /// Point the client at a different host (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn assistant_id(&self) -> Option<&str> {
        self.options.assistant_id.as_deref()
    }

    pub fn phone_number_id(&self) -> Option<&str> {
        self.options.phone_number_id.as_deref()
    }

    pub async fn get_calls(&self) -> Result<Value, VapiError> {
        self.request(Method::GET, "/call", None).await
    }

    pub async fn get_call(&self, call_id: &str) -> Result<Value, VapiError> {
        self.request(Method::GET, &format!("/call/{}", call_id), None).await
    }

    /// Place an outbound call. The destination is normalized to E.164 before
    /// submission; assistant and phone-number ids fall back to the configured
    /// defaults.
    pub async fn create_call(
        &self,
        phone_number: &str,
        assistant_id: Option<&str>,
    ) -> Result<Value, VapiError> {
        let body = json!({
            "phoneNumberId": self.options.phone_number_id.as_deref(),
            "assistantId": assistant_id.or(self.options.assistant_id.as_deref()),
            "customer": { "number": format_to_e164(phone_number) },
        });

        self.request(Method::POST, "/call", Some(body)).await
    }

    pub async fn get_assistant(&self, assistant_id: &str) -> Result<Value, VapiError> {
        self.request(Method::GET, &format!("/assistant/{}", assistant_id), None).await
    }

    pub async fn get_phone_number(&self, phone_number_id: &str) -> Result<Value, VapiError> {
        self.request(Method::GET, &format!("/phone-number/{}", phone_number_id), None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, VapiError> {
        let key = self.options.private_key.as_deref().ok_or(VapiError::MissingKey)?;

        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Vapi API error on {}: {} {}", path, status, body);
            return Err(VapiError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
