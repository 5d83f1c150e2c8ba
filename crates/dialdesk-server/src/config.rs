use anyhow::{Context, Result};

/// Process configuration, read once at startup. No hot reload.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    /// Fallback provider key for users with no stored key.
    pub vapi_private_key: Option<String>,
    /// Shared secret for the call-logging webhook.
    pub webhook_key: Option<String>,
    /// Allowed CORS origins; empty means permissive (development).
    pub cors_origins: Vec<String>,
    pub google_client_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("DIALDESK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("DIALDESK_PORT")
            .unwrap_or_else(|_| "5001".into())
            .parse()
            .context("DIALDESK_PORT must be a port number")?;
        let db_path = std::env::var("DIALDESK_DB_PATH").unwrap_or_else(|_| "dialdesk.db".into());

        let cors_origins = std::env::var("DIALDESK_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            db_path,
            vapi_private_key: env_opt("VAPI_PRIVATE_KEY"),
            webhook_key: env_opt("DIALDESK_WEBHOOK_KEY"),
            cors_origins,
            google_client_id: env_opt("GOOGLE_CLIENT_ID"),
        })
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
