use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider rejected the assertion outright.
    #[error("Identity assertion rejected: {0}")]
    Rejected(String),
    /// The token is valid but was issued for a different client.
    #[error("Identity token audience mismatch")]
    Audience,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// A verified external identity, ready to be resolved to a local user.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Capability: exchange an external assertion (an ID token) for a verified
/// profile. Route handlers call this directly; no strategy registration, no
/// serialize/deserialize hooks.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn exchange(&self, assertion: &str) -> Result<ExternalProfile, IdentityError>;
}

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google ID tokens against the tokeninfo endpoint. The dashboard
/// runs the OAuth dance in the browser and posts the resulting ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    client_id: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleIdentity {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            http: Client::new(),
        }
    }
}

impl IdentityProvider for GoogleIdentity {
    async fn exchange(&self, assertion: &str) -> Result<ExternalProfile, IdentityError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(body));
        }

        let info: TokenInfo = response.json().await?;
        if info.aud != self.client_id {
            return Err(IdentityError::Audience);
        }

        debug!("Verified Google identity for subject {}", info.sub);

        Ok(ExternalProfile {
            subject: info.sub,
            email: info.email,
            display_name: info.name,
        })
    }
}
