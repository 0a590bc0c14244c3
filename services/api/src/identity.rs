//! Identity assertion verification
//!
//! The identity exchange endpoint accepts an opaque Google-issued ID token
//! and delegates its verification here. Verification is a trait so handlers
//! and tests depend on the capability, not on the network.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// A successfully verified external identity.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Stable subject identifier (the verified email)
    pub subject: String,
    /// Display name; empty when the provider supplies none
    pub display_name: String,
}

/// Failure detail from assertion verification.
///
/// Logged internally only. Callers collapse every variant into one uniform
/// authentication error so verification internals never leak to clients.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("verifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("assertion rejected by verifier: {0}")]
    Rejected(String),

    #[error("assertion was issued for a different audience")]
    AudienceMismatch,
}

/// Verifies opaque third-party identity assertions.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id the assertion must have been issued for
    pub client_id: String,
}

impl GoogleConfig {
    /// Create a new GoogleConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`: OAuth client id of the browser application
    pub fn from_env() -> anyhow::Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable not set"))?;

        Ok(GoogleConfig { client_id })
    }
}

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google ID tokens through the tokeninfo endpoint.
///
/// Google rejects malformed, expired, and badly signed tokens with a
/// non-success status; the audience is checked locally against the
/// configured client id. Single attempt, bounded by the client timeout.
#[derive(Clone)]
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleIdentityVerifier {
    pub fn new(config: GoogleConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }
}

/// Claims returned by the tokeninfo endpoint for a valid ID token.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: String,
    name: Option<String>,
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected(response.status().to_string()));
        }

        let info: TokenInfo = response.json().await?;
        if info.aud != self.config.client_id {
            return Err(IdentityError::AudienceMismatch);
        }

        Ok(VerifiedIdentity {
            subject: info.email,
            display_name: info.name.unwrap_or_default(),
        })
    }
}
