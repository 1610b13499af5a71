//! reCAPTCHA verification — the single point of contact with Google's
//! siteverify API.
//!
//! The handler depends on the `TokenVerifier` trait, not on this client
//! directly, so tests can substitute a fake instead of making network calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Bounded round-trip for the verification call. Exceeding it surfaces as a
/// `VerifyError`, which production mode treats as a verification failure.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Capability interface for human-verification checks.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Checks one client-supplied token. `Ok(false)` means the service
    /// answered and rejected it; `Err` means the call itself failed.
    async fn verify(&self, token: &str) -> Result<bool, VerifyError>;
}

/// Verifier backed by Google's siteverify endpoint.
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(VERIFY_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            secret,
        }
    }
}

#[async_trait]
impl TokenVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, VerifyError> {
        let response = self
            .client
            .post(SITEVERIFY_URL)
            .query(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?;

        let body: SiteverifyResponse = response.json().await?;
        if !body.success {
            warn!(codes = ?body.error_codes, "siteverify rejected token");
        }

        Ok(body.success)
    }
}
