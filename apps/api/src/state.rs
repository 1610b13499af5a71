use std::sync::Arc;

use crate::apply::storage::ApplicantStore;
use crate::config::Config;
use crate::recaptcha::TokenVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: ApplicantStore,
    /// Pluggable token verifier. Production: `RecaptchaVerifier` against
    /// Google's siteverify endpoint. Tests substitute a fake.
    pub verifier: Arc<dyn TokenVerifier>,
}
