mod apply;
mod config;
mod errors;
mod recaptcha;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::apply::storage::ApplicantStore;
use crate::config::Config;
use crate::recaptcha::RecaptchaVerifier;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Careers API v{}", env!("CARGO_PKG_VERSION"));
    info!("Runtime mode: {:?}", config.runtime_mode);

    // Applicant store: files land under this directory, created lazily on
    // the first accepted submission.
    let store = ApplicantStore::new(config.applicants_dir.clone());
    info!("Applicant store directory: {}", store.dir().display());

    // reCAPTCHA verifier (real siteverify calls; tests swap in a fake)
    let verifier = Arc::new(RecaptchaVerifier::new(
        config.recaptcha_secret_key.clone(),
    ));
    info!("reCAPTCHA verifier initialized");

    let state = AppState {
        config: config.clone(),
        store,
        verifier,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
