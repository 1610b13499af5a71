use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime mode of the service. Only `Production` enforces the reCAPTCHA
/// verification result; every other mode logs it and moves on. This is an
/// explicit config value so both branches are testable deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Production,
    Development,
}

impl RuntimeMode {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("production") {
            RuntimeMode::Production
        } else {
            RuntimeMode::Development
        }
    }

    pub fn enforces_recaptcha(self) -> bool {
        self == RuntimeMode::Production
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub recaptcha_secret_key: String,
    pub recaptcha_site_key: String,
    pub runtime_mode: RuntimeMode,
    pub applicants_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            recaptcha_secret_key: require_env("RECAPTCHA_SECRET_KEY")?,
            recaptcha_site_key: require_env("RECAPTCHA_SITE_KEY")?,
            runtime_mode: RuntimeMode::parse(
                &std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            applicants_dir: PathBuf::from(
                std::env::var("APPLICANTS_DIR").unwrap_or_else(|_| "applicants".to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_mode_is_case_insensitive() {
        assert_eq!(RuntimeMode::parse("production"), RuntimeMode::Production);
        assert_eq!(RuntimeMode::parse("PRODUCTION"), RuntimeMode::Production);
    }

    #[test]
    fn anything_else_is_development() {
        assert_eq!(RuntimeMode::parse("development"), RuntimeMode::Development);
        assert_eq!(RuntimeMode::parse("staging"), RuntimeMode::Development);
        assert_eq!(RuntimeMode::parse(""), RuntimeMode::Development);
    }

    #[test]
    fn only_production_enforces_recaptcha() {
        assert!(RuntimeMode::Production.enforces_recaptcha());
        assert!(!RuntimeMode::Development.enforces_recaptcha());
    }
}
