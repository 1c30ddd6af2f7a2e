use std::time::Duration;

use anyhow::{Context, Result};

/// Gateway configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub port: u16,
    pub rust_log: String,
    /// `None` disables the apply timeout (APPLY_TIMEOUT_SECS=0).
    pub apply_timeout: Option<Duration>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let apply_timeout_secs = parse_env_or("APPLY_TIMEOUT_SECS", 60)?;
        let http_timeout_secs = parse_env_or("HTTP_TIMEOUT_SECS", 30)?;

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            apply_timeout: (apply_timeout_secs > 0)
                .then(|| Duration::from_secs(apply_timeout_secs)),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}
