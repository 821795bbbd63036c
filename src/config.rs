// Runtime configuration, read from the environment (and `.env` if present).

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/platform.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 20;
const DEFAULT_AUTO_APPROVE_DELAY_MINS: i64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub gemini_timeout: Duration,
    /// `None` disables the cron trigger entirely.
    pub cron_secret: Option<String>,
    pub auto_approve_delay_mins: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR '{}' is not a socket address", bind_addr))?;

        let gemini_api_key =
            var("GEMINI_API_KEY").context("Missing GEMINI_API_KEY environment variable")?;

        let gemini_timeout = match var("GEMINI_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS '{}' is not a number", v))?,
            None => DEFAULT_GEMINI_TIMEOUT_SECS,
        };

        let auto_approve_delay_mins = match var("AUTO_APPROVE_DELAY_MINS") {
            Some(v) => v
                .parse::<i64>()
                .with_context(|| format!("AUTO_APPROVE_DELAY_MINS '{}' is not a number", v))?,
            None => DEFAULT_AUTO_APPROVE_DELAY_MINS,
        };
        if auto_approve_delay_mins < 0 {
            bail!("AUTO_APPROVE_DELAY_MINS cannot be negative");
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL"),
            gemini_timeout: Duration::from_secs(gemini_timeout),
            cron_secret: var("CRON_SECRET"),
            auto_approve_delay_mins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("GEMINI_API_KEY", "key")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_timeout, Duration::from_secs(20));
        assert_eq!(config.auto_approve_delay_mins, 30);
        assert!(config.cron_secret.is_none());
        assert!(config.gemini_base_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "key"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CRON_SECRET", "s3cret"),
            ("AUTO_APPROVE_DELAY_MINS", "5"),
            ("GEMINI_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auto_approve_delay_mins, 5);
        assert_eq!(config.gemini_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("GEMINI_API_KEY", "key"), ("BIND_ADDR", "nowhere")]).is_err());
        assert!(
            config_from(&[("GEMINI_API_KEY", "key"), ("AUTO_APPROVE_DELAY_MINS", "-1")]).is_err()
        );
        // A blank secret counts as unset.
        let config = config_from(&[("GEMINI_API_KEY", "key"), ("CRON_SECRET", " ")]).unwrap();
        assert!(config.cron_secret.is_none());
    }
}
