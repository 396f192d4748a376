//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::indexer::KatSettings;
use crate::indexer::definitions::kat::DEFAULT_BASE_URL;
use crate::indexer::fetcher::DEFAULT_USER_AGENT;
use crate::services::logging::LoggingConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the KAT provider is enabled
    pub kat_enabled: bool,

    /// KAT site root, always ending in `/`
    pub kat_url: String,

    /// User agent sent to KAT
    pub kat_user_agent: String,

    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,

    /// Default tracing filter, overridden by RUST_LOG
    pub log_filter: String,

    /// Emit JSON log lines
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kat_url = lookup("KAT_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let kat_url = kat_url.trim();
        if !(kat_url.starts_with("http://") || kat_url.starts_with("https://")) {
            bail!("Invalid KAT_URL: {}", kat_url);
        }
        let kat_url = if kat_url.ends_with('/') {
            kat_url.to_string()
        } else {
            format!("{}/", kat_url)
        };

        let http_timeout_secs: u64 = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .trim()
            .parse()
            .context("Invalid HTTP_TIMEOUT_SECS")?;
        if http_timeout_secs == 0 {
            bail!("Invalid HTTP_TIMEOUT_SECS: must be greater than zero");
        }

        Ok(Self {
            kat_enabled: lookup("KAT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),

            kat_url,

            kat_user_agent: lookup("KAT_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),

            http_timeout_secs,

            log_filter: "kat_indexer=debug".to_string(),

            log_json: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Settings for the KAT provider
    pub fn kat_settings(&self) -> KatSettings {
        let mut settings = KatSettings::new(&self.kat_url);
        settings.enabled = self.kat_enabled;
        settings.user_agent = self.kat_user_agent.clone();
        settings.timeout = Duration::from_secs(self.http_timeout_secs);
        settings
    }

    /// Logging setup
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            filter: self.log_filter.clone(),
            json: self.log_json,
            ..LoggingConfig::default()
        }
    }
}
