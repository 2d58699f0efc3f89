use std::str::FromStr;
use std::time::Duration;

use crate::aggregator::JOBS_AMOUNT_PER_COMPANY;
use crate::errors::ConfigError;
use crate::providers::airtable::{self, AirtableCredentials};
use crate::sources::SourcesConfig;

/// Runtime configuration loaded from environment variables (and `.env`).
/// Airtable credentials are optional here; they are enforced when an
/// Airtable provider is actually built.
#[derive(Debug, Clone)]
pub struct Config {
    pub airtable: Option<AirtableCredentials>,
    pub airtable_api_url: String,
    pub sources: SourcesConfig,
    pub per_company: usize,
    pub http_timeout: Duration,
    pub ranked: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let sources = match optional_env("JOBS_SOURCES_PATH") {
            Some(path) => SourcesConfig::from_path(path)?,
            None => SourcesConfig::default(),
        };

        Ok(Config {
            airtable: AirtableCredentials::from_env().ok(),
            airtable_api_url: optional_env("AIRTABLE_API_URL")
                .unwrap_or_else(|| airtable::DEFAULT_API_URL.to_string()),
            sources,
            per_company: parse_env("JOBS_PER_COMPANY", JOBS_AMOUNT_PER_COMPANY)?,
            http_timeout: Duration::from_secs(parse_env("JOBS_HTTP_TIMEOUT_SECS", 30)?),
            ranked: parse_env("JOBS_RANKED", false)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Airtable credentials, or the error explaining which variables are missing.
    pub fn airtable_credentials(&self) -> Result<AirtableCredentials, ConfigError> {
        self.airtable.clone().ok_or_else(airtable::missing_credentials)
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|err| ConfigError::InvalidValue {
            key,
            message: format!("'{raw}': {err}"),
        }),
        None => Ok(default),
    }
}

/// Serializes tests that mutate process environment.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    use std::sync::{Mutex, OnceLock};
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(()))
}
