//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOODY_API_BASE_URL` - Base URL of the restaurant REST API
//!
//! ## Optional
//! - `FOODY_STORAGE_PATH` - JSON file used as durable client storage
//!   (default: `<data dir>/foody/storage.json`)
//! - `FOODY_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `FOODY_CATALOG_CACHE_TTL_SECS` - Restaurant list cache TTL (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Foody client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every REST path is joined onto (always ends with `/`)
    pub api_base_url: Url,
    /// Location of the durable storage file
    pub storage_path: PathBuf,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
    /// How long restaurant listings stay cached
    pub catalog_cache_ttl: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base_url = lookup("FOODY_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("FOODY_API_BASE_URL".to_string()))?;
        let api_base_url = parse_base_url(&raw_base_url)?;

        let storage_path = lookup("FOODY_STORAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_storage_path, PathBuf::from);

        let http_timeout = Duration::from_secs(parse_secs(
            &lookup,
            "FOODY_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let catalog_cache_ttl = Duration::from_secs(parse_secs(
            &lookup,
            "FOODY_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);

        Ok(Self {
            api_base_url,
            storage_path,
            http_timeout,
            catalog_cache_ttl,
        })
    }

    /// Configuration pointing at `base_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            storage_path: default_storage_path(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, forcing a trailing slash so `Url::join` keeps any
/// path prefix (e.g. `https://host/api/`).
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&normalized).map_err(|e| {
        ConfigError::InvalidEnvVar("FOODY_API_BASE_URL".to_string(), e.to_string())
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "FOODY_API_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(url)
}

/// Parse an optional seconds value with a default.
fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |v| {
        v.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Default storage location in the platform data directory.
fn default_storage_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".foody").join("storage.json"),
        |dir| dir.join("foody").join("storage.json"),
    )
}
