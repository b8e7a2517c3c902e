//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `CARTIFY_STORAGE_PATH` - JSON file backing persisted storage (default: in-memory)
//! - `CARTIFY_SEARCH_DEBOUNCE_MS` - Search debounce window (default: 500)
//! - `CARTIFY_LIMIT_NOTICE_MS` - How long the quantity-limit notice stays up (default: 3000)
//! - `CARTIFY_MAX_ITEM_QUANTITY` - Per-product quantity cap (default: 6)
//! - `CARTIFY_LANDING_ROUTE` - Where logout lands (default: /dashboard)
//! - `CARTIFY_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::router::routes;

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_LIMIT_NOTICE_MS: u64 = 3000;
const DEFAULT_MAX_ITEM_QUANTITY: u32 = 6;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json' (got {other:?})")),
        }
    }
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// File backing persisted storage; in-memory when `None`
    pub storage_path: Option<PathBuf>,
    /// Quiet period before a search is dispatched
    pub search_debounce: Duration,
    /// Lifetime of the quantity-limit notice
    pub limit_notice: Duration,
    /// Maximum quantity of one product admitted through a product card
    pub max_item_quantity: u32,
    /// Landing route after logout
    pub landing_route: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            limit_notice: Duration::from_millis(DEFAULT_LIMIT_NOTICE_MS),
            max_item_quantity: DEFAULT_MAX_ITEM_QUANTITY,
            landing_route: routes::DASHBOARD.to_string(),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let search_debounce = Duration::from_millis(parse_or_default(
            &lookup,
            "CARTIFY_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let limit_notice = Duration::from_millis(parse_or_default(
            &lookup,
            "CARTIFY_LIMIT_NOTICE_MS",
            DEFAULT_LIMIT_NOTICE_MS,
        )?);

        let max_item_quantity = parse_or_default(
            &lookup,
            "CARTIFY_MAX_ITEM_QUANTITY",
            DEFAULT_MAX_ITEM_QUANTITY,
        )?;
        if max_item_quantity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CARTIFY_MAX_ITEM_QUANTITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let landing_route =
            lookup("CARTIFY_LANDING_ROUTE").unwrap_or_else(|| routes::DASHBOARD.to_string());
        if !landing_route.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "CARTIFY_LANDING_ROUTE".to_string(),
                format!("must start with '/' (got {landing_route:?})"),
            ));
        }

        Ok(Self {
            storage_path: non_empty(&lookup, "CARTIFY_STORAGE_PATH").map(PathBuf::from),
            search_debounce,
            limit_notice,
            max_item_quantity,
            landing_route,
            log_format: parse_or_default(&lookup, "CARTIFY_LOG_FORMAT", LogFormat::Pretty)?,
            sentry_dsn: non_empty(&lookup, "SENTRY_DSN"),
            sentry_environment: non_empty(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating empty values as unset.
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
