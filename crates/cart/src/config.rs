//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_API_URL` - Base URL of the stock/catalog API (default: `http://localhost:3333`)
//! - `CART_API_TOKEN` - Bearer token sent to the API
//! - `CART_STORAGE_DIR` - Directory for the persisted cart (default: `.rocket-cart`)
//! - `CART_LOOKUP_TIMEOUT_SECS` - Timeout for each stock/catalog lookup (default: 10)
//! - `CART_CATALOG_CACHE_TTL_SECS` - How long catalog records are cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::store::CartStoreOptions;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocket-cart";
const DEFAULT_LOOKUP_TIMEOUT_SECS: &str = "10";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Stock and catalog API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted cart
    pub storage_dir: PathBuf,
    /// Upper bound on each stock/catalog lookup
    pub lookup_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stock and catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; `stock/{id}` and `products/{id}` are resolved against it
    pub base_url: Url,
    /// Bearer token, if the API requires one
    pub token: Option<SecretString>,
    /// Time-to-live for cached catalog records
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api = ApiConfig {
            base_url: parse_base_url(&env.or_default("CART_API_URL", DEFAULT_API_URL))?,
            token: env.optional("CART_API_TOKEN").map(SecretString::from),
            catalog_cache_ttl: env.seconds(
                "CART_CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?,
        };

        let lookup_timeout = env.seconds("CART_LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;
        if lookup_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_LOOKUP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api,
            storage_dir: PathBuf::from(env.or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            lookup_timeout,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }

    /// Options for a [`CartStore`](crate::CartStore) built from this config.
    #[must_use]
    pub fn store_options(&self) -> CartStoreOptions {
        CartStoreOptions {
            lookup_timeout: self.lookup_timeout,
            ..CartStoreOptions::default()
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating an empty value as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        self.or_default(key, default)
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse the API base URL, requiring http(s).
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CART_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage_dir, PathBuf::from(".rocket-cart"));
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_URL", "https://api.example.com/v1/"),
            ("CART_API_TOKEN", "tok_9f8e7d"),
            ("CART_STORAGE_DIR", "/var/lib/cart"),
            ("CART_LOOKUP_TIMEOUT_SECS", "3"),
            ("CART_CATALOG_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            config.api.token.as_ref().unwrap().expose_secret(),
            "tok_9f8e7d"
        );
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/cart"));
        assert_eq!(config.lookup_timeout, Duration::from_secs(3));
        assert_eq!(config.api.catalog_cache_ttl, Duration::ZERO);
        assert_eq!(config.store_options().lookup_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        let config = load(&[("CART_API_URL", "  ")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("CART_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_API_URL"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(load(&[("CART_API_URL", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("CART_LOOKUP_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("CART_LOOKUP_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = load(&[("CART_API_TOKEN", "super_secret_api_token")]).unwrap();
        let debug_output = format!("{:?}", config.api);

        assert!(debug_output.contains("localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}
