//! Configuration management for the client engine.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults suit the hosted backend:
//! - `WAFFLE_API_BASE_URL` - Base URL of the ordering backend (default: `https://api.greatindianwaffle.com`)
//! - `WAFFLE_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout in seconds (default: 10)
//! - `WAFFLE_STATE_DIR` - Directory for persisted client state (default: `.waffle-state`)
//! - `WAFFLE_TAX_RATE` - Tax rate applied to the cart subtotal (default: 0.05)
//! - `WAFFLE_DELIVERY_FEE` - Delivery fee in whole rupees (default: 30)
//! - `WAFFLE_MENU_CACHE_TTL_SECS` - Menu cache TTL in seconds (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use great_indian_waffle_core::Price;

const DEFAULT_API_BASE_URL: &str = "https://api.greatindianwaffle.com";
const DEFAULT_STATE_DIR: &str = ".waffle-state";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DELIVERY_FEE_RUPEES: i64 = 30;
const DEFAULT_MENU_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the ordering backend
    pub api_base_url: Url,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Directory holding the persisted client state
    pub state_dir: PathBuf,
    /// Tax rate applied to the cart subtotal (0.05 means 5%)
    pub tax_rate: Decimal,
    /// Flat fee added to delivery orders
    pub delivery_fee: Price,
    /// How long menu responses stay cached
    pub menu_cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present. Every variable has a
    /// default, so an empty environment is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] when a variable is set but
    /// cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_base_url = get_env_or_default("WAFFLE_API_BASE_URL", DEFAULT_API_BASE_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WAFFLE_API_BASE_URL".to_string(), e.to_string())
            })?;

        let request_timeout = get_env_or_default(
            "WAFFLE_REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("WAFFLE_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let state_dir = PathBuf::from(get_env_or_default("WAFFLE_STATE_DIR", DEFAULT_STATE_DIR));

        let tax_rate = match get_optional_env("WAFFLE_TAX_RATE") {
            Some(raw) => parse_tax_rate(&raw)
                .map_err(|reason| ConfigError::InvalidEnvVar("WAFFLE_TAX_RATE".to_string(), reason))?,
            None => default_tax_rate(),
        };

        let delivery_fee = match get_optional_env("WAFFLE_DELIVERY_FEE") {
            Some(raw) => parse_delivery_fee(&raw).map_err(|reason| {
                ConfigError::InvalidEnvVar("WAFFLE_DELIVERY_FEE".to_string(), reason)
            })?,
            None => Price::from_rupees(DEFAULT_DELIVERY_FEE_RUPEES),
        };

        let menu_cache_ttl = get_env_or_default(
            "WAFFLE_MENU_CACHE_TTL_SECS",
            &DEFAULT_MENU_CACHE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("WAFFLE_MENU_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            request_timeout,
            state_dir,
            tax_rate,
            delivery_fee,
            menu_cache_ttl,
        })
    }

    /// Configuration pointing at a specific backend, defaults everywhere else.
    ///
    /// Meant for tests and local development against a non-production backend.
    #[must_use]
    pub fn with_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            tax_rate: default_tax_rate(),
            delivery_fee: Price::from_rupees(DEFAULT_DELIVERY_FEE_RUPEES),
            menu_cache_ttl: Duration::from_secs(DEFAULT_MENU_CACHE_TTL_SECS),
        }
    }
}

fn default_tax_rate() -> Decimal {
    // 5% GST on prepared food
    Decimal::new(5, 2)
}

fn parse_tax_rate(raw: &str) -> Result<Decimal, String> {
    let rate = raw.parse::<Decimal>().map_err(|e| e.to_string())?;
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(format!("tax rate {rate} must be at least 0 and below 1"));
    }
    Ok(rate)
}

fn parse_delivery_fee(raw: &str) -> Result<Price, String> {
    let rupees = raw.parse::<i64>().map_err(|e| e.to_string())?;
    if rupees < 0 {
        return Err(format!("delivery fee {rupees} must not be negative"));
    }
    Ok(Price::from_rupees(rupees))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_parses() {
        let url = DEFAULT_API_BASE_URL.parse::<Url>().unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_parse_tax_rate_accepts_percentages() {
        assert_eq!(parse_tax_rate("0.05").unwrap(), Decimal::new(5, 2));
        assert_eq!(parse_tax_rate("0.18").unwrap(), Decimal::new(18, 2));
        assert_eq!(parse_tax_rate("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_tax_rate_rejects_out_of_range() {
        assert!(parse_tax_rate("1").is_err());
        assert!(parse_tax_rate("1.5").is_err());
        assert!(parse_tax_rate("-0.05").is_err());
        assert!(parse_tax_rate("five percent").is_err());
    }

    #[test]
    fn test_parse_delivery_fee_rejects_negative() {
        assert_eq!(parse_delivery_fee("30").unwrap(), Price::from_rupees(30));
        assert_eq!(parse_delivery_fee("0").unwrap(), Price::ZERO);
        assert!(parse_delivery_fee("-1").is_err());
    }

    #[test]
    fn test_with_base_url_keeps_defaults() {
        let config = AppConfig::with_base_url("http://127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.delivery_fee, Price::from_rupees(30));
        assert_eq!(config.tax_rate, Decimal::new(5, 2));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.menu_cache_ttl, Duration::from_secs(300));
    }
}
