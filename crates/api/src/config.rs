//! Application configuration loaded from environment variables.

use std::time::Duration;

use payments::CheckoutConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string; the in-memory store
///   is used when unset
/// - `CHECKOUT_SUCCESS_URL` / `CHECKOUT_CANCEL_URL` — provider redirect
///   targets after checkout
/// - `GATEWAY_TIMEOUT_MS` — payment gateway deadline (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    pub gateway_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let checkout = CheckoutConfig::default();
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            checkout_success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or(checkout.success_url),
            checkout_cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or(checkout.cancel_url),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(5000),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the checkout flow configuration.
    pub fn checkout(&self) -> CheckoutConfig {
        CheckoutConfig {
            success_url: self.checkout_success_url.clone(),
            cancel_url: self.checkout_cancel_url.clone(),
            gateway_timeout: Duration::from_millis(self.gateway_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let checkout = CheckoutConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            checkout_success_url: checkout.success_url,
            checkout_cancel_url: checkout.cancel_url,
            gateway_timeout_ms: 5000,
        }
    }
}
