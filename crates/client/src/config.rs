//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIFFIN_API_BASE_URL` - Base URL of the Tiffin REST API
//!
//! ## Optional
//! - `TIFFIN_CART_PATH` - Path of the persisted cart snapshot
//!   (default: `.tiffin/cart.json`)
//! - `TIFFIN_CHECKOUT_RETURN_URL` - URL the payment provider redirects back
//!   to after checkout

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default location of the persisted cart snapshot.
const DEFAULT_CART_PATH: &str = ".tiffin/cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Tiffin REST API.
    pub api_base_url: Url,
    /// Path of the persisted cart snapshot.
    pub cart_path: PathBuf,
    /// URL the payment provider redirects back to after checkout.
    pub checkout_return_url: Option<Url>,
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

        let api_base_url = parse_url(&get_required_env("TIFFIN_API_BASE_URL")?, "TIFFIN_API_BASE_URL")?;
        let cart_path = PathBuf::from(get_env_or_default("TIFFIN_CART_PATH", DEFAULT_CART_PATH));
        let checkout_return_url = get_optional_env("TIFFIN_CHECKOUT_RETURN_URL")
            .map(|v| parse_url(&v, "TIFFIN_CHECKOUT_RETURN_URL"))
            .transpose()?;

        Ok(Self {
            api_base_url,
            cart_path,
            checkout_return_url,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a URL, reporting the offending variable on failure.
fn parse_url(value: &str, var_name: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}
