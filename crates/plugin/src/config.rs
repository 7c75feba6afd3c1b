//! Plugin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CASHIER_DOMAIN` - Cashier API domain (e.g., api.boldcommerce.com)
//! - `CASHIER_CLIENT_ID` - OAuth client ID issued to the plugin
//! - `CASHIER_CLIENT_SECRET` - OAuth client secret, also the webhook signing key
//! - `CASHIER_ACCESS_TOKEN` - Checkout access token for the shipping lines API
//! - `APP_URL` - Public base URL of this plugin, used for checkout callbacks
//!
//! ## Optional
//! - `CASHIER_API_BASE_URL` - Override for the API origin (default: `https://{CASHIER_DOMAIN}`)
//! - `PLUGIN_HOST` - Bind address (default: 127.0.0.1)
//! - `PLUGIN_PORT` - Listen port (default: 3000)
//! - `PICKUP_MARKER` - Line item title marker for pick-up orders (default: `pick up`)
//! - `PICKUP_ORIGIN_LATITUDE` / `PICKUP_ORIGIN_LONGITUDE` - Pickup search origin (default: downtown Austin)
//! - `PICKUP_RADIUS_METERS` - Pickup search radius (default: 100000)
//! - `LOCATION_PROVIDER_URL` - Location lookup endpoint
//! - `LOCATION_ACCESS_TOKEN` - Location provider app token
//! - `DEFAULT_PICKUP_ADDRESS` - JSON store address sent for pick-up orders
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout for every outbound call (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use cashier_bopis_core::{DEFAULT_PICKUP_MARKER, PickupAddress};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Default pickup search origin (downtown Austin, TX).
const DEFAULT_ORIGIN_LATITUDE: &str = "30.268466";
const DEFAULT_ORIGIN_LONGITUDE: &str = "-97.742811";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Plugin application configuration.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the plugin
    pub app_url: Url,
    /// Cashier API configuration
    pub cashier: CashierConfig,
    /// Pick-up order configuration
    pub pickup: PickupConfig,
    /// Timeout applied to every outbound request
    pub upstream_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production)
    pub sentry_environment: Option<String>,
}

/// Cashier API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CashierConfig {
    /// Cashier domain used for browser redirects
    pub domain: String,
    /// Origin for server-to-server API calls
    pub api_base_url: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (also signs inbound requests)
    pub client_secret: SecretString,
    /// Checkout access token for the shipping lines API
    pub access_token: SecretString,
}

impl std::fmt::Debug for CashierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CashierConfig")
            .field("domain", &self.domain)
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Pick-up order configuration.
#[derive(Clone)]
pub struct PickupConfig {
    /// Title substring that marks a line item for pick up
    pub marker: String,
    /// Latitude of the location search origin
    pub origin_latitude: f64,
    /// Longitude of the location search origin
    pub origin_longitude: f64,
    /// Location search radius in meters
    pub radius_meters: u32,
    /// Location lookup endpoint
    pub location_provider_url: Url,
    /// App token for the location provider
    pub location_access_token: Option<SecretString>,
    /// Store address substituted into checkout for pick-up orders
    pub default_address: PickupAddress,
}

impl std::fmt::Debug for PickupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickupConfig")
            .field("marker", &self.marker)
            .field("origin_latitude", &self.origin_latitude)
            .field("origin_longitude", &self.origin_longitude)
            .field("radius_meters", &self.radius_meters)
            .field("location_provider_url", &self.location_provider_url.as_str())
            .field(
                "location_access_token",
                &self.location_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_address", &self.default_address)
            .finish()
    }
}

impl PluginConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`PluginConfig::from_env`].
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_env(vars, "PLUGIN_HOST", "127.0.0.1")?;
        let port = parse_env(vars, "PLUGIN_PORT", "3000")?;
        let app_url = parse_url("APP_URL", &get_required_env(vars, "APP_URL")?)?;
        let timeout_secs: u64 = parse_env(vars, "UPSTREAM_TIMEOUT_SECS", "10")?;

        Ok(Self {
            host,
            port,
            app_url,
            cashier: CashierConfig::from_vars(vars)?,
            pickup: PickupConfig::from_vars(vars)?,
            upstream_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: vars("SENTRY_DSN"),
            sentry_environment: vars("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// URL checkout calls back for shipping rate overrides.
    #[must_use]
    pub fn shipping_callback_url(&self) -> String {
        format!("{}/shipping", self.app_url.as_str().trim_end_matches('/'))
    }
}

impl CashierConfig {
    fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let domain = get_required_env(vars, "CASHIER_DOMAIN")?;
        let api_base_url = vars("CASHIER_API_BASE_URL")
            .unwrap_or_else(|| format!("https://{domain}"))
            .trim_end_matches('/')
            .to_string();
        parse_url("CASHIER_API_BASE_URL", &api_base_url)?;

        Ok(Self {
            domain,
            api_base_url,
            client_id: get_required_env(vars, "CASHIER_CLIENT_ID")?,
            client_secret: get_validated_secret(vars, "CASHIER_CLIENT_SECRET")?,
            access_token: get_validated_secret(vars, "CASHIER_ACCESS_TOKEN")?,
        })
    }
}

impl PickupConfig {
    fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let location_provider_url = parse_url(
            "LOCATION_PROVIDER_URL",
            &get_env_or_default(
                vars,
                "LOCATION_PROVIDER_URL",
                "https://data.nasa.gov/resource/gh4g-9sfh.json",
            ),
        )?;

        let default_address = match vars("DEFAULT_PICKUP_ADDRESS") {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                ConfigError::InvalidEnvVar("DEFAULT_PICKUP_ADDRESS".to_string(), e.to_string())
            })?,
            None => PickupAddress::default(),
        };

        Ok(Self {
            marker: get_env_or_default(vars, "PICKUP_MARKER", DEFAULT_PICKUP_MARKER),
            origin_latitude: parse_env(vars, "PICKUP_ORIGIN_LATITUDE", DEFAULT_ORIGIN_LATITUDE)?,
            origin_longitude: parse_env(
                vars,
                "PICKUP_ORIGIN_LONGITUDE",
                DEFAULT_ORIGIN_LONGITUDE,
            )?,
            radius_meters: parse_env(vars, "PICKUP_RADIUS_METERS", "100000")?,
            location_provider_url,
            location_access_token: vars("LOCATION_ACCESS_TOKEN").map(SecretString::from),
            default_address,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(vars: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    vars(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(vars: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    vars(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env<T>(
    vars: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(vars, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a URL value, naming `key` in the error.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the value issued by Cashier."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(
    vars: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required_env(vars, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
