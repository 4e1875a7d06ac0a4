//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VTEX_ACCOUNT` - Platform account name (e.g., `mystore`)
//! - `VTEX_APP_KEY` - App key used for checkout and GraphQL calls
//! - `VTEX_APP_TOKEN` - App token paired with the key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `VTEX_WORKSPACE` - Platform workspace (default: master)
//! - `VTEX_GRAPHQL_URL` - GraphQL endpoint override
//! - `VTEX_CHECKOUT_URL` - Checkout API base URL override
//! - `VTEX_REQUEST_TIMEOUT_SECS` - Upstream request timeout (default: 10)
//! - `SELECTOR_CHANNEL_UPDATE_MODE` - `block` or `detach` (default: block)
//! - `SELECTOR_MISSING_ROUTE` - `canonical-root` or `reject` (default: canonical-root)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::selector::{ChannelUpdateMode, MissingRoutePolicy, SelectorOptions};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Platform API configuration
    pub vtex: VtexConfig,
    /// Binding selector behavior
    pub selector: SelectorOptions,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Platform API configuration.
///
/// Implements `Debug` manually to redact the app token.
#[derive(Clone)]
pub struct VtexConfig {
    /// Account name
    pub account: String,
    /// Workspace name
    pub workspace: String,
    /// App key sent as `X-VTEX-API-AppKey`
    pub app_key: String,
    /// App token sent as `X-VTEX-API-AppToken`
    pub app_token: SecretString,
    /// GraphQL endpoint
    pub graphql_url: String,
    /// Checkout API base URL
    pub checkout_url: String,
    /// Timeout applied to every upstream request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for VtexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VtexConfig")
            .field("account", &self.account)
            .field("workspace", &self.workspace)
            .field("app_key", &self.app_key)
            .field("app_token", &"[REDACTED]")
            .field("graphql_url", &self.graphql_url)
            .field("checkout_url", &self.checkout_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the app token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let vtex = VtexConfig::from_env()?;
        let selector = selector_options_from_env()?;

        Ok(Self {
            host,
            port,
            vtex,
            selector,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl VtexConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let account = get_required_env("VTEX_ACCOUNT")?;
        let workspace = get_env_or_default("VTEX_WORKSPACE", "master");
        let timeout_secs = get_env_or_default("VTEX_REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VTEX_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let graphql_url = get_optional_env("VTEX_GRAPHQL_URL")
            .unwrap_or_else(|| default_graphql_url(&account, &workspace));
        let checkout_url = get_optional_env("VTEX_CHECKOUT_URL")
            .unwrap_or_else(|| default_checkout_url(&account));

        Ok(Self {
            account,
            workspace,
            app_key: get_required_env("VTEX_APP_KEY")?,
            app_token: get_validated_secret("VTEX_APP_TOKEN")?,
            graphql_url,
            checkout_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// GraphQL gateway of a workspace. The master workspace has no prefix.
fn default_graphql_url(account: &str, workspace: &str) -> String {
    if workspace == "master" {
        format!("https://{account}.myvtex.com/_v/private/graphql/v1")
    } else {
        format!("https://{workspace}--{account}.myvtex.com/_v/private/graphql/v1")
    }
}

fn default_checkout_url(account: &str) -> String {
    format!("https://{account}.vtexcommercestable.com.br")
}

fn selector_options_from_env() -> Result<SelectorOptions, ConfigError> {
    let channel_update = get_env_or_default("SELECTOR_CHANNEL_UPDATE_MODE", "block")
        .parse::<ChannelUpdateMode>()
        .map_err(|e| ConfigError::InvalidEnvVar("SELECTOR_CHANNEL_UPDATE_MODE".to_string(), e))?;
    let missing_route = get_env_or_default("SELECTOR_MISSING_ROUTE", "canonical-root")
        .parse::<MissingRoutePolicy>()
        .map_err(|e| ConfigError::InvalidEnvVar("SELECTOR_MISSING_ROUTE".to_string(), e))?;

    Ok(SelectorOptions {
        channel_update,
        missing_route,
    })
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
            #[allow(clippy::cast_precision_loss)]
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
