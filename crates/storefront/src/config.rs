//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `STOREFRONT_API_URL` - Base URL of the remote storefront REST API
//! - `FIREBASE_API_KEY` - Identity provider web API key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_API_TIMEOUT_SECS` - Remote API request timeout (default: 10)
//! - `STOREFRONT_CATALOG_CACHE_SECS` - Catalog cache TTL, 0 disables (default: 60)
//! - `STOREFRONT_PAYMENT_VERIFY_DELAY_MS` - Wait before verifying a pending payment (default: 2000)
//! - `IDENTITY_ENDPOINT` - Identity provider REST base
//! - `IMAGE_HOSTING_KEY` - imgbb API key (product image upload disabled without it)
//! - `IMAGE_HOSTING_ENDPOINT` - imgbb upload endpoint
//! - `STORE_SUPPORT_EMAIL` - Support address printed on invoices
//! - `STORE_WEBSITE` - Website printed on invoices
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_IMAGE_HOSTING_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Remote storefront API settings
    pub api: ApiConfig,
    /// Identity provider settings
    pub identity: IdentityConfig,
    /// Product image hosting settings
    pub image_hosting: ImageHostingConfig,
    /// Contact details printed on invoices
    pub store: StoreDetails,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Remote storefront REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash (e.g. `http://localhost:5000`)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long catalog listings are cached; zero disables the cache
    pub catalog_cache_ttl: Duration,
    /// Delay before re-verifying a payment that is still pending
    pub payment_verify_delay: Duration,
}

/// Identity provider (Firebase Identity Toolkit) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// REST base, e.g. `https://identitytoolkit.googleapis.com/v1`
    pub endpoint: String,
    /// Web API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Image hosting (imgbb) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ImageHostingConfig {
    /// Upload endpoint
    pub endpoint: String,
    /// API key; uploads are disabled when absent
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for ImageHostingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHostingConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Store contact details.
#[derive(Debug, Clone)]
pub struct StoreDetails {
    pub support_email: String,
    pub website: String,
}

impl Default for StoreDetails {
    fn default() -> Self {
        Self {
            support_email: "support@gripsandgears.com".to_string(),
            website: "www.gripsandgears.com".to_string(),
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = trim_url(get_required_env("STOREFRONT_BASE_URL")?);
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            api: ApiConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            image_hosting: ImageHostingConfig::from_env(),
            store: StoreDetails::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    /// Load the remote API settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `STOREFRONT_API_URL` is missing or a
    /// numeric setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = trim_url(get_required_env("STOREFRONT_API_URL")?);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(parse_env("STOREFRONT_API_TIMEOUT_SECS", "10")?),
            catalog_cache_ttl: Duration::from_secs(parse_env(
                "STOREFRONT_CATALOG_CACHE_SECS",
                "60",
            )?),
            payment_verify_delay: Duration::from_millis(parse_env(
                "STOREFRONT_PAYMENT_VERIFY_DELAY_MS",
                "2000",
            )?),
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: trim_url(get_env_or_default(
                "IDENTITY_ENDPOINT",
                DEFAULT_IDENTITY_ENDPOINT,
            )),
            api_key: get_validated_secret("FIREBASE_API_KEY")?,
        })
    }
}

impl ImageHostingConfig {
    fn from_env() -> Self {
        Self {
            endpoint: get_env_or_default("IMAGE_HOSTING_ENDPOINT", DEFAULT_IMAGE_HOSTING_ENDPOINT),
            api_key: get_optional_env("IMAGE_HOSTING_KEY").map(SecretString::from),
        }
    }
}

impl StoreDetails {
    /// Load store contact details, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            support_email: get_optional_env("STORE_SUPPORT_EMAIL")
                .unwrap_or(defaults.support_email),
            website: get_optional_env("STORE_WEBSITE").unwrap_or(defaults.website),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable; empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
    let len = s.chars().count() as f64;
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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

/// Configuration used by unit tests; never touches the environment.
#[cfg(test)]
pub(crate) fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("k3J9!xQ2@pL7#vN4$wR8%tY1^zB6&mC0"),
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(200),
            catalog_cache_ttl: Duration::ZERO,
            payment_verify_delay: Duration::ZERO,
        },
        identity: IdentityConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: SecretString::from("AIzaSyD3kq9Xz8Lm2Pq7Rt5Vw1Yb4Nc6Hf0Jg"),
        },
        image_hosting: ImageHostingConfig {
            endpoint: DEFAULT_IMAGE_HOSTING_ENDPOINT.to_string(),
            api_key: None,
        },
        store: StoreDetails::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let mut config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());

        config.base_url = "https://gripsandgears.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("http://localhost:5000/".to_string()), "http://localhost:5000");
        assert_eq!(trim_url("http://localhost:5000".to_string()), "http://localhost:5000");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = test_config();
        let identity = format!("{:?}", config.identity);
        assert!(identity.contains("[REDACTED]"));
        assert!(!identity.contains("AIzaSy"));

        let hosting = ImageHostingConfig {
            endpoint: DEFAULT_IMAGE_HOSTING_ENDPOINT.to_string(),
            api_key: Some(SecretString::from("f00dfacecafe")),
        };
        let debug = format!("{hosting:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("f00dfacecafe"));
    }
}
