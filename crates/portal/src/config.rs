//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PORTAL_BASE_URL` - Public URL of the portal
//! - `IDENTITY_URL` - Base URL of the GoTrue-compatible identity provider
//! - `IDENTITY_ANON_KEY` - Public API key sent with every identity request
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 3000)
//! - `IDENTITY_TIMEOUT_SECS` - Identity request timeout (default: 10)
//! - `CAMPUS_MOCK_AUTH` - `true`/`1` skips all identity checks (local development only)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;

/// Substrings (lower-case) that mark a key as copied from a sample config.
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

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the portal
    pub base_url: String,
    /// Identity provider settings
    pub identity: IdentityConfig,
    /// Skip identity checks entirely. Never enable outside local development.
    pub mock_auth: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL, e.g. `https://auth.campus.example`
    pub url: Url,
    /// Anonymous API key sent as the `apikey` header
    pub anon_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, if
    /// the API key fails validation, or if `CAMPUS_MOCK_AUTH` holds anything
    /// other than an explicit boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: database_url()?,
            host: parse_or("PORTAL_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("PORTAL_PORT", DEFAULT_PORT)?,
            base_url: required("PORTAL_BASE_URL")?,
            identity: IdentityConfig::from_env()?,
            mock_auth: parse_mock_auth(optional("CAMPUS_MOCK_AUTH").as_deref())?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Address to bind the listener to.
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

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = required("IDENTITY_URL")?;
        let url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("IDENTITY_URL".to_owned(), e.to_string()))?;

        let anon_key = required("IDENTITY_ANON_KEY")?;
        check_secret(&anon_key, "IDENTITY_ANON_KEY")?;

        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
            timeout: Duration::from_secs(parse_or(
                "IDENTITY_TIMEOUT_SECS",
                DEFAULT_IDENTITY_TIMEOUT_SECS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Interpret the mock-auth flag. Only explicit values are accepted so a typo
/// cannot silently switch identity checks off (or leave them on unnoticed).
fn parse_mock_auth(raw: Option<&str>) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" => Ok(false),
        "true" | "1" => Ok(true),
        other => Err(ConfigError::InvalidEnvVar(
            "CAMPUS_MOCK_AUTH".to_string(),
            format!("expected true, false, 1 or 0 (got '{other}')"),
        )),
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `PORTAL_DATABASE_URL`, else the conventional `DATABASE_URL`.
fn database_url() -> Result<SecretString, ConfigError> {
    optional("PORTAL_DATABASE_URL")
        .or_else(|| optional("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("PORTAL_DATABASE_URL".to_owned()))
}

/// Parse `key` if set, otherwise use `default`.
fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    })
}

/// Shannon entropy of `s` in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: BTreeMap<char, u32> = BTreeMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / f64::from(total);
            -p * p.log2()
        })
        .sum()
}

/// Reject keys copied from sample configs or too repetitive to be real.
fn check_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("looks like a placeholder ('{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("{entropy:.2} bits/char, need at least {MIN_ENTROPY_BITS_PER_CHAR}"),
        ));
    }

    Ok(())
}
