/// Configuration management for Post Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// HTTP surface settings
    pub http: HttpConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Bearer token configuration
    pub auth: AuthConfig,
    /// Image storage configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Comma separated origins, or `*`
    pub allowed_origins: String,
    /// Largest accepted JSON body in bytes
    #[serde(default = "default_json_limit_bytes")]
    pub json_limit_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Bearer token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity service
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

/// Image storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// S3 bucket; uploads are refused when unset
    pub bucket: Option<String>,
    /// Base URL the bucket is served from
    pub public_base_url: String,
    /// Key prefix for post images
    pub key_prefix: String,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_json_limit_bytes() -> usize {
    5 * 1024 * 1024
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let app_env = var_or("APP_ENV", "development");
        let production = app_env.eq_ignore_ascii_case("production");
        let app = AppConfig {
            host: var_or("APP_HOST", "0.0.0.0"),
            http_port: parse_or(&lookup, "PORT", 8085)?,
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            env: app_env,
        };

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => value,
            None if production => bail!("CORS_ALLOWED_ORIGINS must be set in production"),
            None => "*".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
        }
        let http = HttpConfig {
            allowed_origins,
            json_limit_bytes: parse_or(&lookup, "MAX_JSON_BYTES", default_json_limit_bytes())?,
        };

        let database = DatabaseConfig {
            url: var_or("DATABASE_URL", "postgresql://localhost/nova"),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", default_min_connections())?,
            acquire_timeout_secs: parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                default_acquire_timeout_secs(),
            )?,
        };

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET environment variable not set")?;
        if jwt_secret.len() < crate::middleware::MIN_SECRET_LEN {
            bail!(
                "JWT_SECRET must be at least {} bytes",
                crate::middleware::MIN_SECRET_LEN
            );
        }

        let bucket = lookup("MEDIA_BUCKET").filter(|b| !b.trim().is_empty());
        let public_base_url = match lookup("MEDIA_PUBLIC_BASE_URL") {
            Some(url) => url,
            None => match &bucket {
                Some(bucket) => format!("https://{bucket}.s3.amazonaws.com"),
                None => String::new(),
            },
        };
        let media = MediaConfig {
            bucket,
            public_base_url,
            key_prefix: var_or("MEDIA_KEY_PREFIX", "posts"),
        };

        Ok(Config {
            app,
            http,
            database,
            auth: AuthConfig { jwt_secret },
            media,
        })
    }
}

/// A set but unparseable value is an error, not a silent default
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
