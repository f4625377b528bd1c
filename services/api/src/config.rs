//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Outbound mail settings. Mail is disabled unless both host and sender are set.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub from_address: Option<String>,
    pub from_name: String,
}

/// The operator-seeded first admin.
#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub subject: String,
    pub email: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub mail: MailConfig,
    pub notify_timeout: Duration,
    pub image_upload_url: String,
    pub image_api_key: Option<String>,
    pub max_upload_bytes: usize,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Mail Settings ---
        let mail = MailConfig {
            smtp_host: optional_var("SMTP_HOST"),
            smtp_port: parse_var("SMTP_PORT", "587")?,
            smtp_username: optional_var("SMTP_USERNAME"),
            smtp_password: optional_var("SMTP_PASSWORD"),
            smtp_tls: parse_var("SMTP_TLS", "true")?,
            from_address: optional_var("MAIL_FROM_ADDRESS"),
            from_name: std::env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Course Success".to_string()),
        };
        let notify_timeout = Duration::from_secs(parse_var("NOTIFY_TIMEOUT_SECS", "10")?);

        // --- Load Image Host Settings ---
        let image_upload_url = std::env::var("IMAGE_UPLOAD_URL")
            .unwrap_or_else(|_| "https://api.imgbb.com/1/upload".to_string());
        let image_api_key = optional_var("IMAGE_API_KEY");
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", "10485760")?;

        let bootstrap_admin = match (
            optional_var("BOOTSTRAP_ADMIN_SUBJECT"),
            optional_var("BOOTSTRAP_ADMIN_EMAIL"),
        ) {
            (Some(subject), Some(email)) => Some(BootstrapAdmin { subject, email }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "BOOTSTRAP_ADMIN_SUBJECT".to_string(),
                    "BOOTSTRAP_ADMIN_SUBJECT and BOOTSTRAP_ADMIN_EMAIL must be set together"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            mail,
            notify_timeout,
            image_upload_url,
            image_api_key,
            max_upload_bytes,
            bootstrap_admin,
        })
    }

    /// `memory://` selects the in-process store instead of PostgreSQL.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

/// Unset and blank variables both read as `None`.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
