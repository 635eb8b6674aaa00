//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHIRP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CHIRP_BASE_URL` - Public URL of the API
//!
//! ## Optional
//! - `CHIRP_HOST` - Bind address (default: 127.0.0.1)
//! - `CHIRP_PORT` - Listen port (default: 3000)
//! - `CHIRP_SMTP_HOST` / `CHIRP_SMTP_PORT` / `CHIRP_SMTP_USERNAME` /
//!   `CHIRP_SMTP_PASSWORD` / `CHIRP_SMTP_FROM` / `CHIRP_REPORTS_INBOX` -
//!   SMTP delivery for report notifications. The block is optional at
//!   startup; the reports endpoint rejects submissions with 500 when it is
//!   absent.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (0.0-1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API
    pub base_url: String,
    /// SMTP delivery configuration, absent when mail is not configured
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry tracing sample rate
    pub sentry_traces_sample_rate: f32,
}

/// SMTP configuration for outbound notifications.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// From address on outbound mail.
    pub from_address: String,
    /// Inbox that receives report notifications.
    pub reports_inbox: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("reports_inbox", &self.reports_inbox)
            .finish()
    }
}

impl ApiConfig {
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

        let database_url = get_database_url("CHIRP_DATABASE_URL")?;
        let host = get_env_or_default("CHIRP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHIRP_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("CHIRP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHIRP_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("CHIRP_BASE_URL")?;

        let email = EmailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            email,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    /// Load the SMTP block if `CHIRP_SMTP_HOST` is set, `None` otherwise.
    ///
    /// When the host is set, the remaining credentials become required so a
    /// half-configured mail service fails loudly at startup instead of at
    /// send time.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("CHIRP_SMTP_HOST") else {
            return Ok(None);
        };

        let smtp_port = get_env_or_default("CHIRP_SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHIRP_SMTP_PORT".to_owned(), e.to_string()))?;

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username: get_required_env("CHIRP_SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("CHIRP_SMTP_PASSWORD")?),
            from_address: get_required_env("CHIRP_SMTP_FROM")?,
            reports_inbox: get_required_env("CHIRP_REPORTS_INBOX")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a sample-rate variable, clamped to 0.0-1.0.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let rate = raw
                .parse::<f32>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
            Ok(rate.clamp(0.0, 1.0))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_owned(),
            smtp_port: 587,
            smtp_username: "mailer".to_owned(),
            smtp_password: SecretString::from("super_secret_password"),
            from_address: "noreply@chirp.app".to_owned(),
            reports_inbox: "reports@chirp.app".to_owned(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
