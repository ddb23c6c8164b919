// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use dotenvy::dotenv;
use thiserror::Error;
use url::Url;

/// Default payment gateway confirm endpoint.
pub const DEFAULT_PAYMENT_CONFIRM_URL: &str = "https://api.tosspayments.com/v1/payments/confirm";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    /// Uploaded images and attachments, served under `/uploads`.
    pub upload_dir: PathBuf,
    /// Seeded on startup when both are present.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub payment: PaymentConfig,
}

/// Credentials and endpoint for the payment gateway.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub confirm_url: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = parsed("JWT_EXPIRATION", 86_400)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let payment = PaymentConfig {
            secret_key: required("PAYMENT_SECRET_KEY")?,
            confirm_url: confirm_url()?,
            timeout_secs: parsed("PAYMENT_TIMEOUT_SECS", 30)?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            cors_origins,
            upload_dir,
            admin_email,
            admin_password,
            payment,
        })
    }

    /// True when the in-memory store was requested instead of Postgres.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn confirm_url() -> Result<String, ConfigError> {
    let raw = env::var("PAYMENT_CONFIRM_URL")
        .unwrap_or_else(|_| DEFAULT_PAYMENT_CONFIRM_URL.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name: "PAYMENT_CONFIRM_URL",
        reason: e.to_string(),
    })?;
    Ok(raw)
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
