use anyhow::{Context, Result};

use crate::profile::validation::UploadLimits;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_limits: UploadLimits,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_limits: upload_limits_from_env()?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn upload_limits(&self) -> UploadLimits {
        self.upload_limits
    }
}

fn upload_limits_from_env() -> Result<UploadLimits> {
    let image_mb: u64 = parse_env("MAX_IMAGE_MB", 5)?;
    let certificate_mb: u64 = parse_env("MAX_CERTIFICATE_MB", 10)?;
    checked_upload_limits(image_mb, certificate_mb)
}

fn checked_upload_limits(image_mb: u64, certificate_mb: u64) -> Result<UploadLimits> {
    UploadLimits::from_megabytes(image_mb, certificate_mb).with_context(|| {
        format!(
            "MAX_IMAGE_MB ({image_mb}) or MAX_CERTIFICATE_MB ({certificate_mb}) is too large"
        )
    })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
