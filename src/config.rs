use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_STORAGE_DIR: &str = "./uploads";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the administrator created on startup.
#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// HS256 signing key for access tokens.
    pub secret: String,
    /// Argon2 secret mixed into every password hash.
    pub password_pepper: String,
    pub token_ttl: chrono::Duration,
    /// Root directory of the local-disk object bucket.
    pub storage_dir: PathBuf,
    /// Base URL objects are served from, without a trailing slash.
    pub public_url: String,
    /// Where uploads are staged before they are shipped to storage.
    pub staging_dir: PathBuf,
    pub upload_timeout: Duration,
    pub audit_url: Option<String>,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        let upload_timeout_secs = parse_or("UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?;

        let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            secret: required("SECRET")?,
            password_pepper: required("PASSWORD_PEPPER")?,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
            storage_dir: optional("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            public_url: optional("PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            staging_dir: optional("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("shop-staging")),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            audit_url: optional("AUDIT_URL"),
            admin,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
