use std::{env, path::PathBuf, str::FromStr};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;

/// Process-wide settings, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub secret: String,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub file_size_limit: usize,
    /// Prefix for issued image URLs, without a trailing slash.
    pub public_base_url: String,
    pub admin_username: String,
    pub admin_password: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            secret: required("SECRET")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            file_size_limit: parsed("FILE_SIZE_LIMIT")?.unwrap_or(DEFAULT_FILE_SIZE_LIMIT),
            public_base_url: optional("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            admin_username: optional("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }

    /// Public URL under which a stored image is served.
    pub fn image_url(&self, image_id: i32) -> String {
        format!("{}/api/image/{}", self.public_base_url, image_id)
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}
