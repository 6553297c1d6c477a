//! # configs
//!
//! Layered configuration: an optional `config/warden.toml` file, overridden
//! by `WARDEN__`-prefixed environment variables (`WARDEN__AUTH__SECRET_KEY`,
//! `WARDEN__ADMISSION__LOGIN_ATTEMPTS_PER_MINUTE`, ...). The admission
//! ceiling, window, and trusted-key allow-list are deliberately explicit
//! settings rather than baked-in constants.

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admission: AdmissionSettings,
    /// Optional identity inserted before the server accepts traffic.
    /// Deployment bootstrap only; normal provisioning goes through
    /// `cmd/seed`.
    #[serde(default)]
    pub bootstrap: Option<BootstrapAdmin>,
    #[cfg(feature = "db-postgres")]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    /// Argon2 PHC string produced by `cmd/seed`.
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Only honor X-Forwarded-For / X-Real-IP when explicitly deployed
    /// behind a proxy that strips client-supplied values.
    #[serde(default)]
    pub trust_proxy_headers: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            trust_proxy_headers: false,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Process-wide token signing secret.
    pub secret_key: SecretString,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdmissionSettings {
    #[serde(default = "default_ceiling")]
    pub login_attempts_per_minute: u32,
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Client keys that bypass the login throttle (operational callers).
    #[serde(default)]
    pub trusted_keys: Vec<String>,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            login_attempts_per_minute: default_ceiling(),
            window_seconds: default_window(),
            trusted_keys: Vec::new(),
        }
    }
}

#[cfg(feature = "db-postgres")]
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: SecretString,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_token_ttl() -> i64 {
    30
}

fn default_ceiling() -> u32 {
    5
}

fn default_window() -> u64 {
    60
}

#[cfg(feature = "db-postgres")]
fn default_max_connections() -> u32 {
    5
}

/// Loads configuration from the optional file plus environment overrides.
pub fn load() -> Result<AppConfig, ConfigsError> {
    dotenvy::dotenv().ok();
    let config = Config::builder()
        .add_source(File::with_name("config/warden").required(false))
        .add_source(Environment::with_prefix("WARDEN").separator("__"))
        .build()?
        .try_deserialize()?;
    debug!("configuration loaded");
    Ok(config)
}

/// Parses configuration from a TOML string; the file-less path used by
/// tests and embedded setups.
pub fn from_toml(toml: &str) -> Result<AppConfig, ConfigsError> {
    Ok(Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?)
}
