use std::env;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const MIN_JWT_SECRET_LEN: usize = 32;
const DEV_JWT_SECRET: &str = "dev-secret-key-do-not-use-in-production";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long, got {0}")]
    WeakJwtSecret(usize),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment, after loading `.env`
    /// if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let development = lookup("APP_ENV").as_deref() == Some("development");
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                return Err(ConfigError::WeakJwtSecret(secret.len()));
            }
            Some(secret) => secret,
            None if development => {
                warn!("JWT_SECRET not set, using the development key");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.is_empty());

        Ok(Config {
            database_url,
            bind_addr,
            jwt_secret,
            db_max_connections,
            cors_allowed_origin,
        })
    }
}
