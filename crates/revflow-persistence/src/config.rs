//! Connection settings from environment variables.
//! Follows the `DATABASE_URL` convention plus optional pool sizes.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// Load .env once, lazily.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // a missing .env is fine
});

pub const DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").map_err(|_| PersistenceError::Config("DATABASE_URL is not set".into()))?;
        let min_connections = env::var("DATABASE_MIN_CONNECTIONS").ok()
                                                                  .and_then(|v| v.parse().ok())
                                                                  .unwrap_or(DEFAULT_MIN_CONNECTIONS);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS").ok()
                                                                  .and_then(|v| v.parse().ok())
                                                                  .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Ok(Self { url,
                  min_connections,
                  max_connections })
    }

    /// `Some` when `DATABASE_URL` is configured, `None` otherwise.
    pub fn from_env_optional() -> Option<Self> {
        Self::from_env().ok()
    }
}

/// Forces the `.env` load early; for binaries that read other variables.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
