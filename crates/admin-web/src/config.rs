//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Admin server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Directory holding the persisted config and stats documents.
    pub data_dir: PathBuf,
    /// Directory of the prebuilt dashboard bundle.
    pub static_dir: PathBuf,
    /// WhatsApp bridge sidecar URL.
    pub bridge_url: String,
    /// Bridge session name, if the sidecar hosts several.
    pub bridge_session: Option<String>,
    /// Exchanges per sender kept as model context.
    pub context_turns: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `0.0.0.0:$PORT` |
    /// | `PORT` | Port used when `ADMIN_ADDR` is unset | `3001` |
    /// | `DATA_DIR` | Persistence directory | `.data` |
    /// | `STATIC_DIR` | Dashboard bundle | `dist` |
    /// | `WA_BRIDGE_URL` | WhatsApp bridge sidecar | `http://127.0.0.1:8080` |
    /// | `WA_BRIDGE_SESSION` | Bridge session name | (none) |
    /// | `CONTEXT_TURNS` | Per-sender history turns | `10` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = match env::var("ADMIN_ADDR") {
            Ok(addr) => addr,
            Err(_) => {
                let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
                format!("0.0.0.0:{}", port)
            }
        }
        .parse()
        .map_err(|_| ConfigError::InvalidAddr)?;

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| ".data".to_string());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "dist".to_string());

        let bridge_url =
            env::var("WA_BRIDGE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        let bridge_session = env::var("WA_BRIDGE_SESSION")
            .ok()
            .filter(|s| !s.is_empty());

        let context_turns = match env::var("CONTEXT_TURNS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidContextTurns)?,
            Err(_) => 10,
        };

        Ok(Self {
            addr,
            data_dir: data_dir.into(),
            static_dir: static_dir.into(),
            bridge_url,
            bridge_session,
            context_turns,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("CONTEXT_TURNS must be a non-negative integer")]
    InvalidContextTurns,
}
