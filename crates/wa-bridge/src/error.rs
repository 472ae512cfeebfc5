//! Error types for wa-bridge.

use thiserror::Error;
use zap_core::TransportError;

/// Errors that can occur when talking to the bridge sidecar.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON-RPC error response from the bridge.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// Connection to the bridge failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Bridge health check failed.
    #[error("Health check failed")]
    HealthCheckFailed,

    /// SSE stream error.
    #[error("SSE error: {0}")]
    Sse(String),
}

impl From<BridgeError> for TransportError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::HealthCheckFailed => TransportError::NotConnected,
            other => TransportError::RequestFailed(other.to_string()),
        }
    }
}
