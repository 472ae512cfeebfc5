//! Error types for the model and transport seams.

use thiserror::Error;

/// Errors that can occur while generating a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// The model answered without any text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Network, SDK or provider API failure.
    #[error("model request failed: {0}")]
    TransportFailure(String),

    /// No model is configured (e.g. missing credentials).
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the WhatsApp transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The session is not connected.
    #[error("transport not connected")]
    NotConnected,

    /// The transport rejected or failed the request.
    #[error("transport request failed: {0}")]
    RequestFailed(String),
}
