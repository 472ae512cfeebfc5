//! The WhatsApp session collaborator seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::message::{InboundMessage, ReplyTarget};

/// Events emitted by the transport session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A new pairing code is available.
    Qr(String),
    /// The session is authenticated and syncing.
    Authenticated,
    /// The session is connected and ready to send.
    Ready,
    /// The session was lost.
    Disconnected(String),
    /// A message was received.
    Message(InboundMessage),
}

/// Trait for driving the WhatsApp session and sending replies.
///
/// Abstracted to support different transports (bridge sidecar, tests, etc.)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Show the "composing" presence in a chat.
    async fn send_typing(&self, chat_id: &str) -> Result<(), TransportError>;

    /// Clear the presence state in a chat.
    async fn clear_state(&self, chat_id: &str) -> Result<(), TransportError>;

    /// Reply to a message, quoting it.
    async fn reply(&self, target: &ReplyTarget, text: &str) -> Result<(), TransportError>;

    /// Start (or restart) the session.
    async fn initialize(&self) -> Result<(), TransportError>;

    /// Tear down the session without logging out.
    async fn destroy(&self) -> Result<(), TransportError>;

    /// Log out and forget the paired device.
    async fn logout(&self) -> Result<(), TransportError>;
}
