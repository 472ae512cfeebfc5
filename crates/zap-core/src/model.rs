//! The generative-AI collaborator seam.

use async_trait::async_trait;

use crate::config::ModelType;
use crate::error::AiError;
use crate::message::ChatTurn;

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model variant to call.
    pub model: ModelType,
    /// Persona / prompt prefix.
    pub system_instruction: String,
    /// Generation randomness.
    pub temperature: f32,
    /// Conversation context, oldest first. The last turn is the new message.
    pub contents: Vec<ChatTurn>,
}

/// The core trait for generative model clients.
///
/// Implementations must be thread-safe (`Send + Sync`) as they may be
/// called concurrently for messages from different senders.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate reply text for the request.
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError>;

    /// Get the name of this client implementation.
    fn name(&self) -> &str;
}
