//! Reply generation through the model collaborator.

use std::sync::Arc;

use tracing::debug;
use zap_core::{AiError, BotConfig, ChatRole, ChatTurn, GenerateRequest, ModelClient};

/// Builds model requests from history and config and validates the answer.
///
/// A generator without a model (missing credentials) is "disabled": every
/// call fails with [`AiError::Unavailable`] and callers skip the reply.
#[derive(Clone)]
pub struct ResponseGenerator {
    model: Option<Arc<dyn ModelClient>>,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model: Some(model) }
    }

    /// A generator with no model behind it.
    pub fn disabled() -> Self {
        Self { model: None }
    }

    pub fn from_option(model: Option<Arc<dyn ModelClient>>) -> Self {
        Self { model }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Generate a reply to `message` given prior turns.
    ///
    /// House-keeping (`system`) turns are left out of the context. No retry
    /// is attempted.
    pub async fn generate(
        &self,
        history: &[ChatTurn],
        message: &str,
        config: &BotConfig,
    ) -> Result<String, AiError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AiError::Unavailable("no model configured".to_string()))?;

        let request = build_request(history, message, config);
        debug!(
            "Generating with {} ({} context turns)",
            request.model,
            request.contents.len() - 1
        );

        let text = model.generate(request).await?;
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("model", &self.model_name())
            .finish()
    }
}

/// Assemble the model request: filtered history, then the new message.
pub fn build_request(history: &[ChatTurn], message: &str, config: &BotConfig) -> GenerateRequest {
    let mut contents: Vec<ChatTurn> = history
        .iter()
        .filter(|turn| turn.role != ChatRole::System)
        .cloned()
        .collect();
    contents.push(ChatTurn::user(message));

    GenerateRequest {
        model: config.model,
        system_instruction: config.system_instruction.clone(),
        temperature: config.temperature,
        contents,
    }
}
