//! Echo model implementation - echoes the newest user turn back.

use std::sync::Mutex;

use async_trait::async_trait;
use zap_core::{AiError, ChatRole, GenerateRequest, ModelClient};

/// A simple model that echoes the newest user turn.
///
/// Every request is kept so tests can inspect the context the pipeline
/// assembled.
#[derive(Debug, Default)]
pub struct EchoModel {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl EchoModel {
    /// Create a new EchoModel with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoModel with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoModel;
    ///
    /// let model = EchoModel::with_prefix("Echo: ");
    /// // Will respond with "Echo: <newest user turn>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelClient for EchoModel {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError> {
        let text = request
            .contents
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::User)
            .map(|turn| turn.content.clone())
            .unwrap_or_default();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text,
        })
    }

    fn name(&self) -> &str {
        "EchoModel"
    }
}
