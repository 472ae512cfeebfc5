//! Delayed model implementation - wraps another model with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use zap_core::{AiError, GenerateRequest, ModelClient};

/// A model that wraps another model and adds artificial delay.
///
/// Useful for simulating AI latency, e.g. to check that messages from
/// different senders are processed concurrently.
pub struct DelayedModel<M: ModelClient> {
    inner: M,
    delay: Duration,
}

impl<M: ModelClient> DelayedModel<M> {
    /// Create a new DelayedModel wrapping the given model with the specified delay.
    pub fn new(inner: M, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a model with a delay in milliseconds.
    pub fn with_millis(inner: M, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Access the wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: ModelClient> ModelClient for DelayedModel<M> {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError> {
        sleep(self.delay).await;
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        "DelayedModel"
    }
}
