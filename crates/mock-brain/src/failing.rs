//! Failing model implementation.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use zap_core::{AiError, GenerateRequest, ModelClient};

/// A model that always fails with the same error.
#[derive(Debug)]
pub struct FailingModel {
    error: AiError,
    calls: AtomicUsize,
}

impl FailingModel {
    /// Create a model that fails with the given error.
    pub fn new(error: AiError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a model that fails with a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AiError::TransportFailure(message.into()))
    }

    /// Number of generate calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for FailingModel {
    async fn generate(&self, _request: GenerateRequest) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "FailingModel"
    }
}
