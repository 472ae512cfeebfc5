//! Mock collaborators for ZapBot message processing.
//!
//! This crate provides test doubles for the two external seams:
//! - `EchoModel` - Echoes the newest user turn back, recording every request
//! - `FailingModel` - Always fails with a fixed [`AiError`]
//! - `DelayedModel` - Wraps another model with artificial latency
//! - `RecordingTransport` - Records every transport call with its timestamp
//!
//! For production AI processing, use the `gemini-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{ChatTurn, EchoModel, GenerateRequest, ModelClient, ModelType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::AiError> {
//!     let model = EchoModel::new();
//!
//!     let reply = model
//!         .generate(GenerateRequest {
//!             model: ModelType::Flash,
//!             system_instruction: String::new(),
//!             temperature: 0.7,
//!             contents: vec![ChatTurn::user("Hello!")],
//!         })
//!         .await?;
//!     assert_eq!(reply, "Hello!");
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod transport;

// Re-export zap-core types for convenience
pub use zap_core::{
    async_trait, AiError, ChatTurn, GenerateRequest, ModelClient, ModelType, ReplyTarget,
    Transport, TransportError,
};

pub use delayed::DelayedModel;
pub use echo::EchoModel;
pub use failing::FailingModel;
pub use transport::{RecordedCall, RecordingTransport, TransportCall};
