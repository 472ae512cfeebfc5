//! Core traits and types for the ZapBot WhatsApp responder.
//!
//! This crate provides the shared vocabulary used by every other crate in
//! the workspace. It defines:
//!
//! - [`BotConfig`] / [`BotConfigPatch`] - The runtime bot configuration and its update shape
//! - [`InboundMessage`] / [`ReplyTarget`] - Messages received from and addressed to the transport
//! - [`ChatTurn`] - A single turn of conversation context
//! - [`ModelClient`] - The trait the generative-AI collaborator implements
//! - [`Transport`] - The trait the WhatsApp session collaborator implements
//! - [`AiError`] / [`TransportError`] - Error types for both seams
//!
//! # Example
//!
//! ```rust
//! use zap_core::{async_trait, AiError, GenerateRequest, ModelClient};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl ModelClient for Canned {
//!     async fn generate(&self, _request: GenerateRequest) -> Result<String, AiError> {
//!         Ok("Hello!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Canned"
//!     }
//! }
//! ```

mod config;
mod error;
mod message;
mod model;
mod transport;

pub use config::{normalize_allowed_numbers, normalize_number, BotConfig, BotConfigPatch, ModelType};
pub use error::{AiError, TransportError};
pub use message::{ChatRole, ChatTurn, InboundMessage, ReplyTarget};
pub use model::{GenerateRequest, ModelClient};
pub use transport::{Transport, TransportEvent};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
