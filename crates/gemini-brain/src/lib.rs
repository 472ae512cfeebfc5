//! Google Gemini model client.
//!
//! This crate provides a [`ModelClient`] implementation that calls the
//! Gemini `generateContent` REST endpoint.
//!
//! # Features
//!
//! - Multi-turn context (user and model turns)
//! - Per-request model, system instruction and temperature
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use gemini_brain::GeminiClient;
//! use zap_core::{ChatTurn, GenerateRequest, ModelClient, ModelType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::from_env()?;
//!     let text = client
//!         .generate(GenerateRequest {
//!             model: ModelType::Flash,
//!             system_instruction: "Answer briefly.".to_string(),
//!             temperature: 0.7,
//!             contents: vec![ChatTurn::user("Hello!")],
//!         })
//!         .await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::{GeminiConfig, GeminiConfigBuilder};

// Re-export zap-core types for convenience
pub use zap_core::{async_trait, AiError, ChatTurn, GenerateRequest, ModelClient, ModelType};
