//! WhatsApp Web bridge client library.
//!
//! This crate provides a Rust client for a WhatsApp Web bridge sidecar (the
//! process that owns the browser session) over HTTP. It supports:
//!
//! - Session control: initialize, destroy, logout
//! - Replying to messages and toggling the "composing" presence
//! - Receiving session events and messages via Server-Sent Events (SSE)
//!
//! # Example
//!
//! ```no_run
//! use wa_bridge::{BridgeClient, BridgeConfig};
//! use zap_core::TransportEvent;
//!
//! # async fn example() -> Result<(), wa_bridge::BridgeError> {
//! let client = BridgeClient::connect(BridgeConfig::default()).await?;
//! client.start_session().await?;
//!
//! use futures::StreamExt;
//! let mut events = wa_bridge::subscribe(&client)?;
//! while let Some(result) = events.next().await {
//!     match result {
//!         Ok(TransportEvent::Message(msg)) => println!("From {}: {}", msg.from, msg.body),
//!         Ok(other) => println!("Session event: {:?}", other),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod sse;
pub mod types;

pub use client::BridgeClient;
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use sse::{subscribe, subscribe_with_reconnect, EventStream, ReconnectConfig};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
