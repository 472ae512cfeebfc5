//! Message pipeline for ZapBot.
//!
//! This crate turns transport events into dashboard updates and paced
//! WhatsApp replies:
//!
//! - [`filter`] - which inbound messages are handled at all
//! - [`ResponseGenerator`] - builds the model request from history and config
//! - [`DeliveryQueue`] - single worker sending replies with human-like pacing
//! - [`MessageProcessor`] - routes events and runs the pipeline per message
//! - [`Controller`] - dashboard commands (config, session, test chat)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bot_store::{ConfigStore, StatsAccumulator};
//! use broadcaster::EventBroadcaster;
//! use message_listener::{
//!     DeliveryQueue, MessageProcessor, PacingPolicy, ProcessorConfig, ResponseGenerator,
//! };
//! use mock_brain::{EchoModel, RecordingTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let broadcaster = EventBroadcaster::new();
//! let transport = Arc::new(RecordingTransport::new());
//! let (queue, _worker) = DeliveryQueue::spawn(transport, broadcaster.clone(), PacingPolicy::default());
//!
//! let processor = MessageProcessor::new(
//!     Arc::new(ConfigStore::load(".data/bot_config.json")),
//!     Arc::new(StatsAccumulator::load(".data/bot_stats.json")),
//!     ResponseGenerator::new(Arc::new(EchoModel::new())),
//!     queue,
//!     broadcaster,
//!     ProcessorConfig::default(),
//! );
//!
//! let events = futures::stream::empty::<Result<zap_core::TransportEvent, String>>();
//! processor.run_with_shutdown(events, async {}).await?;
//! # Ok(())
//! # }
//! ```

pub mod control;
pub mod filter;
pub mod generator;
pub mod history;
pub mod pacing;
pub mod processor;
pub mod queue;

pub use control::Controller;
pub use filter::{accept, check, IntakeFilter, SkipReason};
pub use generator::{build_request, ResponseGenerator};
pub use history::ConversationHistory;
pub use pacing::PacingPolicy;
pub use processor::{Clock, MessageProcessor, ProcessResult, ProcessorConfig, ProcessorError};
pub use queue::{DeliveryQueue, QueueClosed, QueueEntry};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
