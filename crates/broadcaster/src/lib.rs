//! Dashboard event fan-out for ZapBot.
//!
//! This crate delivers status, log and statistics events to every connected
//! dashboard client. Events are not replayed: a subscriber only sees what is
//! published after it subscribed. The last connection status is remembered
//! so a new client can be told where the session stands.
//!
//! # Example
//!
//! ```
//! use broadcaster::{BotEvent, BotStatus, EventBroadcaster};
//!
//! let broadcaster = EventBroadcaster::new();
//! let mut rx = broadcaster.subscribe();
//!
//! broadcaster.set_status(BotStatus::Connected);
//! broadcaster.success("WhatsApp connected!");
//!
//! assert_eq!(broadcaster.current_status(), BotStatus::Connected);
//! assert!(matches!(rx.try_recv(), Ok(BotEvent::BotStatus(BotStatus::Connected))));
//! ```

mod event;

pub use event::{BotEvent, BotStatus, LogEntry, LogLevel, PlaygroundReply};

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Default per-subscriber buffer. Slow subscribers past this lag and skip.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fans events out to all current dashboard subscribers.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<BotEvent>,
    status: Arc<Mutex<BotStatus>>,
}

impl EventBroadcaster {
    /// Create a broadcaster with the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a broadcaster with a custom per-subscriber buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            status: Arc::new(Mutex::new(BotStatus::default())),
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event to every subscriber.
    ///
    /// Returns the number of subscribers reached; zero subscribers is not
    /// an error.
    pub fn publish(&self, event: BotEvent) -> usize {
        match &event {
            BotEvent::BotStatus(status) => {
                if let Ok(mut current) = self.status.lock() {
                    *current = *status;
                }
            }
            BotEvent::Log(entry) => mirror_to_tracing(entry),
            _ => {}
        }

        let name = event.name();
        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                debug!("No dashboard subscribers for {}", name);
                0
            }
        }
    }

    /// The last published connection status.
    pub fn current_status(&self) -> BotStatus {
        self.status.lock().map(|s| *s).unwrap_or_default()
    }

    /// Publish a `bot_status` event.
    pub fn set_status(&self, status: BotStatus) -> usize {
        self.publish(BotEvent::BotStatus(status))
    }

    /// Publish a `log` event.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> usize {
        self.publish(BotEvent::Log(LogEntry::new(level, message)))
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Error, message)
    }

    pub fn success(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Success, message)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .field("status", &self.current_status())
            .finish()
    }
}

fn mirror_to_tracing(entry: &LogEntry) {
    match entry.level {
        LogLevel::Info => info!("{}", entry.message),
        LogLevel::Success => info!(outcome = "success", "{}", entry.message),
        LogLevel::Warning => warn!("{}", entry.message),
        LogLevel::Error => error!("{}", entry.message),
    }
}

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
