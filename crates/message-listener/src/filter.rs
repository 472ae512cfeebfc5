//! Intake eligibility rules.

use std::fmt;
use std::sync::Arc;

use bot_store::ConfigStore;
use zap_core::{BotConfig, InboundMessage};

/// Why an inbound message was not handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Sent in a group chat.
    Group,
    /// Sent to a broadcast list.
    Broadcast,
    /// A status/story update.
    Status,
    /// The bot is switched off.
    Inactive,
    /// Whitelist mode is on and the sender is not listed.
    NotAllowed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Group => write!(f, "group message"),
            SkipReason::Broadcast => write!(f, "broadcast message"),
            SkipReason::Status => write!(f, "status update"),
            SkipReason::Inactive => write!(f, "bot inactive"),
            SkipReason::NotAllowed(sender) => write!(f, "{} not in allowed numbers", sender),
        }
    }
}

/// Decide whether a message should be handled under `config`.
///
/// Rules are checked in order and the first failing one is returned.
pub fn check(message: &InboundMessage, config: &BotConfig) -> Result<(), SkipReason> {
    if message.is_group() {
        return Err(SkipReason::Group);
    }
    if message.is_broadcast() {
        return Err(SkipReason::Broadcast);
    }
    if message.is_status {
        return Err(SkipReason::Status);
    }

    if !config.is_active {
        return Err(SkipReason::Inactive);
    }

    if config.only_allowed {
        let sender = message.sender_number();
        if !config.is_allowed(sender) {
            return Err(SkipReason::NotAllowed(sender.to_string()));
        }
    }

    Ok(())
}

/// Boolean form of [`check`].
pub fn accept(message: &InboundMessage, config: &BotConfig) -> bool {
    check(message, config).is_ok()
}

/// Intake filter bound to the live configuration.
#[derive(Debug, Clone)]
pub struct IntakeFilter {
    config: Arc<ConfigStore>,
}

impl IntakeFilter {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self { config }
    }

    /// Check a message against the current configuration snapshot.
    pub fn check(&self, message: &InboundMessage) -> Result<(), SkipReason> {
        check(message, &self.config.get())
    }

    pub fn accept(&self, message: &InboundMessage) -> bool {
        self.check(message).is_ok()
    }
}
