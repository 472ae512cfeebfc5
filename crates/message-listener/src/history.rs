//! Conversation history management.
//!
//! This module provides per-sender conversation history tracking with
//! automatic turn-based trimming and LRU eviction to prevent memory exhaustion.

use indexmap::IndexMap;
use tokio::sync::RwLock;
use zap_core::ChatTurn;

/// Default maximum number of senders to track before LRU eviction.
const DEFAULT_MAX_SENDERS: usize = 10000;

/// Per-sender conversation history with LRU eviction.
///
/// Maintains separate conversation histories for each sender, with
/// automatic trimming to a configurable maximum number of turns.
///
/// The total number of tracked senders is also limited; the least recently
/// used senders are evicted when the limit is reached.
///
/// # Example
///
/// ```rust
/// use message_listener::ConversationHistory;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let history = ConversationHistory::new(5); // Keep 5 turns
///
///     history.add_exchange("5511999998888", "Oi", "Olá!").await;
///     history.add_exchange("5511999998888", "Tudo bem?", "Tudo ótimo!").await;
///
///     let turns = history.get("5511999998888").await;
///     assert_eq!(turns.len(), 4); // 2 exchanges = 4 turns
/// }
/// ```
#[derive(Debug)]
pub struct ConversationHistory {
    /// Map from sender to their turns, least recently used first.
    histories: RwLock<IndexMap<String, Vec<ChatTurn>>>,
    /// Maximum number of exchanges (user + bot pairs) to keep per sender.
    max_turns: usize,
    /// Maximum number of senders to track before LRU eviction.
    max_senders: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ConversationHistory {
    /// Create a new conversation history with the given max turns.
    ///
    /// Uses the default max senders limit (10,000).
    pub fn new(max_turns: usize) -> Self {
        Self::with_limits(max_turns, DEFAULT_MAX_SENDERS)
    }

    /// Create a new conversation history with custom limits.
    pub fn with_limits(max_turns: usize, max_senders: usize) -> Self {
        Self {
            histories: RwLock::new(IndexMap::new()),
            max_turns,
            max_senders,
        }
    }

    /// Get the conversation history for a sender.
    ///
    /// This marks the sender as recently used for LRU purposes.
    pub async fn get(&self, sender: &str) -> Vec<ChatTurn> {
        let mut histories = self.histories.write().await;

        if let Some(entry) = histories.shift_remove(sender) {
            let result = entry.clone();
            histories.insert(sender.to_string(), entry);
            result
        } else {
            Vec::new()
        }
    }

    /// Add a user message and the bot reply to the history.
    ///
    /// This also performs LRU eviction if the sender limit is exceeded.
    pub async fn add_exchange(&self, sender: &str, user_msg: &str, bot_msg: &str) {
        if self.max_turns == 0 {
            return;
        }

        let mut histories = self.histories.write().await;

        let mut history = histories.shift_remove(sender).unwrap_or_default();
        history.push(ChatTurn::user(user_msg));
        history.push(ChatTurn::bot(bot_msg));

        let max_messages = self.max_turns * 2;
        if history.len() > max_messages {
            let to_remove = history.len() - max_messages;
            history.drain(0..to_remove);
        }

        histories.insert(sender.to_string(), history);

        while histories.len() > self.max_senders {
            histories.shift_remove_index(0);
        }
    }

    /// Clear history for a specific sender.
    pub async fn clear(&self, sender: &str) {
        self.histories.write().await.shift_remove(sender);
    }

    /// Clear all conversation histories.
    pub async fn clear_all(&self) {
        self.histories.write().await.clear();
    }

    /// Get the current number of tracked senders.
    pub async fn sender_count(&self) -> usize {
        self.histories.read().await.len()
    }
}
