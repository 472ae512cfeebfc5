//! Message types exchanged with the transport and the model.

use serde::{Deserialize, Serialize};

/// Suffix the transport appends to group chat ids.
const GROUP_SUFFIX: &str = "@g.us";

/// Suffix the transport appends to broadcast lists and status updates.
const BROADCAST_SUFFIX: &str = "@broadcast";

/// A message received from the WhatsApp transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Transport message id, used to quote the message in the reply.
    #[serde(default)]
    pub id: String,

    /// Raw chat id of the sender (e.g. "5511999998888@c.us").
    pub from: String,

    /// Text body.
    #[serde(default)]
    pub body: String,

    /// Whether this is a status/story update.
    #[serde(default)]
    pub is_status: bool,

    /// Message timestamp (seconds since epoch).
    #[serde(default)]
    pub timestamp: i64,

    /// Contact display name, if the transport resolved one.
    #[serde(default)]
    pub sender_name: Option<String>,
}

impl InboundMessage {
    /// Create a direct message from a phone-number chat id.
    pub fn direct(from: impl Into<String>, body: impl Into<String>, timestamp: i64) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
            timestamp,
            ..Default::default()
        }
    }

    /// Whether the message comes from a group chat.
    pub fn is_group(&self) -> bool {
        self.from.contains(GROUP_SUFFIX)
    }

    /// Whether the message comes from a broadcast list.
    pub fn is_broadcast(&self) -> bool {
        self.from.ends_with(BROADCAST_SUFFIX)
    }

    /// The sender id with the transport suffix stripped.
    pub fn sender_number(&self) -> &str {
        match self.from.split_once('@') {
            Some((number, _)) => number,
            None => &self.from,
        }
    }

    /// Human readable sender label for logs.
    pub fn sender_label(&self) -> &str {
        self.sender_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.sender_number())
    }

    /// Where a reply to this message should go.
    pub fn reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            chat_id: self.from.clone(),
            message_id: self.id.clone(),
        }
    }
}

/// Opaque handle identifying the chat (and quoted message) a reply goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTarget {
    pub chat_id: String,
    pub message_id: String,
}

/// Who produced a turn of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
    /// House-keeping entries (dashboard notices); never sent to the model.
    System,
}

/// A single turn of conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    #[serde(alias = "text")]
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a bot turn.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            content: content.into(),
        }
    }

    /// Create a house-keeping turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}
