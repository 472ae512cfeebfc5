//! Parameters of the bridge RPC methods.
//!
//! The session is part of the RPC URL, so params only address the chat.

use serde::Serialize;

/// Parameters for presence changes in a chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStateParams {
    pub chat_id: String,
}

/// Parameters for replying to a message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyParams {
    pub chat_id: String,
    /// Message to quote. Empty sends a plain message to the chat.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quoted_message_id: String,
    pub text: String,
}
