//! Events pushed to dashboard clients.

use bot_store::StatsSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zap_core::BotConfig;

/// Connection state of the WhatsApp session as shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotStatus {
    #[default]
    Disconnected,
    QrReady,
    Connecting,
    Connected,
}

/// Severity of a dashboard log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A line in the dashboard activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }
}

/// Answer to a dashboard test-chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaygroundReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlaygroundReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            text: None,
            error: Some(error.into()),
        }
    }
}

/// Server to dashboard event, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BotEvent {
    BotStatus(BotStatus),
    /// Raw QR pairing string.
    QrCode(String),
    Log(LogEntry),
    /// Sent once to each new connection.
    ConfigInitial(BotConfig),
    DashboardUpdate(StatsSnapshot),
    /// Sent only to the connection that asked.
    PlaygroundReply(PlaygroundReply),
}

impl BotEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            BotEvent::BotStatus(_) => "bot_status",
            BotEvent::QrCode(_) => "qr_code",
            BotEvent::Log(_) => "log",
            BotEvent::ConfigInitial(_) => "config_initial",
            BotEvent::DashboardUpdate(_) => "dashboard_update",
            BotEvent::PlaygroundReply(_) => "playground_reply",
        }
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        let value = serde_json::to_value(BotEvent::BotStatus(BotStatus::QrReady)).unwrap();
        assert_eq!(value, json!({"event": "bot_status", "data": "QR_READY"}));
    }

    #[test]
    fn test_log_wire_format() {
        let event = BotEvent::Log(LogEntry::warning("Restarting..."));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "log");
        assert_eq!(value["data"]["level"], "warning");
        assert_eq!(value["data"]["message"], "Restarting...");
        assert!(value["data"]["timestamp"].is_string());
    }

    #[test]
    fn test_playground_reply_omits_missing_fields() {
        let value = serde_json::to_value(BotEvent::PlaygroundReply(PlaygroundReply::text("hi")))
            .unwrap();
        assert_eq!(value, json!({"event": "playground_reply", "data": {"text": "hi"}}));
    }

    #[test]
    fn test_config_initial_uses_camel_case() {
        let value = serde_json::to_value(BotEvent::ConfigInitial(BotConfig::default())).unwrap();
        assert_eq!(value["event"], "config_initial");
        assert_eq!(value["data"]["onlyAllowed"], true);
        assert_eq!(value["data"]["model"], "gemini-2.5-flash");
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let events = [
            BotEvent::BotStatus(BotStatus::Connected),
            BotEvent::QrCode("qr".to_string()),
            BotEvent::Log(LogEntry::info("x")),
            BotEvent::PlaygroundReply(PlaygroundReply::error("boom")),
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }
}
