//! Session events streamed by the bridge.

use serde::Deserialize;
use zap_core::{InboundMessage, TransportEvent};

/// SSE event name carrying a pairing code.
pub const EVENT_QR: &str = "qr";
/// SSE event name sent once the session is authenticated.
pub const EVENT_AUTHENTICATED: &str = "authenticated";
/// SSE event name sent once the session is ready.
pub const EVENT_READY: &str = "ready";
/// SSE event name sent when the session drops.
pub const EVENT_DISCONNECTED: &str = "disconnected";
/// SSE event name carrying an inbound message.
pub const EVENT_MESSAGE: &str = "message";

/// Payload of a `qr` event.
#[derive(Debug, Clone, Deserialize)]
pub struct QrPayload {
    pub qr: String,
}

/// Payload of a `disconnected` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisconnectedPayload {
    #[serde(default)]
    pub reason: String,
}

/// Decode one SSE event into a transport event.
///
/// Returns `Ok(None)` for event types this client does not handle.
pub fn parse_event(event: &str, data: &str) -> Result<Option<TransportEvent>, serde_json::Error> {
    let parsed = match event {
        EVENT_QR => {
            let payload: QrPayload = serde_json::from_str(data)?;
            TransportEvent::Qr(payload.qr)
        }
        EVENT_AUTHENTICATED => TransportEvent::Authenticated,
        EVENT_READY => TransportEvent::Ready,
        EVENT_DISCONNECTED => {
            let payload: DisconnectedPayload = if data.trim().is_empty() {
                DisconnectedPayload::default()
            } else {
                serde_json::from_str(data)?
            };
            TransportEvent::Disconnected(payload.reason)
        }
        EVENT_MESSAGE => {
            let message: InboundMessage = serde_json::from_str(data)?;
            TransportEvent::Message(message)
        }
        _ => return Ok(None),
    };
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qr() {
        let event = parse_event("qr", r#"{"qr": "2@abc,def"}"#).unwrap();
        assert_eq!(event, Some(TransportEvent::Qr("2@abc,def".to_string())));
    }

    #[test]
    fn test_parse_message() {
        let data = r#"{
            "id": "false_5511999998888@c.us_3EB0",
            "from": "5511999998888@c.us",
            "body": "Oi!",
            "isStatus": false,
            "timestamp": 1760000000,
            "senderName": "Maria"
        }"#;
        let event = parse_event("message", data).unwrap();
        match event {
            Some(TransportEvent::Message(msg)) => {
                assert_eq!(msg.sender_number(), "5511999998888");
                assert_eq!(msg.body, "Oi!");
                assert_eq!(msg.sender_name.as_deref(), Some("Maria"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_disconnected_without_body() {
        let event = parse_event("disconnected", "").unwrap();
        assert_eq!(event, Some(TransportEvent::Disconnected(String::new())));

        let event = parse_event("disconnected", r#"{"reason": "NAVIGATION"}"#).unwrap();
        assert_eq!(event, Some(TransportEvent::Disconnected("NAVIGATION".to_string())));
    }

    #[test]
    fn test_parse_unit_events() {
        assert_eq!(parse_event("ready", "{}").unwrap(), Some(TransportEvent::Ready));
        assert_eq!(
            parse_event("authenticated", "").unwrap(),
            Some(TransportEvent::Authenticated)
        );
    }

    #[test]
    fn test_unknown_event_ignored() {
        assert_eq!(parse_event("loading_screen", "{}").unwrap(), None);
    }

    #[test]
    fn test_malformed_message_is_error() {
        assert!(parse_event("message", r#"{"body": "no sender"}"#).is_err());
    }
}
