//! Recording transport - captures every call for later assertions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;
use zap_core::{ReplyTarget, Transport, TransportError};

/// A transport operation as seen by the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Typing(String),
    ClearState(String),
    Reply { target: ReplyTarget, text: String },
    Initialize,
    Destroy,
    Logout,
}

/// A call plus the (tokio) instant it happened.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: TransportCall,
    pub at: Instant,
}

/// A [`Transport`] that records calls instead of talking to WhatsApp.
///
/// Timestamps come from `tokio::time`, so tests running with a paused
/// clock can assert on the exact delays between calls.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    fail_replies: AtomicBool,
    fail_session: AtomicBool,
    fail_presence: AtomicBool,
}

impl RecordingTransport {
    /// Create a transport where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `reply` calls fail (they are still recorded).
    pub fn set_fail_replies(&self, fail: bool) {
        self.fail_replies.store(fail, Ordering::SeqCst);
    }

    /// Make `send_typing` and `clear_state` fail (still recorded).
    pub fn set_fail_presence(&self, fail: bool) {
        self.fail_presence.store(fail, Ordering::SeqCst);
    }

    /// Make `initialize`, `destroy` and `logout` fail (still recorded).
    pub fn set_fail_session(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Recorded operations without timestamps.
    pub fn operations(&self) -> Vec<TransportCall> {
        self.calls().into_iter().map(|c| c.call).collect()
    }

    /// Texts of all replies, oldest first.
    pub fn replies(&self) -> Vec<(ReplyTarget, String)> {
        self.operations()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Reply { target, text } => Some((target, text)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TransportCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                call,
                at: Instant::now(),
            });
        }
    }

    fn presence_result(&self) -> Result<(), TransportError> {
        if self.fail_presence.load(Ordering::SeqCst) {
            Err(TransportError::RequestFailed("chat state rejected".to_string()))
        } else {
            Ok(())
        }
    }

    fn session_result(&self) -> Result<(), TransportError> {
        if self.fail_session.load(Ordering::SeqCst) {
            Err(TransportError::NotConnected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_typing(&self, chat_id: &str) -> Result<(), TransportError> {
        self.record(TransportCall::Typing(chat_id.to_string()));
        self.presence_result()
    }

    async fn clear_state(&self, chat_id: &str) -> Result<(), TransportError> {
        self.record(TransportCall::ClearState(chat_id.to_string()));
        self.presence_result()
    }

    async fn reply(&self, target: &ReplyTarget, text: &str) -> Result<(), TransportError> {
        self.record(TransportCall::Reply {
            target: target.clone(),
            text: text.to_string(),
        });
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(TransportError::RequestFailed("reply rejected".to_string()));
        }
        Ok(())
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Initialize);
        self.session_result()
    }

    async fn destroy(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Destroy);
        self.session_result()
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Logout);
        self.session_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target() -> ReplyTarget {
        ReplyTarget {
            chat_id: "5511999998888@c.us".to_string(),
            message_id: "ABC".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_calls_in_order_with_timestamps() {
        let transport = RecordingTransport::new();

        transport.send_typing("5511999998888@c.us").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        transport.clear_state("5511999998888@c.us").await.unwrap();
        transport.reply(&target(), "hello").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0].call,
            TransportCall::Typing("5511999998888@c.us".to_string())
        );
        assert_eq!(calls[1].at - calls[0].at, Duration::from_secs(3));
        assert_eq!(transport.replies(), vec![(target(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_configurable_failures() {
        let transport = RecordingTransport::new();
        transport.set_fail_replies(true);
        transport.set_fail_session(true);
        transport.set_fail_presence(true);

        assert!(transport.send_typing("5511999998888@c.us").await.is_err());
        assert!(transport.reply(&target(), "x").await.is_err());
        assert_eq!(
            transport.logout().await,
            Err(TransportError::NotConnected)
        );
        assert_eq!(
            transport.operations(),
            vec![
                TransportCall::Typing("5511999998888@c.us".to_string()),
                TransportCall::Reply {
                    target: target(),
                    text: "x".to_string()
                },
                TransportCall::Logout,
            ]
        );
    }
}
