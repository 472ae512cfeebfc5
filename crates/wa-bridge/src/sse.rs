//! Server-Sent Events (SSE) client for receiving session events.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use reqwest_eventsource::retry::ExponentialBackoff;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use tracing::{debug, error, info, warn};
use zap_core::TransportEvent;

use crate::error::BridgeError;
use crate::types::parse_event;
use crate::BridgeClient;

/// Configuration for automatic reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of retries (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }

    fn retry_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.initial_delay,
            self.backoff_multiplier,
            Some(self.max_delay),
            self.max_retries.map(|n| n as usize),
        )
    }
}

/// A stream of session events from the bridge.
///
/// Reconnection after transport errors is handled by the underlying event
/// source according to the [`ReconnectConfig`]; errors are still yielded so
/// callers can log them.
pub struct EventStream {
    event_source: EventSource,
    reconnect_config: ReconnectConfig,
    reconnect_attempts: u32,
}

impl EventStream {
    /// Create a new event stream from a BridgeClient.
    pub fn new(client: &BridgeClient) -> Result<Self, BridgeError> {
        Self::with_reconnect(client, ReconnectConfig::default())
    }

    /// Create a new event stream with custom reconnection config.
    pub fn with_reconnect(
        client: &BridgeClient,
        reconnect_config: ReconnectConfig,
    ) -> Result<Self, BridgeError> {
        let url = client.config().events_url();
        info!("Creating SSE connection to {}", url);

        // SSE connections are long-lived and must not share the RPC timeout
        let sse_client = reqwest::Client::builder().build()?;

        let mut event_source = sse_client
            .get(&url)
            .eventsource()
            .map_err(|e| BridgeError::Sse(e.to_string()))?;
        event_source.set_retry_policy(Box::new(reconnect_config.retry_policy()));

        Ok(Self {
            event_source,
            reconnect_config,
            reconnect_attempts: 0,
        })
    }

    /// Close the underlying connection. The stream ends afterwards.
    pub fn close(&mut self) {
        self.event_source.close();
    }
}

impl Stream for EventStream {
    type Item = Result<TransportEvent, BridgeError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.event_source).poll_next(cx) {
                Poll::Ready(Some(Ok(Event::Open))) => {
                    debug!("SSE connection opened");
                    self.reconnect_attempts = 0;
                }
                Poll::Ready(Some(Ok(Event::Message(msg)))) => {
                    match parse_event(&msg.event, &msg.data) {
                        Ok(Some(event)) => {
                            debug!("Received SSE event: {}", msg.event);
                            return Poll::Ready(Some(Ok(event)));
                        }
                        Ok(None) => {
                            debug!("Ignoring SSE event type: {}", msg.event);
                        }
                        Err(e) => {
                            warn!("Failed to parse SSE event data: {}", e);
                            debug!("Raw data: {}", msg.data);
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    self.reconnect_attempts += 1;
                    if !self.reconnect_config.should_retry(self.reconnect_attempts) {
                        error!(
                            "SSE error after {} attempts, giving up: {}",
                            self.reconnect_attempts, e
                        );
                        self.event_source.close();
                    } else {
                        error!("SSE error: {}", e);
                    }
                    return Poll::Ready(Some(Err(BridgeError::Sse(e.to_string()))));
                }
                Poll::Ready(None) => {
                    info!("SSE stream ended");
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Create an event stream from a BridgeClient.
pub fn subscribe(client: &BridgeClient) -> Result<EventStream, BridgeError> {
    EventStream::new(client)
}

/// Create an event stream with custom reconnection configuration.
pub fn subscribe_with_reconnect(
    client: &BridgeClient,
    reconnect_config: ReconnectConfig,
) -> Result<EventStream, BridgeError> {
    EventStream::with_reconnect(client, reconnect_config)
}
