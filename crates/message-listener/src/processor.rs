//! Message processor that connects the transport event stream to the
//! intake, generation and delivery pipeline.

use std::fmt::Display;
use std::sync::Arc;

use bot_store::{estimate_tokens, ConfigStore, StatsAccumulator};
use broadcaster::{BotEvent, BotStatus, EventBroadcaster};
use chrono::NaiveDateTime;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use zap_core::{AiError, InboundMessage, TransportEvent};

use crate::filter::{IntakeFilter, SkipReason};
use crate::generator::ResponseGenerator;
use crate::history::ConversationHistory;
use crate::queue::{DeliveryQueue, QueueClosed, QueueEntry};

/// Characters of the message body shown in the dashboard log.
const PREVIEW_CHARS: usize = 20;

/// Source of the local wall-clock time used for stats bucketing.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Configuration for the message processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Exchanges per sender kept as model context.
    pub context_turns: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self { context_turns: 10 }
    }
}

/// Errors that can occur during message processing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The model failed to produce a reply.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// The delivery worker is gone.
    #[error(transparent)]
    Queue(#[from] QueueClosed),

    /// The transport event stream ended.
    #[error("event stream ended")]
    StreamEnded,
}

/// Result of processing a single message.
#[derive(Debug)]
pub enum ProcessResult {
    /// A reply was generated and queued for delivery.
    Queued { sender: String, response: String },
    /// The message did not pass intake.
    Skipped { reason: SkipReason },
    /// Counted, but no model is configured to answer.
    Unanswered { sender: String },
    /// Error occurred during processing.
    Error(ProcessorError),
}

/// Runs the pipeline for transport events. Cheap to clone; every inbound
/// message is handled on its own task.
#[derive(Clone)]
pub struct MessageProcessor {
    filter: IntakeFilter,
    config: Arc<ConfigStore>,
    stats: Arc<StatsAccumulator>,
    generator: ResponseGenerator,
    history: Arc<ConversationHistory>,
    queue: DeliveryQueue,
    broadcaster: EventBroadcaster,
    clock: Clock,
}

impl MessageProcessor {
    /// Create a new message processor.
    pub fn new(
        config: Arc<ConfigStore>,
        stats: Arc<StatsAccumulator>,
        generator: ResponseGenerator,
        queue: DeliveryQueue,
        broadcaster: EventBroadcaster,
        processor_config: ProcessorConfig,
    ) -> Self {
        Self {
            filter: IntakeFilter::new(config.clone()),
            config,
            stats,
            generator,
            history: Arc::new(ConversationHistory::new(processor_config.context_turns)),
            queue,
            broadcaster,
            clock: local_now,
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Get a reference to the conversation history.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Get a reference to the delivery queue.
    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    /// Route one transport event.
    ///
    /// Session events update the dashboard immediately. A message is
    /// processed on a new task whose handle is returned.
    pub fn handle_event(&self, event: TransportEvent) -> Option<JoinHandle<ProcessResult>> {
        match event {
            TransportEvent::Qr(qr) => {
                info!("New QR code received");
                self.broadcaster.publish(BotEvent::QrCode(qr));
                self.broadcaster.set_status(BotStatus::QrReady);
                None
            }
            TransportEvent::Authenticated => {
                self.broadcaster.set_status(BotStatus::Connecting);
                self.broadcaster
                    .info("WhatsApp authenticated, loading session...");
                None
            }
            TransportEvent::Ready => {
                self.broadcaster.set_status(BotStatus::Connected);
                self.broadcaster.success("WhatsApp connected!");
                None
            }
            TransportEvent::Disconnected(reason) => {
                self.broadcaster.set_status(BotStatus::Disconnected);
                self.broadcaster.warning(format!("Disconnected: {}", reason));
                None
            }
            TransportEvent::Message(message) => {
                let processor = self.clone();
                Some(tokio::spawn(
                    async move { processor.process_message(message).await },
                ))
            }
        }
    }

    /// Run one inbound message through the pipeline.
    pub async fn process_message(&self, message: InboundMessage) -> ProcessResult {
        if let Err(reason) = self.filter.check(&message) {
            debug!("Skipping message from {}: {}", message.from, reason);
            return ProcessResult::Skipped { reason };
        }

        let sender = message.sender_number().to_string();
        let now = (self.clock)();

        if self.stats.record_inbound_at(&sender, now) {
            info!("New day {}, daily counters reset", now.date());
        }
        self.broadcaster
            .publish(BotEvent::DashboardUpdate(self.stats.snapshot()));

        let preview: String = message.body.chars().take(PREVIEW_CHARS).collect();
        self.broadcaster.info(format!(
            "Message from {}: \"{}...\"",
            message.sender_label(),
            preview
        ));

        if !self.generator.is_available() {
            debug!("No model configured, not answering {}", sender);
            return ProcessResult::Unanswered { sender };
        }

        let config = self.config.get();
        let history = self.history.get(&sender).await;

        let reply = match self.generator.generate(&history, &message.body, &config).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("AI error for {}: {}", sender, e);
                self.broadcaster.error(format!("AI error: {}", e));
                return ProcessResult::Error(e.into());
            }
        };

        self.stats
            .record_token_usage(estimate_tokens(&message.body, &reply));
        self.history
            .add_exchange(&sender, &message.body, &reply)
            .await;

        match self
            .queue
            .enqueue(QueueEntry::new(message.reply_target(), reply.clone()))
        {
            Ok(()) => {
                debug!("Reply for {} queued ({} pending)", sender, self.queue.len());
                ProcessResult::Queued {
                    sender,
                    response: reply,
                }
            }
            Err(e) => {
                error!("Could not queue reply for {}: {}", sender, e);
                ProcessResult::Error(e.into())
            }
        }
    }

    /// Run the processor until the event stream ends.
    pub async fn run<St, E>(self, events: St) -> Result<(), ProcessorError>
    where
        St: Stream<Item = Result<TransportEvent, E>>,
        E: Display,
    {
        self.run_with_shutdown(events, std::future::pending()).await
    }

    /// Run the processor with graceful shutdown support.
    ///
    /// This method runs until either:
    /// - The provided shutdown signal completes
    /// - The event stream ends
    ///
    /// Message tasks already spawned keep running; queued replies are not
    /// cancelled.
    pub async fn run_with_shutdown<St, E, S>(
        self,
        events: St,
        shutdown_signal: S,
    ) -> Result<(), ProcessorError>
    where
        St: Stream<Item = Result<TransportEvent, E>>,
        E: Display,
        S: std::future::Future<Output = ()>,
    {
        info!(
            "Starting message processor (model: {})",
            self.generator.model_name().unwrap_or("none")
        );

        tokio::pin!(events);
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping message processor");
                    return Ok(());
                }

                result = events.next() => {
                    match result {
                        Some(Ok(event)) => {
                            self.handle_event(event);
                        }
                        Some(Err(e)) => {
                            // Reconnection is handled by the stream
                            error!("Event stream error: {}", e);
                        }
                        None => {
                            warn!("Event stream ended");
                            return Err(ProcessorError::StreamEnded);
                        }
                    }
                }
            }
        }
    }
}
