//! Outbound delivery queue drained by a single paced worker.
//!
//! Replies are delivered strictly in enqueue order. For every entry the
//! worker waits a random "thinking" pause, shows the typing indicator for a
//! length-dependent time, sends the reply, clears the indicator and then
//! cools down before taking the next entry. A failed send is logged and the
//! entry is dropped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use broadcaster::EventBroadcaster;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use zap_core::{ReplyTarget, Transport};

use crate::pacing::PacingPolicy;

/// A reply waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub target: ReplyTarget,
    pub response_text: String,
}

impl QueueEntry {
    pub fn new(target: ReplyTarget, response_text: impl Into<String>) -> Self {
        Self {
            target,
            response_text: response_text.into(),
        }
    }
}

/// The delivery worker has stopped; the entry was not queued.
#[derive(Debug, Error)]
#[error("delivery queue closed")]
pub struct QueueClosed(pub QueueEntry);

/// Handle to the delivery queue. Cheap to clone.
///
/// The worker stops once every handle has been dropped and the remaining
/// entries have been delivered.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<QueueEntry>,
    pending: Arc<AtomicUsize>,
    busy: Arc<AtomicBool>,
}

impl DeliveryQueue {
    /// Spawn the worker on the current runtime.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        broadcaster: EventBroadcaster,
        pacing: PacingPolicy,
    ) -> (Self, JoinHandle<()>) {
        Self::spawn_with_rng(transport, broadcaster, pacing, StdRng::from_entropy())
    }

    /// Spawn the worker with a caller-supplied random source.
    pub fn spawn_with_rng(
        transport: Arc<dyn Transport>,
        broadcaster: EventBroadcaster,
        pacing: PacingPolicy,
        rng: StdRng,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let busy = Arc::new(AtomicBool::new(false));

        let worker = DeliveryWorker {
            rx,
            transport,
            broadcaster,
            pacing,
            rng,
            pending: pending.clone(),
            busy: busy.clone(),
        };
        let handle = tokio::spawn(worker.run());

        (Self { tx, pending, busy }, handle)
    }

    /// Append an entry and wake the worker.
    pub fn enqueue(&self, entry: QueueEntry) -> Result<(), QueueClosed> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(entry).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            QueueClosed(e.0)
        })
    }

    /// Entries waiting to be picked up by the worker.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a delivery cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

struct DeliveryWorker {
    rx: mpsc::UnboundedReceiver<QueueEntry>,
    transport: Arc<dyn Transport>,
    broadcaster: EventBroadcaster,
    pacing: PacingPolicy,
    rng: StdRng,
    pending: Arc<AtomicUsize>,
    busy: Arc<AtomicBool>,
}

impl DeliveryWorker {
    async fn run(mut self) {
        debug!("Delivery worker started");

        while let Some(entry) = self.rx.recv().await {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            self.busy.store(true, Ordering::SeqCst);

            self.deliver(entry).await;

            self.busy.store(false, Ordering::SeqCst);
            let cooldown = self.pacing.cooldown_delay(&mut self.rng);
            sleep(cooldown).await;
        }

        info!("Delivery queue closed, worker stopping");
    }

    async fn deliver(&mut self, entry: QueueEntry) {
        let chat_id = entry.target.chat_id.as_str();
        let recipient = chat_id.split('@').next().unwrap_or(chat_id);

        let think = self.pacing.think_delay(&mut self.rng);
        sleep(think).await;

        if let Err(e) = self.transport.send_typing(chat_id).await {
            warn!("Failed to send typing indicator to {}: {}", recipient, e);
        }

        sleep(self.pacing.typing_delay(&entry.response_text)).await;

        match self.transport.reply(&entry.target, &entry.response_text).await {
            Ok(()) => {
                self.broadcaster
                    .success(format!("Reply sent to {}", recipient));
            }
            Err(e) => {
                error!("Delivery to {} failed, dropping reply", recipient);
                self.broadcaster
                    .error(format!("Failed to send reply to {}: {}", recipient, e));
            }
        }

        if let Err(e) = self.transport.clear_state(chat_id).await {
            warn!("Failed to clear chat state for {}: {}", recipient, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use broadcaster::{BotEvent, LogLevel};
    use mock_brain::{RecordingTransport, TransportCall};
    use tokio::time::Instant;

    fn entry(chat: &str, text: &str) -> QueueEntry {
        QueueEntry::new(
            ReplyTarget {
                chat_id: format!("{}@c.us", chat),
                message_id: format!("msg-{}", text),
            },
            text,
        )
    }

    fn spawn(transport: Arc<RecordingTransport>) -> (DeliveryQueue, EventBroadcaster) {
        let broadcaster = EventBroadcaster::new();
        let (queue, _handle) = DeliveryQueue::spawn_with_rng(
            transport,
            broadcaster.clone(),
            PacingPolicy::default(),
            StdRng::seed_from_u64(42),
        );
        (queue, broadcaster)
    }

    fn assert_close(actual: Duration, expected: Duration) {
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(diff < Duration::from_millis(5), "{:?} != {:?}", actual, expected);
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_back_to_back_entries() {
        let transport = Arc::new(RecordingTransport::new());
        let (queue, _broadcaster) = spawn(transport.clone());

        queue.enqueue(entry("5511999990001", "first")).unwrap();
        queue.enqueue(entry("5511999990002", "second")).unwrap();
        queue.enqueue(entry("5511999990003", "third")).unwrap();
        settle().await;

        // First entry taken immediately, the other two wait.
        assert!(queue.is_busy());
        assert_eq!(queue.len(), 2);

        sleep(Duration::from_secs(60)).await;

        assert!(!queue.is_busy());
        assert!(queue.is_empty());
        let texts: Vec<String> = transport.replies().into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_timing_bounds() {
        let transport = Arc::new(RecordingTransport::new());
        let (queue, _broadcaster) = spawn(transport.clone());
        let start = Instant::now();

        queue.enqueue(entry("5511999990001", "hello there")).unwrap();
        queue
            .enqueue(entry("5511999990002", &"long ".repeat(60)))
            .unwrap();
        sleep(Duration::from_secs(60)).await;

        let calls = transport.calls();
        let ops: Vec<TransportCall> = calls.iter().map(|c| c.call.clone()).collect();
        assert_eq!(ops.len(), 6);
        assert!(matches!(ops[0], TransportCall::Typing(_)));
        assert!(matches!(ops[1], TransportCall::Reply { .. }));
        assert!(matches!(ops[2], TransportCall::ClearState(_)));

        // Think pause before typing.
        let think = calls[0].at - start;
        assert!(think >= Duration::from_secs(2) && think <= Duration::from_secs(5));

        // Short replies type for the 3 s floor, 300 chars for 10 s (cap).
        assert_close(calls[1].at - calls[0].at, Duration::from_secs(3));
        assert_close(calls[4].at - calls[3].at, Duration::from_secs(10));

        // Whole cycle without cooldown stays within 5..15 s.
        let cycle = calls[1].at - start;
        assert!(cycle >= Duration::from_secs(5) && cycle <= Duration::from_secs(15));

        // Cooldown plus the next think pause separate the cycles.
        let gap = calls[3].at - calls[2].at;
        assert!(gap >= Duration::from_secs(3) && gap <= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reply_is_dropped_and_next_entry_proceeds() {
        let transport = Arc::new(RecordingTransport::new());
        transport.set_fail_replies(true);
        let (queue, broadcaster) = spawn(transport.clone());
        let mut events = broadcaster.subscribe();

        queue.enqueue(entry("5511999990001", "one")).unwrap();
        queue.enqueue(entry("5511999990002", "two")).unwrap();
        sleep(Duration::from_secs(40)).await;

        // Each entry attempted exactly once.
        assert_eq!(transport.replies().len(), 2);

        let mut errors = 0;
        while let Ok(event) = events.try_recv() {
            if let BotEvent::Log(log) = event {
                assert_eq!(log.level, LogLevel::Error);
                assert!(log.message.contains("5511999990001") || log.message.contains("5511999990002"));
                errors += 1;
            }
        }
        assert_eq!(errors, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_state_failures_do_not_block_delivery() {
        let transport = Arc::new(RecordingTransport::new());
        transport.set_fail_presence(true);
        let (queue, broadcaster) = spawn(transport.clone());
        let mut events = broadcaster.subscribe();

        queue.enqueue(entry("5511999990001", "one")).unwrap();
        queue.enqueue(entry("5511999990002", "two")).unwrap();
        sleep(Duration::from_secs(40)).await;

        let calls = transport.calls();
        let ops: Vec<TransportCall> = calls.iter().map(|c| c.call.clone()).collect();
        assert_eq!(ops.len(), 6);
        for cycle in ops.chunks(3) {
            assert!(matches!(cycle[0], TransportCall::Typing(_)));
            assert!(matches!(cycle[1], TransportCall::Reply { .. }));
            assert!(matches!(cycle[2], TransportCall::ClearState(_)));
        }

        // The typing pause still runs after a rejected indicator.
        assert_close(calls[1].at - calls[0].at, Duration::from_secs(3));

        let texts: Vec<String> = transport.replies().into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(queue.is_empty());
        assert!(!queue.is_busy());

        let mut successes = 0;
        while let Ok(event) = events.try_recv() {
            if let BotEvent::Log(log) = event {
                assert_eq!(log.level, LogLevel::Success);
                successes += 1;
            }
        }
        assert_eq!(successes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_published() {
        let transport = Arc::new(RecordingTransport::new());
        let (queue, broadcaster) = spawn(transport.clone());
        let mut events = broadcaster.subscribe();

        queue.enqueue(entry("5511999998888", "Olá!")).unwrap();
        sleep(Duration::from_secs(20)).await;

        match events.try_recv() {
            Ok(BotEvent::Log(log)) => {
                assert_eq!(log.level, LogLevel::Success);
                assert_eq!(log.message, "Reply sent to 5511999998888");
            }
            other => panic!("Expected success log, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_stopped() {
        let transport = Arc::new(RecordingTransport::new());
        let (queue, handle) = DeliveryQueue::spawn(
            transport,
            EventBroadcaster::new(),
            PacingPolicy::instant(),
        );
        handle.abort();
        let _ = handle.await;

        let result = queue.enqueue(entry("5511999998888", "late"));
        assert!(matches!(result, Err(QueueClosed(_))));
        assert_eq!(queue.len(), 0);
    }
}
