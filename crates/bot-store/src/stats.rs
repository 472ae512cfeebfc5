//! Usage statistics with flush-on-mutation persistence.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::json_file;

/// Fixed model price used for the cost estimate (USD per million tokens).
pub const PRICE_PER_MILLION_TOKENS: f64 = 0.10;

/// Rough subword tokens per character.
const TOKENS_PER_CHAR: f64 = 0.25;

/// Hours in the traffic histogram.
const HOURS: usize = 24;

/// Heuristic token count for one exchange, from character counts.
///
/// This is a cost proxy, not a tokenizer.
pub fn estimate_tokens(inbound: &str, outbound: &str) -> f64 {
    (inbound.chars().count() + outbound.chars().count()) as f64 * TOKENS_PER_CHAR
}

/// Persisted statistics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotStats {
    /// Accepted inbound messages since the last daily reset.
    pub messages_today: u64,

    /// Every sender seen. Serialized as a list; duplicates collapse on load.
    #[serde(alias = "uniqueUsers")]
    pub unique_senders: BTreeSet<String>,

    /// Accepted inbound messages per local hour of day.
    pub hourly_traffic: [u64; HOURS],

    /// Cumulative heuristic token count.
    #[serde(alias = "tokenUsageEst")]
    pub token_usage_estimate: f64,

    /// Boot time of the current process. Reset to now on every load.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,

    /// Local date the daily counters belong to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_date: Option<NaiveDate>,
}

impl Default for BotStats {
    fn default() -> Self {
        Self {
            messages_today: 0,
            unique_senders: BTreeSet::new(),
            hourly_traffic: [0; HOURS],
            token_usage_estimate: 0.0,
            start_time: Utc::now(),
            stats_date: None,
        }
    }
}

/// One point of the dashboard traffic graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    /// Hour label, e.g. "14:00".
    pub hour: String,
    pub count: u64,
}

/// Point-in-time view of the statistics published to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub messages_today: u64,
    pub active_users: usize,
    pub cost_estimate: f64,
    pub hourly_traffic: Vec<HourlyCount>,
    /// Seconds since the current process started.
    pub uptime: u64,
}

/// Accumulates usage statistics and flushes them after every mutation.
///
/// Mutations hold a std mutex and never await, so concurrent message tasks
/// are serialized against each other.
#[derive(Debug)]
pub struct StatsAccumulator {
    path: PathBuf,
    stats: Mutex<BotStats>,
}

impl StatsAccumulator {
    /// Load statistics from `path`, merged over zeroed defaults.
    ///
    /// `start_time` is always reset to now. Corrupt documents are logged and
    /// replaced by defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let stats = match json_file::read::<BotStats>(&path) {
            Ok(Some(mut stats)) => {
                stats.start_time = Utc::now();
                info!(
                    "Statistics loaded from {} ({} messages, {} senders)",
                    path.display(),
                    stats.messages_today,
                    stats.unique_senders.len()
                );
                stats
            }
            Ok(None) => {
                info!("No statistics at {}, starting fresh", path.display());
                BotStats::default()
            }
            Err(e) => {
                error!("Failed to load statistics, starting fresh: {}", e);
                BotStats::default()
            }
        };

        Self::with_stats(path, stats)
    }

    /// Create an accumulator with explicit initial statistics.
    pub fn with_stats(path: impl Into<PathBuf>, stats: BotStats) -> Self {
        Self {
            path: path.into(),
            stats: Mutex::new(stats),
        }
    }

    /// Count one accepted inbound message from `sender` at local `hour`.
    ///
    /// Returns false (and changes nothing) if `hour` is not in 0..24.
    pub fn record_inbound(&self, sender: &str, hour: u32) -> bool {
        let slot = hour as usize;
        if slot >= HOURS {
            warn!("Ignoring inbound message with invalid hour {}", hour);
            return false;
        }

        self.mutate(|stats| {
            stats.messages_today += 1;
            stats.unique_senders.insert(sender.to_string());
            stats.hourly_traffic[slot] += 1;
        });
        true
    }

    /// Add an estimated token count to the cumulative total.
    pub fn record_token_usage(&self, tokens: f64) {
        if !tokens.is_finite() || tokens < 0.0 {
            warn!("Ignoring invalid token estimate {}", tokens);
            return;
        }
        self.mutate(|stats| stats.token_usage_estimate += tokens);
    }

    /// Count one accepted inbound message received at local time `at`.
    ///
    /// The day rollover and the count happen under one lock, so a message
    /// timestamped just before midnight cannot undo a reset made by a later
    /// one. Returns true if the daily counters were reset first.
    pub fn record_inbound_at(&self, sender: &str, at: NaiveDateTime) -> bool {
        self.mutate(|stats| {
            let reset = roll_over_locked(stats, at.date());
            stats.messages_today += 1;
            stats.unique_senders.insert(sender.to_string());
            stats.hourly_traffic[at.hour() as usize] += 1;
            reset
        })
    }

    /// Reset the daily counters if `today` is later than the stored date.
    ///
    /// Senders and the token estimate are cumulative and kept. An earlier
    /// date never moves the counters back. Returns true if a reset happened.
    pub fn roll_over(&self, today: NaiveDate) -> bool {
        self.mutate(|stats| roll_over_locked(stats, today))
    }

    /// Derive the dashboard snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.lock();

        let uptime = (Utc::now() - stats.start_time).num_seconds().max(0) as u64;
        let hourly_traffic = stats
            .hourly_traffic
            .iter()
            .enumerate()
            .map(|(hour, count)| HourlyCount {
                hour: format!("{:02}:00", hour),
                count: *count,
            })
            .collect();

        StatsSnapshot {
            messages_today: stats.messages_today,
            active_users: stats.unique_senders.len(),
            cost_estimate: stats.token_usage_estimate / 1_000_000.0 * PRICE_PER_MILLION_TOKENS,
            hourly_traffic,
            uptime,
        }
    }

    /// Copy of the raw statistics.
    pub fn stats(&self) -> BotStats {
        self.lock().clone()
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut BotStats) -> R) -> R {
        let mut stats = self.lock();
        let result = f(&mut stats);
        self.flush(&stats);
        result
    }

    fn flush(&self, stats: &BotStats) {
        match json_file::write(&self.path, stats) {
            Ok(()) => debug!("Statistics flushed to {}", self.path.display()),
            Err(e) => warn!("Failed to persist statistics: {}", e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BotStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn roll_over_locked(stats: &mut BotStats, today: NaiveDate) -> bool {
    match stats.stats_date {
        Some(date) if today <= date => false,
        Some(date) => {
            info!(
                "New day ({} -> {}), resetting daily counters ({} messages)",
                date, today, stats.messages_today
            );
            stats.messages_today = 0;
            stats.hourly_traffic = [0; HOURS];
            stats.stats_date = Some(today);
            true
        }
        None => {
            stats.stats_date = Some(today);
            false
        }
    }
}
