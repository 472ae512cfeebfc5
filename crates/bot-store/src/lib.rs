//! JSON persistence layer for ZapBot.
//!
//! This crate keeps the two durable documents of the bot: the runtime
//! configuration and the usage statistics. Both are loaded at startup merged
//! over code-level defaults and flushed to disk after every change.
//!
//! # Example
//!
//! ```no_run
//! use bot_store::{ConfigStore, StatsAccumulator, DataDir};
//!
//! let dir = DataDir::create(".data")?;
//! let config = ConfigStore::load(dir.config_path());
//! let stats = StatsAccumulator::load(dir.stats_path());
//!
//! if config.get().is_active {
//!     stats.record_inbound("5511999998888", 14);
//! }
//! # Ok::<(), bot_store::StoreError>(())
//! ```

pub mod config_store;
pub mod error;
pub mod json_file;
pub mod stats;

pub use config_store::ConfigStore;
pub use error::{Result, StoreError};
pub use stats::{
    estimate_tokens, BotStats, HourlyCount, StatsAccumulator, StatsSnapshot,
    PRICE_PER_MILLION_TOKENS,
};

use std::path::{Path, PathBuf};

/// File name of the configuration document.
pub const CONFIG_FILE: &str = "bot_config.json";

/// File name of the statistics document.
pub const STATS_FILE: &str = "bot_stats.json";

/// The directory holding both persisted documents.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory, creating it if needed.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Write {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Path of the configuration document.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path of the statistics document.
    pub fn stats_path(&self) -> PathBuf {
        self.root.join(STATS_FILE)
    }
}
