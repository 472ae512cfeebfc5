//! Persistent store for the active bot configuration.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::{error, info, warn};
use zap_core::{BotConfig, BotConfigPatch};

use crate::error::Result;
use crate::json_file;

/// Holds the active [`BotConfig`] and mirrors it to disk.
///
/// Reads are lock-free snapshots, so the intake filter can consult the
/// configuration on every inbound message without contention. Updates are
/// serialized so the document on disk always matches the last swap.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<BotConfig>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Load the configuration from `path`, merged over the defaults.
    ///
    /// An unreadable or corrupt document is logged and replaced by defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let config = match json_file::read::<BotConfig>(&path) {
            Ok(Some(mut config)) => {
                config.normalize();
                info!("Configuration loaded from {}", path.display());
                config
            }
            Ok(None) => {
                info!("No configuration at {}, using defaults", path.display());
                BotConfig::default()
            }
            Err(e) => {
                error!("Failed to load configuration, using defaults: {}", e);
                BotConfig::default()
            }
        };

        Self::with_config(path, config)
    }

    /// Create a store with an explicit initial configuration.
    pub fn with_config(path: impl Into<PathBuf>, config: BotConfig) -> Self {
        Self {
            path: path.into(),
            current: ArcSwap::from_pointee(config),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the active configuration.
    pub fn get(&self) -> Arc<BotConfig> {
        self.current.load_full()
    }

    /// Shallow-merge a partial update, then persist.
    ///
    /// Returns the new configuration. A failed write is logged; the in-memory
    /// configuration is applied regardless.
    pub fn update(&self, patch: BotConfigPatch) -> Arc<BotConfig> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = BotConfig::clone(&self.current.load());
        next.apply(patch);
        let config = Arc::new(next);
        self.current.store(config.clone());

        if let Err(e) = self.persist(&config) {
            warn!("Failed to persist configuration: {}", e);
        }
        config
    }

    /// Write the given configuration to disk.
    pub fn persist(&self, config: &BotConfig) -> Result<()> {
        json_file::write(&self.path, config)
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
