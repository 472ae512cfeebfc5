//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or persisting a document.
///
/// None of these are fatal to the bot: load failures fall back to defaults
/// and persist failures leave the in-memory state authoritative.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not valid JSON for its type.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document could not be encoded.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The document could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
