//! Error types for the cycle store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the durable store.
///
/// Unlike stage errors, a persistence failure on append is fatal to the
/// driving loop: a cycle that cannot be durably recorded must not be
/// reported as persisted.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The store document could not be read.
    #[error("Failed to read store at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store document could not be written or flushed.
    #[error("Failed to write store at {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// The store document is not valid JSON in the expected shape.
    #[error("Failed to parse store at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// An append reused an existing cycle id.
    #[error("Cycle id {id} already exists in the store")]
    DuplicateId { id: u64 },
}
