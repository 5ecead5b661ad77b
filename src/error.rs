//! Error types for jsonkv
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for jsonkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("key '{0}' already exists")]
    KeyExists(String),

    #[error("key '{0}' not found or expired")]
    KeyNotFound(String),

    #[error("key is {key_len} characters long, maximum is {max}")]
    KeyTooLong { key_len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Size Limit Errors
    // -------------------------------------------------------------------------
    #[error("value for key '{key}' is {size} bytes serialized, maximum is {max}")]
    ValueTooLarge { key: String, size: u64, max: u64 },

    #[error("store file would be {size} bytes after cleanup, maximum is {max}")]
    FileTooLarge { size: u64, max: u64 },

    // -------------------------------------------------------------------------
    // Batch Errors
    // -------------------------------------------------------------------------
    #[error("batch holds {len} pairs, maximum is {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("key '{0}' appears more than once in the batch")]
    DuplicateKeyInBatch(String),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("store file {} is corrupt: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}
