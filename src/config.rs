//! Configuration for jsonkv
//!
//! Centralized configuration with sensible defaults. The default store path is
//! resolved once, when the config is built, and never re-read mid-operation.

use std::env;
use std::path::PathBuf;

use crate::error::{KvError, Result};

/// File name used when no explicit path is configured
pub const DEFAULT_FILE_NAME: &str = "data_store.json";

/// Default maximum key length, in characters
pub const DEFAULT_MAX_KEY_LENGTH: usize = 32;

/// Default maximum serialized value size (16 KiB)
pub const DEFAULT_MAX_VALUE_SIZE: u64 = 16 * 1024;

/// Default maximum backing file size (1 GiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Default maximum number of pairs in one batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Main configuration for a jsonkv store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Backing JSON document holding the entire mapping
    pub path: PathBuf,

    /// fsync the snapshot before it replaces the backing file
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Limits
    // -------------------------------------------------------------------------
    /// Max key length in characters
    pub max_key_length: usize,

    /// Max serialized size of a single value (in bytes)
    pub max_value_size: u64,

    /// Max size of the backing file (in bytes), checked after cleanup
    pub max_file_size: u64,

    /// Max number of pairs accepted by one batch_create
    pub max_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            sync_writes: true,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject limits that would make every write fail
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(KvError::Config("store path is empty".to_string()));
        }
        if self.max_key_length == 0 {
            return Err(KvError::Config("max_key_length must be > 0".to_string()));
        }
        if self.max_value_size == 0 {
            return Err(KvError::Config("max_value_size must be > 0".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(KvError::Config("max_file_size must be > 0".to_string()));
        }
        if self.max_batch_size == 0 {
            return Err(KvError::Config("max_batch_size must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Platform default location: `<home>/Documents/data_store.json`
///
/// Home is taken from `HOME`, then `USERPROFILE`; if neither is set the file
/// lands in the working directory.
pub fn default_store_path() -> PathBuf {
    let home = env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .or_else(|| env::var_os("USERPROFILE").filter(|h| !h.is_empty()));

    match home {
        Some(home) => PathBuf::from(home).join("Documents").join(DEFAULT_FILE_NAME),
        None => PathBuf::from(DEFAULT_FILE_NAME),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Enable or disable fsync before each snapshot replace
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the maximum key length (in characters)
    pub fn max_key_length(mut self, len: usize) -> Self {
        self.config.max_key_length = len;
        self
    }

    /// Set the maximum serialized value size (in bytes)
    pub fn max_value_size(mut self, size: u64) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the maximum backing file size (in bytes)
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Set the maximum batch size
    pub fn max_batch_size(mut self, count: usize) -> Self {
        self.config.max_batch_size = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
