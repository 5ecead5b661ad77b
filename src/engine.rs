//! Engine Module
//!
//! The store engine: the cached mapping, the lock around it, and the four
//! public operations built from the sweeper and the store file.
//!
//! ## Responsibilities
//! - Serialize every operation behind one lock
//! - Sweep expired entries before any check or lookup
//! - Enforce key, value, batch and file size limits before mutating
//! - Persist a full snapshot after every mutation, rolling back on failure

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::entry::{Entries, Entry};
use crate::error::{KvError, Result};
use crate::expiry::{self, Clock, SystemClock};
use crate::persistence::{serialized_len, StoreFile};

/// The main storage engine
///
/// ## Concurrency Model: one coarse lock
///
/// - Every operation holds `entries` for its full duration:
///   sweep → validate → mutate → persist
/// - The guard is scoped, so it is released on every return path,
///   including validation and persistence errors
/// - No per-key locking: batch atomicity and full-snapshot writes
///   both depend on seeing the whole mapping at once
///
/// Share across threads with `Arc<Engine>`. Only one engine per file is
/// supported; other processes writing the same file are not coordinated.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Backing JSON document
    file: StoreFile,

    /// Time source for expiry
    clock: Arc<dyn Clock>,

    /// Cached mapping, kept equal to the last successful snapshot
    /// modulo expired entries
    entries: Mutex<Entries>,
}

impl Engine {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create the backing file (as `{}`) if missing
    /// 3. Load the mapping; a corrupt file fails the open
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default limits with the specified backing file
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Open with an explicit time source
    pub fn open_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let file = StoreFile::new(&config.path, config.sync_writes);

        if !file.exists() {
            warn!(path = %file.path().display(), "store file not found, creating an empty store");
            file.save(&Entries::new())?;
        }

        let entries = file.load().map_err(|e| {
            error!(path = %file.path().display(), error = %e, "failed to load store file");
            e
        })?;

        info!(
            path = %file.path().display(),
            entries = entries.len(),
            "store opened"
        );

        Ok(Self {
            config,
            file,
            clock,
            entries: Mutex::new(entries),
        })
    }

    /// Create a new key
    ///
    /// Fails with:
    /// - `KeyTooLong` / `ValueTooLarge` before anything is touched
    /// - `KeyExists` if a live entry holds the key (an expired one is replaced)
    /// - `FileTooLarge` if the snapshot stays over the limit after cleanup
    pub fn create(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        self.check_key(key)?;
        self.check_value(key, &value)?;

        let mut entries = self.entries.lock();
        let now = self.clock.now();
        let swept = expiry::take_expired(&mut entries, now);

        if entries.contains_key(key) {
            self.persist_sweep_or_warn(&mut entries, swept);
            return Err(KvError::KeyExists(key.to_string()));
        }

        entries.insert(key.to_string(), Entry::new(value, now, ttl));
        self.commit_inserts(&mut entries, &[key], swept)?;

        debug!(key, ?ttl, "created key");
        Ok(())
    }

    /// Read the value of a live key
    ///
    /// If the sweep dropped anything, the cleaned mapping is persisted,
    /// so a read can write. When that write fails the read fails too and
    /// the expired entries stay cached until a later sweep persists.
    pub fn read(&self, key: &str) -> Result<Value> {
        self.check_key(key)?;

        let mut entries = self.entries.lock();
        let swept = expiry::take_expired(&mut entries, self.clock.now());
        let value = entries.get(key).map(|entry| entry.value.clone());
        self.persist_sweep(&mut entries, swept)?;

        value.ok_or_else(|| KvError::KeyNotFound(key.to_string()))
    }

    /// Delete a live key
    pub fn delete(&self, key: &str) -> Result<()> {
        self.check_key(key)?;

        let mut entries = self.entries.lock();
        let swept = expiry::take_expired(&mut entries, self.clock.now());

        let Some(removed) = entries.remove(key) else {
            self.persist_sweep_or_warn(&mut entries, swept);
            return Err(KvError::KeyNotFound(key.to_string()));
        };

        if let Err(e) = self.file.save(&entries) {
            entries.insert(key.to_string(), removed);
            entries.extend(swept);
            return Err(e);
        }

        debug!(key, "deleted key");
        Ok(())
    }

    /// Create many keys in one all-or-nothing write
    ///
    /// Pairs are validated in order; the first failing pair decides the
    /// error and nothing from the batch is inserted. A key repeated inside
    /// the batch fails with `DuplicateKeyInBatch`. All entries share `ttl`
    /// and one creation time.
    pub fn batch_create<I, K>(&self, pairs: I, ttl: Option<Duration>) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let pairs: Vec<(String, Value)> = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();

        if pairs.len() > self.config.max_batch_size {
            return Err(KvError::BatchTooLarge {
                len: pairs.len(),
                max: self.config.max_batch_size,
            });
        }

        let mut entries = self.entries.lock();
        let now = self.clock.now();
        let swept = expiry::take_expired(&mut entries, now);

        if let Err(e) = self.validate_batch(&entries, &pairs) {
            self.persist_sweep_or_warn(&mut entries, swept);
            return Err(e);
        }

        if pairs.is_empty() {
            return self.persist_sweep(&mut entries, swept);
        }

        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        let new_entries: Vec<(String, Entry)> = pairs
            .iter()
            .map(|(k, v)| (k.clone(), Entry::new(v.clone(), now, ttl)))
            .collect();
        entries.extend(new_entries);
        self.commit_inserts(&mut entries, &keys, swept)?;

        debug!(count = keys.len(), ?ttl, "batch created");
        Ok(())
    }

    /// Drop expired entries now; returns how many were removed
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut entries = self.entries.lock();
        let swept = expiry::take_expired(&mut entries, self.clock.now());
        let count = swept.len();
        self.persist_sweep(&mut entries, swept)?;
        Ok(count)
    }

    /// Replace the cached mapping with the file's current contents
    ///
    /// On a corrupt file the cache is left as it was.
    pub fn reload(&self) -> Result<()> {
        let mut entries = self.entries.lock();
        let loaded = self.file.load()?;
        info!(path = %self.file.path().display(), entries = loaded.len(), "store reloaded");
        *entries = loaded;
        Ok(())
    }

    // =========================================================================
    // Read-only Views (filtered, never persisted)
    // =========================================================================

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(key)
            .is_some_and(|e| e.is_live(now))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Size of the backing file currently on disk
    pub fn file_size(&self) -> Result<u64> {
        self.file.disk_size()
    }

    /// Entries physically held, expired-but-unswept ones included
    pub fn stored_entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_key(&self, key: &str) -> Result<()> {
        let key_len = key.chars().count();
        if key_len > self.config.max_key_length {
            return Err(KvError::KeyTooLong {
                key_len,
                max: self.config.max_key_length,
            });
        }
        Ok(())
    }

    fn check_value(&self, key: &str, value: &Value) -> Result<()> {
        let size = serialized_len(value)?;
        if size > self.config.max_value_size {
            return Err(KvError::ValueTooLarge {
                key: key.to_string(),
                size,
                max: self.config.max_value_size,
            });
        }
        Ok(())
    }

    /// Per-pair checks against the swept mapping, stopping at the first failure
    fn validate_batch(&self, entries: &Entries, pairs: &[(String, Value)]) -> Result<()> {
        let mut seen = HashSet::with_capacity(pairs.len());
        for (key, value) in pairs {
            self.check_key(key)?;
            self.check_value(key, value)?;
            if !seen.insert(key.as_str()) {
                return Err(KvError::DuplicateKeyInBatch(key.clone()));
            }
            if entries.contains_key(key) {
                return Err(KvError::KeyExists(key.clone()));
            }
        }
        Ok(())
    }

    /// Persist a mapping that only lost the `swept` entries
    ///
    /// On failure the swept entries go back into the cache, so the next
    /// sweep finds and persists them again.
    fn persist_sweep(&self, entries: &mut Entries, swept: Entries) -> Result<()> {
        if swept.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.file.save(entries) {
            entries.extend(swept);
            return Err(e);
        }
        debug!(swept = swept.len(), "persisted expiry sweep");
        Ok(())
    }

    /// Sweep persistence on a path that already failed validation;
    /// the validation error is what the caller sees
    fn persist_sweep_or_warn(&self, entries: &mut Entries, swept: Entries) {
        if let Err(e) = self.persist_sweep(entries, swept) {
            warn!(error = %e, "failed to persist expiry sweep");
        }
    }

    /// Size-check and persist a mapping holding freshly inserted `keys`
    ///
    /// On any failure the inserted keys are removed again and the swept
    /// entries restored unless the rejection itself got persisted.
    fn commit_inserts(&self, entries: &mut Entries, keys: &[&str], mut swept: Entries) -> Result<()> {
        let written = self
            .encode_within_limit(entries, keys, &mut swept)
            .and_then(|bytes| self.file.write_encoded(&bytes));

        if let Err(e) = written {
            for key in keys {
                entries.remove(*key);
            }
            if matches!(e, KvError::FileTooLarge { .. }) {
                self.persist_sweep_or_warn(entries, swept);
            } else {
                entries.extend(swept);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Encode the mapping, sweeping once more if it is over the file limit
    ///
    /// Entries reclaimed by the retry join `swept`, except freshly inserted
    /// ones that already expired.
    fn encode_within_limit(
        &self,
        entries: &mut Entries,
        keys: &[&str],
        swept: &mut Entries,
    ) -> Result<Vec<u8>> {
        let max = self.config.max_file_size;
        let bytes = self.file.encode(entries)?;
        if bytes.len() as u64 <= max {
            return Ok(bytes);
        }

        let reclaimed = expiry::take_expired(entries, self.clock.now());
        debug!(reclaimed = reclaimed.len(), "store file over limit, retried after cleanup");
        for (key, entry) in reclaimed {
            if !keys.contains(&key.as_str()) {
                swept.insert(key, entry);
            }
        }

        let bytes = self.file.encode(entries)?;
        let size = bytes.len() as u64;
        if size > max {
            warn!(size, max, "rejected write, store file over size limit");
            return Err(KvError::FileTooLarge { size, max });
        }
        Ok(bytes)
    }
}
