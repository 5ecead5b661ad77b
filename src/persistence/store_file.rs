//! Store File
//!
//! Reads and atomically rewrites the backing JSON document.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::entry::Entries;
use crate::error::{KvError, Result};

/// Handle on the backing file of one store
#[derive(Debug, Clone)]
pub struct StoreFile {
    /// Target document path
    path: PathBuf,

    /// fsync the temp file before it is renamed into place
    sync_writes: bool,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            path: path.into(),
            sync_writes,
        }
    }

    /// Load the full mapping
    ///
    /// Returns:
    /// - `Ok(entries)` — parsed document, or empty if the file does not exist
    /// - `Err(CorruptStore)` — file exists but is not a valid document
    pub fn load(&self) -> Result<Entries> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| KvError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// Serialize and replace the document; returns bytes written
    pub fn save(&self, entries: &Entries) -> Result<u64> {
        let bytes = self.encode(entries)?;
        self.write_encoded(&bytes)?;
        Ok(bytes.len() as u64)
    }

    /// Serialize the mapping to the exact bytes `save` would write
    pub fn encode(&self, entries: &Entries) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(entries)?)
    }

    /// Serialized size of the mapping, without writing or buffering it
    ///
    /// Measuring form of [`StoreFile::encode`]; the engine checks the limit
    /// on the encoded bytes it is about to write instead.
    pub fn size_of(&self, entries: &Entries) -> Result<u64> {
        serialized_len(entries)
    }

    /// Replace the document with already-encoded bytes
    ///
    /// Writes to a temp file in the same directory, then renames it over the
    /// target so readers only ever see the old or the new snapshot.
    pub fn write_encoded(&self, bytes: &[u8]) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        if self.sync_writes {
            tmp.as_file().sync_all()?;
        }

        // On failure the temp file is dropped (and removed) here
        tmp.persist(&self.path).map_err(|e| KvError::Persistence(e.error))?;
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Size of the document currently on disk
    pub fn disk_size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Directory the temp file must live in for rename to stay atomic
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Number of bytes `value` takes as compact JSON
pub fn serialized_len<T: Serialize + ?Sized>(value: &T) -> Result<u64> {
    let mut counter = ByteCounter::default();
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.count)
}

/// io::Write sink that only counts
#[derive(Default)]
struct ByteCounter {
    count: u64,
}

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
