//! # jsonkv
//!
//! A thread-safe, file-backed key-value store with:
//! - JSON values with optional per-entry TTL
//! - Lazy, on-access expiry (no background timer)
//! - Full-snapshot persistence to a single JSON document
//! - Atomic replace-on-write and all-or-nothing batch inserts
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Callers (threads)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ create / read / delete / batch_create
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │                  (one Mutex, whole op)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Expiry    │          │  StoreFile  │
//!   │  (sweep)    │          │   (JSON)    │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use jsonkv::{Config, Engine};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # fn main() -> jsonkv::Result<()> {
//! let engine = Engine::open(Config::builder().path("store.json").build())?;
//! engine.create("session", json!({"user": 7}), Some(Duration::from_secs(60)))?;
//! assert_eq!(engine.read("session")?, json!({"user": 7}));
//! engine.delete("session")?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod entry;
pub mod expiry;
pub mod persistence;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use entry::{Entries, Entry};
pub use expiry::{Clock, ManualClock, SystemClock};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jsonkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
