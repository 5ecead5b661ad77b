//! Entry definitions
//!
//! Defines the record stored under each key, both in memory and on disk.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The full key → entry mapping held by a store
pub type Entries = BTreeMap<String, Entry>;

/// A stored value with an optional absolute expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Arbitrary JSON value
    pub value: Value,

    /// Expiry timestamp (unix seconds); `None` never expires.
    /// Files written with the older `expiry` field name still load.
    #[serde(default, alias = "expiry")]
    pub expires_at: Option<f64>,
}

impl Entry {
    /// Create an entry written at `now`, expiring `ttl` later
    ///
    /// A zero TTL means no expiry.
    pub fn new(value: Value, now: f64, ttl: Option<Duration>) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| now + ttl.as_secs_f64());
        Self { value, expires_at }
    }

    /// Create an entry that never expires
    pub fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Expired once `now` reaches `expires_at`
    pub fn is_expired(&self, now: f64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    pub fn is_live(&self, now: f64) -> bool {
        !self.is_expired(now)
    }
}
