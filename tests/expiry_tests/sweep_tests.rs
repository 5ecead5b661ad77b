//! Tests for the expiry sweeper
//!
//! These tests verify:
//! - Sweep keeps exactly the live entries
//! - Sweep is pure and idempotent
//! - In-place take agrees with sweep and hands back what it removed

use std::time::Duration;

use jsonkv::entry::{Entries, Entry};
use jsonkv::expiry::{sweep, take_expired, Clock, ManualClock};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

/// Entries created at t=0 with TTLs of 0 (none), 10, 20 and 30 seconds
fn staggered_entries() -> Entries {
    let mut entries = Entries::new();
    entries.insert("none".into(), Entry::new(json!(0), 0.0, None));
    for ttl in [10u64, 20, 30] {
        entries.insert(
            format!("ttl{}", ttl),
            Entry::new(json!(ttl), 0.0, Some(Duration::from_secs(ttl))),
        );
    }
    entries
}

fn keys(entries: &Entries) -> Vec<&str> {
    entries.keys().map(String::as_str).collect()
}

// =============================================================================
// Sweep Tests
// =============================================================================

#[test]
fn test_sweep_keeps_live_entries() {
    let entries = staggered_entries();

    assert_eq!(keys(&sweep(&entries, 5.0)), vec!["none", "ttl10", "ttl20", "ttl30"]);
    assert_eq!(keys(&sweep(&entries, 10.0)), vec!["none", "ttl20", "ttl30"]);
    assert_eq!(keys(&sweep(&entries, 25.0)), vec!["none", "ttl30"]);
    assert_eq!(keys(&sweep(&entries, 1e12)), vec!["none"]);
}

#[test]
fn test_sweep_does_not_modify_input() {
    let entries = staggered_entries();
    let snapshot = entries.clone();

    let _ = sweep(&entries, 100.0);

    assert_eq!(entries, snapshot);
}

#[test]
fn test_sweep_is_idempotent() {
    let entries = staggered_entries();

    let once = sweep(&entries, 15.0);
    let twice = sweep(&once, 15.0);

    assert_eq!(once, twice);
}

#[test]
fn test_sweep_empty_mapping() {
    assert!(sweep(&Entries::new(), 0.0).is_empty());
}

// =============================================================================
// Take Tests
// =============================================================================

#[test]
fn test_take_matches_sweep() {
    for now in [0.0, 10.0, 19.5, 30.0, 99.0] {
        let entries = staggered_entries();
        let mut remaining = entries.clone();

        let taken = take_expired(&mut remaining, now);

        assert_eq!(remaining, sweep(&entries, now));
        assert_eq!(taken.len(), entries.len() - remaining.len());
        assert!(taken.keys().all(|key| !remaining.contains_key(key)));
    }
}

#[test]
fn test_take_with_manual_clock() {
    let clock = ManualClock::new(0.0);
    let mut entries = staggered_entries();

    clock.advance(Duration::from_secs(20));
    assert_eq!(keys(&take_expired(&mut entries, clock.now())), vec!["ttl10", "ttl20"]);
    assert!(take_expired(&mut entries, clock.now()).is_empty());
    assert_eq!(keys(&entries), vec!["none", "ttl30"]);
}
