//! Expiry Module
//!
//! Lazy, on-access expiry. Nothing here runs on a timer: entries are only
//! dropped when an operation sweeps the mapping.
//!
//! ## Responsibilities
//! - Decide which entries are live at a given instant
//! - Sweep a mapping down to its live subset
//! - Provide the clock seam so time can be simulated

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::entry::Entries;

/// Return the live subset of `entries` at `now`
///
/// Pure: the input is untouched. Sweeping an already-swept mapping
/// returns an equal mapping. The engine sweeps in place through
/// [`take_expired`], which always leaves behind what this returns.
pub fn sweep(entries: &Entries, now: f64) -> Entries {
    entries
        .iter()
        .filter(|(_, entry)| entry.is_live(now))
        .map(|(key, entry)| (key.clone(), entry.clone()))
        .collect()
}

/// In-place sweep used by the engine
///
/// Moves the expired entries out of `entries` and returns them, so a caller
/// that fails to persist the sweep can put them back.
pub fn take_expired(entries: &mut Entries, now: f64) -> Entries {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| entry.is_expired(now))
        .map(|(key, _)| key.clone())
        .collect();

    expired
        .into_iter()
        .filter_map(|key| entries.remove_entry(&key))
        .collect()
}
