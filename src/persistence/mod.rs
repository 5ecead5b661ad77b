//! Persistence Module
//!
//! Full-snapshot persistence of the entry mapping to a single JSON document.
//!
//! ## Responsibilities
//! - Load the mapping from disk (missing file → empty mapping)
//! - Serialize and replace the whole document on every save
//! - Measure serialized size without writing, for limit checks
//!
//! ## File Format
//! ```text
//! {
//!   "<key>": { "value": <any JSON>, "expires_at": <unix seconds> | null },
//!   ...
//! }
//! ```
//!
//! ## Write Path
//! ```text
//! encode ──► temp file (same dir) ──► fsync (optional) ──► rename over target
//! ```
//! A failed write never touches the previous document.

mod store_file;

pub use store_file::{serialized_len, StoreFile};
