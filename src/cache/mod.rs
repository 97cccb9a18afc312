//! Cache module for storing processed records to disk
//!
//! This module provides a key/value store that persists arbitrary JSON payloads
//! to the filesystem together with the time they were stored. Freshness is
//! decided by the reader: every `get` passes the maximum age it will accept, and
//! entries older than that are removed on the spot.

mod store;

pub use store::{CacheError, CacheStore};
