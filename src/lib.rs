//! dexcache library
//!
//! A caching client for PokeAPI creature data. `processor::DataProcessor` is the
//! entry point; the other modules are exposed for the binary and for tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod moves;
pub mod processor;

pub use cache::CacheStore;
pub use error::ProcessError;
pub use processor::DataProcessor;
