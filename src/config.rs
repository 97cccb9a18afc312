//! Configuration Module
//!
//! Handles loading runtime settings from environment variables. Command-line
//! flags are applied on top by the binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::POKEAPI_BASE_URL;

/// Default freshness window for cached records: six hours
pub const DEFAULT_CACHE_TTL_SECS: u64 = 6 * 60 * 60;

/// Number of Pokemon listed by the catalog (end of generation IX)
pub const DEFAULT_CATALOG_LIMIT: u32 = 1025;

/// Catalog entries resolved at the same time
pub const DEFAULT_CATALOG_CONCURRENCY: usize = 32;

/// Per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PokeAPI root, always ending in `/`
    pub base_url: String,
    /// Cache directory; `None` means the XDG default
    pub cache_dir: Option<PathBuf>,
    /// How long cached records stay fresh
    pub cache_ttl: Duration,
    /// How many Pokemon the catalog lists
    pub catalog_limit: u32,
    /// How many catalog entries are fetched concurrently
    pub catalog_concurrency: usize,
    /// Timeout applied to every upstream request
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEXCACHE_BASE_URL` - PokeAPI root (default: https://pokeapi.co/api/v2/)
    /// - `DEXCACHE_CACHE_DIR` - Cache directory (default: XDG cache dir)
    /// - `DEXCACHE_CACHE_TTL_SECS` - Freshness window (default: 21600)
    /// - `DEXCACHE_CATALOG_LIMIT` - Catalog size (default: 1025)
    /// - `DEXCACHE_CATALOG_CONCURRENCY` - Catalog fan-out (default: 32)
    /// - `DEXCACHE_REQUEST_TIMEOUT_SECS` - HTTP timeout (default: 15)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: lookup("DEXCACHE_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .map(|v| normalize_base_url(&v))
                .unwrap_or(defaults.base_url),
            cache_dir: lookup("DEXCACHE_CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            cache_ttl: lookup("DEXCACHE_CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            catalog_limit: lookup("DEXCACHE_CATALOG_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.catalog_limit),
            catalog_concurrency: lookup("DEXCACHE_CATALOG_CONCURRENCY")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.catalog_concurrency),
            request_timeout: lookup("DEXCACHE_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Replaces the base URL, normalizing its trailing slash
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: POKEAPI_BASE_URL.to_string(),
            cache_dir: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            catalog_concurrency: DEFAULT_CATALOG_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}
