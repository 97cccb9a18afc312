//! File-backed cache store for JSON payloads
//!
//! Provides a `CacheStore` that keeps one JSON file per key, each recording the
//! payload and the moment it was stored. Reads are expiry-aware; writes are
//! atomic replacements serialized through a single writer lock.

use chrono::{Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by the underlying storage
///
/// Undecodable entries are not errors: they are removed and reported as misses.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading, writing or removing a cache file failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The payload could not be serialized
    #[error("Failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk layout of a single cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The key this entry was stored under
    key: String,
    /// The cached JSON payload
    payload: T,
    /// Unix epoch milliseconds at which the entry was written
    stored_at_ms: i64,
}

/// Persistent key/value store with lazily evaluated expiry
///
/// Entries live as JSON files in an XDG-compliant cache directory
/// (`~/.cache/dexcache/` on Linux) unless a directory is given explicitly.
/// Clones share the same writer lock, so a store can be handed to several
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Serializes every physical write (upserts and removals)
    write_lock: Arc<Mutex<()>>,
}

impl CacheStore {
    /// Opens a store in the XDG cache directory for `dexcache`
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "dexcache")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Opens a store rooted at a custom directory
    ///
    /// The directory is created on first write.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Directory the store writes into
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the file holding `key`
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(file_name(key))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads the payload stored under `key` if it is no older than `max_age`
    ///
    /// # Returns
    /// * `Ok(Some(value))` for a present, fresh, decodable entry
    /// * `Ok(None)` if the entry is absent, expired, or corrupt; expired and
    ///   corrupt entries are removed as a side effect
    /// * `Err` only when the underlying storage fails
    pub fn get(&self, key: &str, max_age: Duration) -> Result<Option<Value>, CacheError> {
        let path = self.entry_path(key);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let entry = match serde_json::from_slice::<CacheEntry<Value>>(&content) {
            Ok(entry) if entry.key == key => entry,
            Ok(_) | Err(_) => {
                warn!(key, "cache entry is corrupt, removing it");
                self.delete(key)?;
                return Ok(None);
            }
        };

        let age_ms = Utc::now().timestamp_millis() - entry.stored_at_ms;
        if age_ms > max_age.num_milliseconds() {
            debug!(key, age_ms, max_age_ms = max_age.num_milliseconds(), "cache entry expired");
            self.remove_if_unchanged(key, entry.stored_at_ms)?;
            return Ok(None);
        }

        debug!(key, age_ms, "cache hit");
        Ok(Some(entry.payload))
    }

    /// Stores `value` under `key`, replacing any previous entry
    ///
    /// The new file is written beside the old one and renamed over it, so
    /// readers see either the old entry or the new one, never a partial file.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let entry = CacheEntry {
            key: key.to_string(),
            payload: value,
            stored_at_ms: Utc::now().timestamp_millis(),
        };
        let json = serde_json::to_vec(&entry)?;

        let _guard = self.lock();
        fs::create_dir_all(&self.cache_dir)?;
        let mut staged = NamedTempFile::new_in(&self.cache_dir)?;
        staged.write_all(&json)?;
        staged
            .persist(self.entry_path(key))
            .map_err(|e| CacheError::Io(e.error))?;

        debug!(key, bytes = json.len(), "cache entry saved");
        Ok(())
    }

    /// Removes the entry for `key`; a missing entry is not an error
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _guard = self.lock();
        remove_file_if_present(&self.entry_path(key))
    }

    /// Removes an expired entry unless another writer replaced it since it was read
    fn remove_if_unchanged(&self, key: &str, stored_at_ms: i64) -> Result<(), CacheError> {
        let _guard = self.lock();
        let path = self.entry_path(key);
        let rewritten = fs::read(&path)
            .ok()
            .and_then(|content| serde_json::from_slice::<CacheEntry<Value>>(&content).ok())
            .is_some_and(|current| current.stored_at_ms != stored_at_ms);
        if rewritten {
            return Ok(());
        }
        remove_file_if_present(&path)
    }
}

fn remove_file_if_present(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Maps a key to a file name, escaping every byte outside `[A-Za-z0-9_-]`
///
/// `%` is itself escaped, so distinct keys always map to distinct files.
fn file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{:02x}", byte));
        }
    }
    name.push_str(".json");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheStore::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    fn six_hours() -> Duration {
        Duration::hours(6)
    }

    #[test]
    fn test_set_then_get_returns_equal_value() {
        let (cache, _temp_dir) = create_test_cache();
        let value = json!({
            "id": 25,
            "name": "pikachu",
            "types": ["electric"],
            "nested": { "power": null, "pp": 30 }
        });

        cache.set("pikachu", &value).expect("Set should succeed");

        let result = cache.get("pikachu", six_hours()).expect("Get should succeed");
        assert_eq!(result, Some(value));
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result = cache.get("nonexistent_key", six_hours()).expect("Get should succeed");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let (cache, temp_dir) = create_test_cache();
        cache.set("expired_key", &json!({"a": 1})).expect("Set should succeed");

        thread::sleep(StdDuration::from_millis(10));

        let result = cache.get("expired_key", Duration::zero()).expect("Get should succeed");
        assert!(result.is_none(), "Entry older than max age should be absent");
        assert!(
            !temp_dir.path().join("expired_key.json").exists(),
            "Expired entry should be deleted"
        );

        // Gone for any max age until the next set
        let again = cache.get("expired_key", Duration::days(365)).expect("Get should succeed");
        assert!(again.is_none());
    }

    #[test]
    fn test_stale_file_on_disk_is_expired() {
        let (cache, temp_dir) = create_test_cache();
        let stored_at = Utc::now().timestamp_millis() - Duration::hours(7).num_milliseconds();
        let raw = json!({ "key": "old", "payload": {"v": 1}, "stored_at_ms": stored_at });
        fs::write(temp_dir.path().join("old.json"), raw.to_string()).expect("Should write file");

        let result = cache.get("old", six_hours()).expect("Get should succeed");

        assert!(result.is_none());
        assert!(!temp_dir.path().join("old.json").exists());
    }

    #[test]
    fn test_corrupt_entry_is_removed_and_reported_as_miss() {
        let (cache, temp_dir) = create_test_cache();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("Should write file");

        let result = cache.get("broken", six_hours()).expect("Corruption must not surface");

        assert!(result.is_none());
        assert!(!path.exists(), "Corrupt entry should be deleted");
    }

    #[test]
    fn test_entry_for_other_key_is_treated_as_corrupt() {
        let (cache, temp_dir) = create_test_cache();
        let raw = json!({
            "key": "someone-else",
            "payload": 1,
            "stored_at_ms": Utc::now().timestamp_millis()
        });
        fs::write(temp_dir.path().join("mine.json"), raw.to_string()).expect("Should write file");

        assert!(cache.get("mine", six_hours()).expect("Get should succeed").is_none());
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let (cache, _temp_dir) = create_test_cache();

        cache.set("overwrite_key", &json!("first")).expect("First set should succeed");
        cache.set("overwrite_key", &json!("second")).expect("Second set should succeed");

        let result = cache.get("overwrite_key", six_hours()).expect("Get should succeed");
        assert_eq!(result, Some(json!("second")), "Cache should contain latest data");
    }

    #[test]
    fn test_delete_removes_entry_and_ignores_missing() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("gone", &json!(true)).expect("Set should succeed");

        cache.delete("gone").expect("Delete should succeed");
        cache.delete("gone").expect("Deleting twice should be a no-op");

        assert!(cache.get("gone", six_hours()).expect("Get should succeed").is_none());
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache");
        let cache = CacheStore::with_dir(nested_path.clone());

        cache.set("nested_key", &json!(1)).expect("Set should succeed");

        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_keys_cannot_escape_cache_directory() {
        let (cache, temp_dir) = create_test_cache();

        cache.set("../escape", &json!("x")).expect("Set should succeed");

        assert!(!temp_dir.path().parent().unwrap().join("escape.json").exists());
        assert_eq!(
            cache.get("../escape", six_hours()).expect("Get should succeed"),
            Some(json!("x"))
        );
    }

    #[test]
    fn test_file_name_escaping_is_distinct() {
        assert_eq!(file_name("mr-mime"), "mr-mime.json");
        assert_eq!(file_name("all_pokemon"), "all_pokemon.json");
        assert_eq!(file_name("a/b"), "a%2fb.json");
        assert_ne!(file_name("a%2fb"), file_name("a/b"));
    }

    #[test]
    fn test_concurrent_writers_leave_one_complete_entry() {
        let (cache, _temp_dir) = create_test_cache();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || cache.set("shared", &json!({ "writer": i })))
            })
            .collect();
        for handle in handles {
            handle.join().expect("Writer thread panicked").expect("Set should succeed");
        }

        let value = cache
            .get("shared", six_hours())
            .expect("Get should succeed")
            .expect("An entry should exist");
        assert!(value["writer"].as_i64().is_some_and(|w| (0..8).contains(&w)));
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheStore::new() {
            let path_str = cache.dir().to_string_lossy();
            assert!(path_str.contains("dexcache"), "Cache path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
