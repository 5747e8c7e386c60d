//! Content-addressed cache for analysis results.
//!
//! Sits in front of expensive external analysis calls: results are keyed by
//! an exact-content fingerprint of `(provider, model, diff text)` and expire
//! lazily after a configurable TTL. Caching is strictly best-effort — a
//! corrupt entry reads as a miss, a failed write is swallowed, and no failure
//! here ever propagates to the caller's primary operation.
//!
//! Storage is behind the [`CacheStore`] trait so the fingerprint/TTL logic
//! stays independent of physical storage: [`FsStore`] persists one JSON file
//! per fingerprint under a per-user cache directory, [`MemoryStore`] backs
//! deterministic tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default entry lifetime, in hours.
pub const DEFAULT_TTL_HOURS: u64 = 24;

const ENTRY_EXTENSION: &str = "json";

/// One persisted analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The analysis payload exactly as the external call produced it
    pub result: String,

    /// Creation time, epoch milliseconds
    pub timestamp: i64,

    /// Provider identity the result came from
    pub provider: String,

    /// Model identity the result came from
    pub model: String,
}

/// Aggregate information about the persisted store.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size_bytes: u64,
    pub oldest_timestamp: Option<i64>,
}

/// Minimal key-value surface the cache logic needs from its storage.
///
/// All operations are best-effort: readers return `None` on any failure,
/// writers report success as a plain boolean.
pub trait CacheStore {
    /// Read the raw serialized entry for a key, or `None` if absent/unreadable.
    fn read(&self, key: &str) -> Option<String>;

    /// Write the raw serialized entry for a key; `false` on failure.
    fn write(&self, key: &str, data: &str) -> bool;

    /// Delete a key; `true` if something was removed.
    fn remove(&self, key: &str) -> bool;

    /// Every stored key with its serialized size in bytes.
    fn list(&self) -> Vec<(String, u64)>;
}

/// Filesystem-backed store: one `<fingerprint>.json` per entry.
///
/// The directory is shared process-wide with no locking; a reader racing a
/// writer may observe a truncated entry, which upper layers treat as corrupt.
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store rooted at the per-user cache directory.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("diffsense")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }
}

impl CacheStore for FsStore {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.entry_path(key)).ok()
    }

    fn write(&self, key: &str, data: &str) -> bool {
        // The directory is created lazily, on first write.
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::debug!(dir = %self.dir.display(), error = %e, "Could not create cache directory");
            return false;
        }
        match std::fs::write(self.entry_path(key), data) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        std::fs::remove_file(self.entry_path(key)).is_ok()
    }

    fn list(&self) -> Vec<(String, u64)> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            keys.push((stem.to_string(), size));
        }
        keys
    }
}

/// In-memory store for tests and embedded callers.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, data: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), data.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    fn list(&self) -> Vec<(String, u64)> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.len() as u64))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fingerprint → analysis-result cache with lazy TTL expiry.
pub struct ResultCache {
    store: Box<dyn CacheStore>,
}

impl ResultCache {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Filesystem cache at the given directory.
    pub fn at_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(Box::new(FsStore::new(dir)))
    }

    /// Filesystem cache at the per-user default location.
    pub fn with_default_dir() -> Self {
        Self::at_dir(FsStore::default_dir())
    }

    /// Exact-content fingerprint over provider, model, and the full diff
    /// text. Two diffs differing by a single byte cache independently.
    pub fn fingerprint(diff_text: &str, provider: &str, model: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(provider.as_bytes());
        hasher.update(b":");
        hasher.update(model.as_bytes());
        hasher.update(b":");
        hasher.update(diff_text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Return the cached result for this exact diff/provider/model, if a
    /// fresh entry exists.
    ///
    /// Expiry is enforced here, lazily: an entry older than `ttl_hours` is
    /// deleted and reported as absent. Corrupt or unreadable entries are
    /// misses, never errors.
    pub fn lookup(
        &self,
        diff_text: &str,
        provider: &str,
        model: &str,
        ttl_hours: u64,
    ) -> Option<String> {
        let key = Self::fingerprint(diff_text, provider, model);
        let raw = self.store.read(&key)?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Corrupt cache entry, treating as miss");
                return None;
            }
        };

        if is_expired(entry.timestamp, ttl_hours, now_millis()) {
            tracing::debug!(key = %key, "Cache entry expired, removing");
            self.store.remove(&key);
            return None;
        }

        tracing::debug!(key = %key, provider, model, "Cache hit");
        Some(entry.result)
    }

    /// Persist a result for this exact diff/provider/model, replacing any
    /// previous entry (last write wins). Failures are swallowed — caching
    /// never fails the caller's primary operation.
    pub fn store(&self, diff_text: &str, provider: &str, model: &str, result: &str) {
        let key = Self::fingerprint(diff_text, provider, model);
        let entry = CacheEntry {
            result: result.to_string(),
            timestamp: now_millis(),
            provider: provider.to_string(),
            model: model.to_string(),
        };

        let data = match serde_json::to_string(&entry) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Could not serialize cache entry");
                return;
            }
        };

        if !self.store.write(&key, &data) {
            tracing::debug!(key = %key, "Cache store degraded to no-op");
        }
    }

    /// Delete every entry, returning how many were removed.
    pub fn clear_all(&self) -> usize {
        let mut removed = 0;
        for (key, _) in self.store.list() {
            if self.store.remove(&key) {
                removed += 1;
            }
        }
        removed
    }

    /// Scan the store, summing sizes and tracking the oldest timestamp.
    ///
    /// Entries that fail to parse still count toward `entries` and
    /// `total_size_bytes`, but not toward `oldest_timestamp`.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            entries: 0,
            total_size_bytes: 0,
            oldest_timestamp: None,
        };

        for (key, size) in self.store.list() {
            stats.entries += 1;
            stats.total_size_bytes += size;

            let Some(raw) = self.store.read(&key) else {
                continue;
            };
            let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
                continue;
            };
            stats.oldest_timestamp = Some(match stats.oldest_timestamp {
                Some(oldest) => oldest.min(entry.timestamp),
                None => entry.timestamp,
            });
        }

        stats
    }

    /// Delete entries older than the TTL, returning how many were removed.
    ///
    /// Entries that cannot be read or parsed are corrupt and unsafe to keep:
    /// they are deleted and counted too.
    pub fn prune_expired(&self, ttl_hours: u64) -> usize {
        let now = now_millis();
        let mut removed = 0;

        for (key, _) in self.store.list() {
            let expired = match self.store.read(&key) {
                Some(raw) => match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => is_expired(entry.timestamp, ttl_hours, now),
                    Err(_) => true,
                },
                None => true,
            };

            if expired && self.store.remove(&key) {
                removed += 1;
            }
        }

        removed
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn is_expired(timestamp: i64, ttl_hours: u64, now: i64) -> bool {
    let ttl_millis = ttl_hours as i64 * 3_600_000;
    now - timestamp > ttl_millis
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n";

    fn memory_cache() -> ResultCache {
        ResultCache::new(Box::new(MemoryStore::new()))
    }

    /// Plant an entry with a chosen timestamp, bypassing the public API.
    fn plant_entry(cache: &ResultCache, diff: &str, provider: &str, model: &str, age_ms: i64) {
        let key = ResultCache::fingerprint(diff, provider, model);
        let entry = CacheEntry {
            result: "planted".to_string(),
            timestamp: now_millis() - age_ms,
            provider: provider.to_string(),
            model: model.to_string(),
        };
        assert!(cache
            .store
            .write(&key, &serde_json::to_string(&entry).unwrap()));
    }

    #[test]
    fn test_store_then_lookup() {
        let cache = memory_cache();
        cache.store(DIFF, "anthropic", "claude-sonnet", "looks good");

        let hit = cache.lookup(DIFF, "anthropic", "claude-sonnet", DEFAULT_TTL_HOURS);
        assert_eq!(hit.as_deref(), Some("looks good"));
    }

    #[test]
    fn test_fingerprint_is_exact_match_only() {
        let cache = memory_cache();
        cache.store(DIFF, "anthropic", "claude-sonnet", "result");

        // whitespace change, different provider, different model: all misses
        let respaced = DIFF.replace("+b", "+b ");
        assert!(cache
            .lookup(&respaced, "anthropic", "claude-sonnet", 24)
            .is_none());
        assert!(cache.lookup(DIFF, "openai", "claude-sonnet", 24).is_none());
        assert!(cache.lookup(DIFF, "anthropic", "gpt-4", 24).is_none());
    }

    #[test]
    fn test_ttl_zero_expires_and_removes() {
        let cache = memory_cache();
        plant_entry(&cache, DIFF, "p", "m", 1);

        assert!(cache.lookup(DIFF, "p", "m", 0).is_none());

        // lazy expiry also deleted the entry
        let key = ResultCache::fingerprint(DIFF, "p", "m");
        assert!(cache.store.read(&key).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let cache = memory_cache();
        let key = ResultCache::fingerprint(DIFF, "p", "m");
        cache.store.write(&key, "not json at all {");

        assert!(cache.lookup(DIFF, "p", "m", 24).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = memory_cache();
        cache.store(DIFF, "p", "m", "first");
        cache.store(DIFF, "p", "m", "second");
        assert_eq!(cache.lookup(DIFF, "p", "m", 24).as_deref(), Some("second"));
    }

    #[test]
    fn test_clear_all_counts() {
        let cache = memory_cache();
        cache.store(DIFF, "p", "m", "one");
        cache.store("other diff", "p", "m", "two");

        assert_eq!(cache.clear_all(), 2);
        assert_eq!(cache.clear_all(), 0);
        assert!(cache.lookup(DIFF, "p", "m", 24).is_none());
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let cache = memory_cache();
        plant_entry(&cache, DIFF, "p", "m", 48 * 3_600_000);
        cache.store("fresh diff", "p", "m", "fresh");

        assert_eq!(cache.prune_expired(24), 1);
        assert!(cache.lookup("fresh diff", "p", "m", 24).is_some());
        assert!(cache.lookup(DIFF, "p", "m", 24).is_none());
    }

    #[test]
    fn test_prune_deletes_corrupt_entries() {
        let cache = memory_cache();
        cache.store.write("deadbeef", "{\"truncated\":");
        cache.store(DIFF, "p", "m", "valid");

        assert_eq!(cache.prune_expired(24), 1);
        assert!(cache.lookup(DIFF, "p", "m", 24).is_some());
    }

    #[test]
    fn test_stats_counts_corrupt_size_but_not_timestamp() {
        let cache = memory_cache();
        plant_entry(&cache, DIFF, "p", "m", 5_000);
        cache.store.write("deadbeef", "garbage");

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert!(stats.total_size_bytes > "garbage".len() as u64);
        let oldest = stats.oldest_timestamp.expect("valid entry has a timestamp");
        assert!(oldest <= now_millis() - 5_000);
    }

    #[test]
    fn test_stats_empty_store() {
        let stats = memory_cache().stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert!(stats.oldest_timestamp.is_none());
    }

    #[test]
    fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::at_dir(dir.path().join("cache"));

        // directory is created lazily, on first write
        assert!(!dir.path().join("cache").exists());
        cache.store(DIFF, "anthropic", "claude-sonnet", "persisted");
        assert!(dir.path().join("cache").exists());

        assert_eq!(
            cache
                .lookup(DIFF, "anthropic", "claude-sonnet", 24)
                .as_deref(),
            Some("persisted")
        );

        // entries are one .json file per fingerprint
        let key = ResultCache::fingerprint(DIFF, "anthropic", "claude-sonnet");
        assert!(dir.path().join("cache").join(format!("{key}.json")).exists());
    }

    #[test]
    fn test_fs_store_missing_dir_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::at_dir(dir.path().join("never-created"));

        assert!(cache.lookup(DIFF, "p", "m", 24).is_none());
        assert_eq!(cache.clear_all(), 0);
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.prune_expired(24), 0);
    }

    #[test]
    fn test_fs_store_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");
        let cache = ResultCache::at_dir(&root);
        cache.store(DIFF, "p", "m", "real");
        std::fs::write(root.join("README.txt"), "not an entry").unwrap();

        assert_eq!(cache.stats().entries, 1);
    }
}
