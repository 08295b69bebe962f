use crate::analyzer::metadata::DocumentationSchema;
use dashmap::DashMap;
use serde::Serialize;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Key-value store of schemas by source file.
pub trait SchemaStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<DocumentationSchema>>;

    /// Store `value` under `key`, replacing any previous entry.
    fn add(&self, key: &str, value: Arc<DocumentationSchema>);
}

/// When a stored entry may be served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Freshness {
    /// Entries live until the cache is dropped or cleared.
    #[default]
    Always,
    /// Entries are served only while the source file's modification time
    /// matches the one seen when they were stored.
    ModifiedTime,
}

/// Represents a cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: Arc<T>,
    /// Source file modification time at `add`, if it could be read
    pub source_modified: Option<SystemTime>,
}

/// Cache of documentation schemas.
pub type SchemaCache = FileCache<DocumentationSchema>;

/// In-memory cache keyed by file path
#[derive(Debug)]
pub struct FileCache<T = DocumentationSchema> {
    entries: Arc<DashMap<String, CacheEntry<T>>>,
    freshness: Freshness,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::with_freshness(Freshness::Always)
    }

    pub fn with_freshness(freshness: Freshness) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            freshness,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    fn modified_time(file_path: &str) -> Option<SystemTime> {
        fs::metadata(file_path).and_then(|m| m.modified()).ok()
    }

    /// Cached data for `file_path`, if present and still fresh
    pub fn get(&self, file_path: &str) -> Option<Arc<T>> {
        let found = self.entries.get(file_path).and_then(|entry| match self.freshness {
            Freshness::Always => Some(Arc::clone(&entry.data)),
            Freshness::ModifiedTime => {
                if entry.source_modified == Self::modified_time(file_path) {
                    Some(Arc::clone(&entry.data))
                } else {
                    debug!(file = file_path, "cache entry is stale");
                    None
                }
            }
        });
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store data in cache
    pub fn add(&self, file_path: &str, data: Arc<T>) {
        let source_modified = match self.freshness {
            Freshness::Always => None,
            Freshness::ModifiedTime => Self::modified_time(file_path),
        };
        let entry = CacheEntry { data, source_modified };
        self.entries.insert(file_path.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl SchemaStore for FileCache<DocumentationSchema> {
    fn get(&self, key: &str) -> Option<Arc<DocumentationSchema>> {
        FileCache::get(self, key)
    }

    fn add(&self, key: &str, value: Arc<DocumentationSchema>) {
        FileCache::add(self, key, value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cache_hit_miss() {
        let cache = FileCache::<String>::new();

        // First access - cache miss
        assert!(cache.get("test.ts").is_none());

        cache.add("test.ts", Arc::new("schema".to_string()));

        // Second access - same shared value
        let first = cache.get("test.ts").unwrap();
        let second = cache.get("test.ts").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats, CacheStats { entries: 1, hits: 2, misses: 1 });
    }

    #[test]
    fn add_overwrites_silently() {
        let cache = FileCache::<u32>::new();
        cache.add("a.tsx", Arc::new(1));
        cache.add("a.tsx", Arc::new(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.tsx").as_deref(), Some(&2));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn always_fresh_ignores_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Button.tsx");
        fs::write(&file, "export default 1;").unwrap();
        let key = file.to_string_lossy().to_string();

        let cache = FileCache::<u32>::new();
        cache.add(&key, Arc::new(1));
        fs::remove_file(&file).unwrap();
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn modified_time_invalidates_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Button.tsx");
        fs::write(&file, "export default 1;").unwrap();
        let key = file.to_string_lossy().to_string();

        let cache = FileCache::<u32>::with_freshness(Freshness::ModifiedTime);
        cache.add(&key, Arc::new(1));
        assert!(cache.get(&key).is_some());

        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options().write(true).open(&file).unwrap().set_modified(later).unwrap();
        assert!(cache.get(&key).is_none());
    }
}
