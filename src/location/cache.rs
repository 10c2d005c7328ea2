//! File-based cache of the visitor's last known position at ~/.cafe/position.json.
//!
//! A position older than the maximum age is treated as missing.

use super::types::{Coordinates, PositionSource, VisitorPosition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default maximum age of a cached position: 5 minutes.
pub const DEFAULT_MAX_AGE_MS: i64 = 5 * 60 * 1000;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lng: f64,
    #[serde(default)]
    city: Option<String>,
    timestamp: i64,
}

/// The position cache.
pub struct PositionCache {
    path: PathBuf,
    entry: Option<CacheEntry>,
    max_age_ms: i64,
}

impl PositionCache {
    /// Load the cache from ~/.cafe/position.json.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load the cache from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let entry = Self::read_file(&path);
        Self { path, entry, max_age_ms: DEFAULT_MAX_AGE_MS }
    }

    pub fn with_max_age(mut self, max_age_ms: i64) -> Self {
        self.max_age_ms = max_age_ms;
        self
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cafe")
            .join("position.json")
    }

    fn read_file(path: &Path) -> Option<CacheEntry> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// The cached position, if present and fresh at `now_ms`.
    pub fn get_at(&self, now_ms: i64) -> Option<VisitorPosition> {
        let entry = self.entry.as_ref()?;
        if now_ms - entry.timestamp > self.max_age_ms {
            tracing::debug!(age_ms = now_ms - entry.timestamp, "cached position expired");
            return None;
        }
        Some(VisitorPosition {
            coordinates: Coordinates::new(entry.lat, entry.lng),
            source: PositionSource::Cache,
            city: entry.city.clone(),
            timestamp: entry.timestamp,
        })
    }

    /// The cached position, if present and fresh now.
    pub fn get(&self) -> Option<VisitorPosition> {
        self.get_at(chrono::Utc::now().timestamp_millis())
    }

    /// Remember a freshly acquired position and persist it to disk.
    pub fn put(&mut self, position: &VisitorPosition) {
        self.entry = Some(CacheEntry {
            lat: position.coordinates.lat,
            lng: position.coordinates.lng,
            city: position.city.clone(),
            timestamp: position.timestamp,
        });
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entry = None;
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove position cache");
            }
        }
    }

    fn persist(&self) {
        let Some(entry) = &self.entry else { return };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "could not create position cache directory");
                return;
            }
        }
        match serde_json::to_string_pretty(entry) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "could not write position cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize position cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (PositionCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("position.json");
        (PositionCache::load_from(path), dir)
    }

    fn position_at(timestamp: i64) -> VisitorPosition {
        VisitorPosition {
            coordinates: Coordinates::new(40.7580, -73.9855),
            source: PositionSource::Ip,
            city: Some("New York".into()),
            timestamp,
        }
    }

    #[test]
    fn test_put_get() {
        let (mut cache, _dir) = test_cache();
        cache.put(&position_at(1_000_000));

        let pos = cache.get_at(1_000_000 + 60_000).unwrap();
        assert_eq!(pos.source, PositionSource::Cache);
        assert_eq!(pos.city.as_deref(), Some("New York"));
        assert!((pos.coordinates.lat - 40.7580).abs() < 1e-9);
    }

    #[test]
    fn test_expired_after_max_age() {
        let (mut cache, _dir) = test_cache();
        cache.put(&position_at(1_000_000));
        assert!(cache.get_at(1_000_000 + DEFAULT_MAX_AGE_MS).is_some());
        assert!(cache.get_at(1_000_000 + DEFAULT_MAX_AGE_MS + 1).is_none());
    }

    #[test]
    fn test_custom_max_age() {
        let (cache, dir) = test_cache();
        let mut cache = cache.with_max_age(10);
        cache.put(&position_at(0));
        assert!(cache.get_at(11).is_none());
        drop(dir);
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("position.json");
        let mut cache = PositionCache::load_from(path.clone());
        cache.put(&position_at(5_000));

        let reloaded = PositionCache::load_from(path);
        assert!(reloaded.get_at(5_000).is_some());
    }

    #[test]
    fn test_unwritable_directory_keeps_memory_copy() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let path = blocker.join("position.json");

        let mut cache = PositionCache::load_from(path.clone());
        cache.put(&position_at(7_000));

        assert!(cache.get_at(7_000).is_some());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "file");
    }

    #[test]
    fn test_corrupt_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("position.json");
        fs::write(&path, "not json").unwrap();
        let cache = PositionCache::load_from(path);
        assert!(cache.get_at(0).is_none());
    }

    #[test]
    fn test_clear() {
        let (mut cache, _dir) = test_cache();
        cache.put(&position_at(0));
        cache.clear();
        assert!(cache.get_at(0).is_none());
    }
}
