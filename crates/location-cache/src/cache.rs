//! The cache store: in-memory map, JSON-file persistence, lazy expiry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use weather_core::{cache_key, CachedLocation};

use crate::geocoder::{GeocodeError, Geocoder};

/// Cache behavior knobs.
#[derive(Debug, Clone)]
pub struct LocationCacheOptions {
    /// Entries older than this many days are re-resolved on read.
    pub expiry_days: i64,
    /// JSON file the cache is loaded from and rewritten to. `None`
    /// keeps the cache purely in-memory.
    pub persist_path: Option<PathBuf>,
}

impl Default for LocationCacheOptions {
    fn default() -> Self {
        Self {
            expiry_days: 30,
            persist_path: None,
        }
    }
}

/// Counts reported by [`LocationCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}

/// Read-through cache from normalized location keys to resolved
/// coordinates.
///
/// Concurrent resolves of the same uncached key may both reach the
/// geocoder; that race is left unguarded because geocoding is a pure
/// function of the key, so the overwrite is idempotent
/// (last-writer-wins) and the duplicate call merely wasteful.
///
/// Store failures never fail a request: if the backing file cannot be
/// read or written the cache flags itself degraded, logs the event, and
/// keeps serving from memory.
pub struct LocationCache {
    geocoder: Arc<dyn Geocoder>,
    entries: RwLock<HashMap<String, CachedLocation>>,
    expiry_days: i64,
    persist_path: Option<PathBuf>,
    degraded: AtomicBool,
}

impl LocationCache {
    /// Create a cache, loading any persisted entries from disk.
    pub async fn open(geocoder: Arc<dyn Geocoder>, options: LocationCacheOptions) -> Self {
        let cache = Self {
            geocoder,
            entries: RwLock::new(HashMap::new()),
            expiry_days: options.expiry_days,
            persist_path: options.persist_path,
            degraded: AtomicBool::new(false),
        };
        cache.load().await;
        cache
    }

    /// Whether the backing store has failed since startup.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Resolve a raw location input, consulting the cache first.
    ///
    /// On a hit the cached entry is returned untouched. On a miss (or an
    /// expired entry) the geocoder is called with the caller's original
    /// input — qualifiers like "Paris, FR" matter for match quality —
    /// and the result is stored under the normalized key.
    pub async fn resolve(&self, raw: &str) -> Result<CachedLocation, GeocodeError> {
        let key = cache_key(raw);
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.is_expired(self.expiry_days, now) {
                    info!(location = raw, "cached location expired, re-resolving");
                } else {
                    debug!(location = raw, key = %key, "location cache hit");
                    return Ok(entry.clone());
                }
            } else {
                debug!(location = raw, key = %key, "location cache miss");
            }
        }

        let resolved = self.geocoder.geocode(raw).await?;
        let entry = CachedLocation::new(resolved, now);
        {
            let mut entries = self.entries.write().await;
            entries.insert(key, entry.clone());
        }
        self.persist().await;

        Ok(entry)
    }

    /// Store an entry directly under the key derived from `raw`.
    pub async fn insert(&self, raw: &str, entry: CachedLocation) {
        let key = cache_key(raw);
        {
            let mut entries = self.entries.write().await;
            entries.insert(key, entry);
        }
        self.persist().await;
    }

    /// Remove the entry for `raw`, if present.
    pub async fn invalidate(&self, raw: &str) -> bool {
        let key = cache_key(raw);
        let removed = {
            let mut entries = self.entries.write().await;
            entries.remove(&key).is_some()
        };
        if removed {
            info!(location = raw, "invalidated cached location");
            self.persist().await;
        }
        removed
    }

    /// Drop every entry. Returns the number removed.
    pub async fn clear(&self) -> usize {
        let count = {
            let mut entries = self.entries.write().await;
            let count = entries.len();
            entries.clear();
            count
        };
        if count > 0 {
            info!(count, "cleared location cache");
            self.persist().await;
        }
        count
    }

    /// Remove expired entries eagerly. Returns the number removed.
    ///
    /// Expiry is otherwise lazy (checked on read); this exists for
    /// maintenance so the persisted file does not grow without bound.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(self.expiry_days, now));
            before - entries.len()
        };
        if removed > 0 {
            info!(removed, "purged expired location cache entries");
            self.persist().await;
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.entries.read().await;
        let expired = entries
            .values()
            .filter(|entry| entry.is_expired(self.expiry_days, now))
            .count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
        }
    }

    async fn load(&self) {
        let Some(path) = &self.persist_path else {
            return;
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, CachedLocation>>(&bytes) {
                Ok(loaded) => {
                    debug!(entries = loaded.len(), path = %path.display(), "loaded location cache");
                    let mut entries = self.entries.write().await;
                    *entries = loaded;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupted location cache file, starting fresh");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no location cache file yet");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read location cache, continuing uncached");
                self.degraded.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Rewrite the backing file. Writes go to a temp file first so a
    /// crash mid-write cannot corrupt the cache.
    async fn persist(&self) {
        let Some(path) = &self.persist_path else {
            return;
        };
        let snapshot = {
            let entries = self.entries.read().await;
            entries.clone()
        };
        let json = match serde_json::to_vec_pretty(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize location cache");
                self.degraded.store(true, Ordering::Relaxed);
                return;
            }
        };
        let tmp = path.with_extension("tmp");
        let result = async {
            tokio::fs::write(&tmp, &json).await?;
            tokio::fs::rename(&tmp, path).await
        }
        .await;
        match result {
            Ok(()) => {
                if self.degraded.swap(false, Ordering::Relaxed) {
                    info!(path = %path.display(), "location cache store recovered");
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to persist location cache, serving from memory only");
                self.degraded.store(true, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use weather_core::ResolvedLocation;

    /// Stub geocoder that counts calls and derives coordinates from the
    /// input so distinct inputs resolve to distinct places.
    struct StubGeocoder {
        calls: AtomicUsize,
    }

    impl StubGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, location: &str) -> Result<ResolvedLocation, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if location.contains("nowhere") {
                return Err(GeocodeError::NotFound(location.to_string()));
            }
            let seed = location.len() as f64;
            Ok(ResolvedLocation {
                latitude: seed,
                longitude: -seed,
                name: location.split(',').next().unwrap_or(location).to_string(),
                country: "Testland".to_string(),
                timezone: "UTC".to_string(),
            })
        }
    }

    fn options() -> LocationCacheOptions {
        LocationCacheOptions {
            expiry_days: 30,
            persist_path: None,
        }
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(geocoder.clone(), options()).await;

        let first = cache.resolve("London").await.unwrap();
        let second = cache.resolve("london").await.unwrap();

        assert_eq!(first.location, second.location);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn qualified_inputs_get_their_own_entries() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(geocoder.clone(), options()).await;

        let bare = cache.resolve("Paris").await.unwrap();
        let qualified = cache.resolve("Paris, France").await.unwrap();

        assert_eq!(geocoder.call_count(), 2);
        assert_ne!(bare.location.latitude, qualified.location.latitude);
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(geocoder.clone(), options()).await;

        assert!(matches!(
            cache.resolve("nowhere").await,
            Err(GeocodeError::NotFound(_))
        ));
        assert!(matches!(
            cache.resolve("nowhere").await,
            Err(GeocodeError::NotFound(_))
        ));
        // Every failed lookup goes back to the geocoder.
        assert_eq!(geocoder.call_count(), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_re_resolved() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(geocoder.clone(), options()).await;

        let stale = CachedLocation::new(
            ResolvedLocation {
                latitude: 1.0,
                longitude: 2.0,
                name: "Old".to_string(),
                country: String::new(),
                timezone: "auto".to_string(),
            },
            Utc::now() - chrono::Duration::days(31),
        );
        cache.insert("Berlin", stale).await;

        let fresh = cache.resolve("Berlin").await.unwrap();
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(fresh.location.name, "Berlin");
    }

    #[tokio::test]
    async fn purge_removes_only_expired_entries() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(geocoder.clone(), options()).await;

        cache.resolve("Oslo").await.unwrap();
        let stale = CachedLocation::new(
            ResolvedLocation {
                latitude: 0.0,
                longitude: 0.0,
                name: "Stale".to_string(),
                country: String::new(),
                timezone: "auto".to_string(),
            },
            Utc::now() - chrono::Duration::days(45),
        );
        cache.insert("Atlantis", stale).await;

        assert_eq!(cache.stats().await.total_entries, 2);
        assert_eq!(cache.purge_expired().await, 1);
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 0);
    }

    #[tokio::test]
    async fn entries_survive_a_restart_via_the_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location_cache.json");

        let geocoder = Arc::new(StubGeocoder::new());
        {
            let cache = LocationCache::open(
                geocoder.clone(),
                LocationCacheOptions {
                    expiry_days: 30,
                    persist_path: Some(path.clone()),
                },
            )
            .await;
            cache.resolve("Lisbon").await.unwrap();
        }

        let reopened = LocationCache::open(
            geocoder.clone(),
            LocationCacheOptions {
                expiry_days: 30,
                persist_path: Some(path),
            },
        )
        .await;
        reopened.resolve("Lisbon").await.unwrap();

        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn store_failure_degrades_instead_of_failing_the_request() {
        let geocoder = Arc::new(StubGeocoder::new());
        let cache = LocationCache::open(
            geocoder.clone(),
            LocationCacheOptions {
                expiry_days: 30,
                persist_path: Some(PathBuf::from("/nonexistent-dir/location_cache.json")),
            },
        )
        .await;

        let resolved = cache.resolve("Madrid").await;
        assert!(resolved.is_ok());
        assert!(cache.is_degraded());

        // In-memory caching still works while degraded.
        cache.resolve("Madrid").await.unwrap();
        assert_eq!(geocoder.call_count(), 1);
    }
}
