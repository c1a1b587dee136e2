use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// Validity window for recommendation-backed shelves
pub fn top_releases_window() -> Duration {
    Duration::hours(24)
}

/// Validity window for the dashboard aggregate snapshot
pub fn dashboard_window() -> Duration {
    Duration::minutes(30)
}

/// Background poll frequency; a refresh only runs when the snapshot is stale
pub const REFRESH_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TopReleases,
    DashboardSnapshot,
    GenrePool(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TopReleases => write!(f, "top_releases"),
            CacheKey::DashboardSnapshot => write!(f, "dashboard"),
            CacheKey::GenrePool(genre) => write!(f, "genre:{}", genre.to_lowercase()),
        }
    }
}

struct CacheEntry {
    payload: String,
    stamped: DateTime<Utc>,
}

/// In-process time-windowed cache
///
/// Payloads are stored as serialized JSON and stamped at write time. A
/// read inside the validity window returns the stored bytes unchanged;
/// anything older is a miss and the caller is expected to refresh.
/// Single-flight gating around refreshes lives in the owning service,
/// not here.
#[derive(Default)]
pub struct Cache {
    entries: HashMap<String, CacheEntry>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a cached payload if it is still inside `window`
    pub fn get<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
        window: Duration,
    ) -> AppResult<Option<T>> {
        let entry = match self.entries.get(&key.to_string()) {
            Some(entry) if Utc::now() - entry.stamped < window => entry,
            _ => return Ok(None),
        };

        let payload = serde_json::from_str(&entry.payload)
            .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))?;
        Ok(Some(payload))
    }

    /// Stores a payload stamped with the current time
    pub fn put<T: serde::Serialize>(&mut self, key: &CacheKey, value: &T) {
        self.put_stamped(key, value, Utc::now());
    }

    /// Stores a payload with an explicit stamp; staleness tests use this
    pub fn put_stamped<T: serde::Serialize>(
        &mut self,
        key: &CacheKey,
        value: &T,
        stamped: DateTime<Utc>,
    ) {
        let payload = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        self.entries.insert(key.to_string(), CacheEntry { payload, stamped });
    }

    /// True when the key is missing or its stamp has aged past `window`
    pub fn is_stale(&self, key: &CacheKey, window: Duration) -> bool {
        match self.entries.get(&key.to_string()) {
            Some(entry) => Utc::now() - entry.stamped >= window,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRecord;

    fn record(id: u64, title: &str) -> MovieRecord {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::TopReleases.to_string(), "top_releases");
        assert_eq!(CacheKey::DashboardSnapshot.to_string(), "dashboard");
        assert_eq!(
            CacheKey::GenrePool("Action".to_string()).to_string(),
            "genre:action"
        );
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = Cache::new();
        let result: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::TopReleases, top_releases_window())
            .unwrap();
        assert_eq!(result, None);
        assert!(cache.is_stale(&CacheKey::TopReleases, top_releases_window()));
    }

    #[test]
    fn test_get_within_window_is_idempotent() {
        let mut cache = Cache::new();
        let movies = vec![record(1, "Dune: Part Two"), record(2, "Poor Things")];
        cache.put(&CacheKey::TopReleases, &movies);

        let first: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::TopReleases, top_releases_window())
            .unwrap();
        let second: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::TopReleases, top_releases_window())
            .unwrap();
        assert_eq!(first, Some(movies));
        assert_eq!(first, second);
    }

    #[test]
    fn test_entry_stamped_23_hours_ago_is_served() {
        let mut cache = Cache::new();
        let movies = vec![record(1, "Dune: Part Two")];
        cache.put_stamped(
            &CacheKey::TopReleases,
            &movies,
            Utc::now() - Duration::hours(23),
        );

        let result: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::TopReleases, top_releases_window())
            .unwrap();
        assert_eq!(result, Some(movies));
        assert!(!cache.is_stale(&CacheKey::TopReleases, top_releases_window()));
    }

    #[test]
    fn test_entry_stamped_25_hours_ago_is_a_miss() {
        let mut cache = Cache::new();
        let movies = vec![record(1, "Dune: Part Two")];
        cache.put_stamped(
            &CacheKey::TopReleases,
            &movies,
            Utc::now() - Duration::hours(25),
        );

        let result: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::TopReleases, top_releases_window())
            .unwrap();
        assert_eq!(result, None);
        assert!(cache.is_stale(&CacheKey::TopReleases, top_releases_window()));
    }

    #[test]
    fn test_put_refreshes_stamp() {
        let mut cache = Cache::new();
        cache.put_stamped(
            &CacheKey::DashboardSnapshot,
            &vec![record(1, "Old")],
            Utc::now() - Duration::hours(2),
        );
        assert!(cache.is_stale(&CacheKey::DashboardSnapshot, dashboard_window()));

        cache.put(&CacheKey::DashboardSnapshot, &vec![record(2, "New")]);
        assert!(!cache.is_stale(&CacheKey::DashboardSnapshot, dashboard_window()));
        let result: Option<Vec<MovieRecord>> = cache
            .get(&CacheKey::DashboardSnapshot, dashboard_window())
            .unwrap();
        assert_eq!(result.unwrap()[0].id, 2);
    }
}
