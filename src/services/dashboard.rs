/// Dashboard aggregate service
///
/// The only shared mutable state in the process: owns the cache, the
/// shelf pools and the subscriber registry. Constructed once per
/// session and handed around explicitly; teardown aborts the background
/// refresh task. Subscribers are notified synchronously with the full
/// snapshot on every transition, never a diff.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::{
    cache::{dashboard_window, top_releases_window, Cache, CacheKey, REFRESH_POLL_INTERVAL},
    error::AppResult,
    models::{DashboardSnapshot, MovieRecord, ShelfKey},
    providers::{CompletionClient, MetadataProvider, RatingsProvider},
    services::{
        dedup::{self, ReplaceOutcome, ShelfPlan},
        enrichment::{EnrichmentPipeline, QualityFilter},
        fallback,
        generator::RecommendationGenerator,
    },
};

/// Records shown on the recent-watched shelf
pub const RECENT_SHELF_SIZE: usize = 6;

/// Records shown on the top-releases shelf
pub const TOP_SHELF_SIZE: usize = 4;

/// Now-playing candidates kept as replacement alternatives
const RECENT_POOL_SIZE: usize = 15;

/// Handle identifying one subscriber; pass back to `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(DashboardSnapshot) + Send + Sync>;

struct DashboardState {
    snapshot: DashboardSnapshot,
    cache: Cache,
    /// Original candidate pools per shelf, kept for broken-entry replacement
    pools: HashMap<ShelfKey, Vec<MovieRecord>>,
    /// Single-flight gate: a second refresh trigger while one is in
    /// flight returns immediately and relies on the notification
    refresh_in_flight: bool,
}

pub struct DashboardService {
    metadata: Arc<dyn MetadataProvider>,
    generator: RecommendationGenerator,
    pipeline: EnrichmentPipeline,
    state: Mutex<DashboardState>,
    subscribers: StdMutex<HashMap<u64, Subscriber>>,
    next_subscriber_id: AtomicU64,
}

impl DashboardService {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        ratings: Arc<dyn RatingsProvider>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            metadata: Arc::clone(&metadata),
            generator: RecommendationGenerator::new(completion),
            pipeline: EnrichmentPipeline::new(metadata, ratings),
            state: Mutex::new(DashboardState {
                snapshot: DashboardSnapshot::empty(),
                cache: Cache::new(),
                pools: HashMap::new(),
                refresh_in_flight: false,
            }),
            subscribers: StdMutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Registers a listener invoked synchronously with every snapshot
    /// transition. Callbacks must not subscribe or unsubscribe from
    /// within the callback.
    pub fn subscribe(
        &self,
        callback: impl Fn(DashboardSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .insert(id, Box::new(callback));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .remove(&id.0);
    }

    fn notify(&self, snapshot: &DashboardSnapshot) {
        let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        for callback in subscribers.values() {
            callback(snapshot.clone());
        }
    }

    /// Current aggregate snapshot
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// First `count` recent-watched records
    pub async fn recent_watched(&self, count: usize) -> Vec<MovieRecord> {
        let state = self.state.lock().await;
        state
            .snapshot
            .recent_watched
            .iter()
            .take(count)
            .cloned()
            .collect()
    }

    /// First `count` top releases that actually have a poster
    pub async fn top_releases(&self, count: usize) -> Vec<MovieRecord> {
        let state = self.state.lock().await;
        state
            .snapshot
            .top_releases
            .iter()
            .filter(|m| m.poster_path.is_some())
            .take(count)
            .cloned()
            .collect()
    }

    async fn is_snapshot_stale(&self) -> bool {
        let state = self.state.lock().await;
        state.snapshot.last_updated == 0
            || state
                .cache
                .is_stale(&CacheKey::DashboardSnapshot, dashboard_window())
    }

    /// Refreshes only when the snapshot is empty or stale; a fresh
    /// snapshot is replayed to subscribers without any network traffic
    pub async fn initialize(&self) {
        if self.is_snapshot_stale().await {
            tracing::info!("Dashboard snapshot stale or empty, refreshing");
            self.refresh().await;
        } else {
            tracing::debug!("Dashboard snapshot still fresh, serving cached data");
            let snapshot = self.snapshot().await;
            self.notify(&snapshot);
        }
    }

    /// Full refresh pass: loads both shelves, deduplicates across them,
    /// updates the cache and notifies subscribers
    ///
    /// Single-flight: re-entry while a refresh is in flight returns
    /// immediately. A failed refresh keeps the previous shelves.
    pub async fn refresh(&self) {
        let loading = {
            let mut state = self.state.lock().await;
            if state.refresh_in_flight {
                tracing::debug!("Refresh already in flight, skipping");
                return;
            }
            state.refresh_in_flight = true;
            state.snapshot.is_loading = true;
            state.snapshot.clone()
        };
        self.notify(&loading);

        let result = self.load_shelves().await;

        let settled = {
            let mut state = self.state.lock().await;
            state.refresh_in_flight = false;

            match result {
                Ok((recent_pool, top_pool)) => {
                    let plans = vec![
                        ShelfPlan {
                            label: ShelfKey::TopReleases.to_string(),
                            target: TOP_SHELF_SIZE,
                            pool: top_pool
                                .iter()
                                .filter(|m| m.poster_path.is_some())
                                .cloned()
                                .collect(),
                        },
                        ShelfPlan {
                            label: ShelfKey::RecentWatched.to_string(),
                            target: RECENT_SHELF_SIZE,
                            pool: recent_pool.clone(),
                        },
                    ];
                    let (mut shelves, _) = dedup::fill_shelves(&plans, None);
                    let recent_watched = shelves.pop().unwrap_or_default();
                    let top_releases = shelves.pop().unwrap_or_default();

                    state.pools.insert(ShelfKey::TopReleases, top_pool);
                    state.pools.insert(ShelfKey::RecentWatched, recent_pool);

                    let snapshot = DashboardSnapshot {
                        recent_watched,
                        top_releases,
                        is_loading: false,
                        last_updated: Utc::now().timestamp_millis(),
                    };
                    state.cache.put(&CacheKey::DashboardSnapshot, &snapshot);

                    tracing::info!(
                        recent = snapshot.recent_watched.len(),
                        top = snapshot.top_releases.len(),
                        "Dashboard refreshed"
                    );
                    state.snapshot = snapshot;
                }
                Err(e) => {
                    // Previous shelves stay in place; only the loading flag resets
                    tracing::error!(error = %e, "Dashboard refresh failed, keeping prior data");
                    state.snapshot.is_loading = false;
                }
            }

            state.snapshot.clone()
        };
        self.notify(&settled);
    }

    async fn load_shelves(&self) -> AppResult<(Vec<MovieRecord>, Vec<MovieRecord>)> {
        let (recent, top) = tokio::join!(self.load_recent_watched(), self.load_top_releases());
        Ok((recent, top?))
    }

    /// Now-playing feed filtered to poster-bearing records; degrades to
    /// the static fallback shelf when the provider is unreachable
    async fn load_recent_watched(&self) -> Vec<MovieRecord> {
        match self.metadata.now_playing().await {
            Ok(movies) => {
                let with_posters: Vec<MovieRecord> = movies
                    .into_iter()
                    .filter(|m| m.poster_path.is_some())
                    .take(RECENT_POOL_SIZE)
                    .collect();

                if with_posters.is_empty() {
                    fallback::fallback_recommendations()
                } else {
                    with_posters
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Now-playing feed unavailable, using fallback shelf");
                fallback::fallback_recommendations()
            }
        }
    }

    /// Top releases: served from the 24h cache when fresh, otherwise
    /// regenerated through the recommendation pipeline
    ///
    /// Only a successfully generated shelf is cached. The fallback shelf
    /// is served uncached so the next refresh retries the generator
    /// instead of pinning degraded data for a full day.
    async fn load_top_releases(&self) -> AppResult<Vec<MovieRecord>> {
        {
            let state = self.state.lock().await;
            if let Some(cached) = state
                .cache
                .get::<Vec<MovieRecord>>(&CacheKey::TopReleases, top_releases_window())?
            {
                tracing::debug!("Serving cached top releases");
                return Ok(cached);
            }
        }

        match self
            .generator
            .generate(&RecommendationGenerator::top_releases_prompt())
            .await
        {
            Ok(suggestions) => {
                let movies = self
                    .pipeline
                    .enrich_with_backfill(&suggestions, Some(&QualityFilter::top_releases()))
                    .await;

                let mut state = self.state.lock().await;
                state.cache.put(&CacheKey::TopReleases, &movies);
                Ok(movies)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation generation failed, using fallback shelf");
                Ok(fallback::fallback_recommendations())
            }
        }
    }

    /// Swaps a render-broken entry for the next unused candidate from
    /// the shelf's original pool; the shelf shrinks when none remains
    pub async fn replace_broken_entry(
        &self,
        shelf_key: ShelfKey,
        broken_id: u64,
    ) -> ReplaceOutcome {
        let (outcome, snapshot) = {
            let mut state = self.state.lock().await;

            let in_use: HashSet<u64> = state
                .snapshot
                .recent_watched
                .iter()
                .chain(state.snapshot.top_releases.iter())
                .map(|m| m.id)
                .collect();
            let pool = state.pools.get(&shelf_key).cloned().unwrap_or_default();

            let shelf = match shelf_key {
                ShelfKey::RecentWatched => &mut state.snapshot.recent_watched,
                ShelfKey::TopReleases => &mut state.snapshot.top_releases,
            };
            let outcome = dedup::replace_broken_entry(shelf, &pool, broken_id, &in_use);

            (outcome, state.snapshot.clone())
        };

        if outcome != ReplaceOutcome::NotPresent {
            tracing::info!(shelf = %shelf_key, broken_id, outcome = ?outcome, "Replaced broken entry");
            self.notify(&snapshot);
        }
        outcome
    }

    /// Spawns the periodic staleness check; drop or `stop` the handle to
    /// cancel it
    pub fn start_auto_refresh(self: &Arc<Self>) -> AutoRefreshHandle {
        let service = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_POLL_INTERVAL);
            // The first tick fires immediately; skip it, initialize covers startup
            interval.tick().await;
            loop {
                interval.tick().await;
                if service.is_snapshot_stale().await {
                    service.refresh().await;
                }
            }
        });
        AutoRefreshHandle { task }
    }
}

/// Owner handle for the background refresh task
pub struct AutoRefreshHandle {
    task: JoinHandle<()>,
}

impl AutoRefreshHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
