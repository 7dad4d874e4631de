//! Keyed dataset cache with request de-duplication
//!
//! Each dataset key maps to a source and the outcome of its latest load.
//! Concurrent fetches for one key share a single in-flight load. A failed
//! load clears any previously cached data; callers never see stale episodes
//! after an error.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::config::CacheConfig;
use super::error_handling::{LoadError, LoadResult};
use super::loader::EpisodeSource;
use super::models::Episode;

/// Key the finder registers its episode source under
pub const EPISODES_KEY: &str = "episodes";

type SharedLoad = Shared<BoxFuture<'static, LoadResult<Arc<[Episode]>>>>;

/// Snapshot of one cached dataset
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub data: Option<Arc<[Episode]>>,
    pub error: Option<LoadError>,
    pub is_loading: bool,
    /// When the last load finished
    pub updated_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Whether cached data can be served at `now` without reloading
    pub fn is_fresh(&self, now: DateTime<Utc>, stale_after_seconds: u64) -> bool {
        if self.data.is_none() {
            return false;
        }
        if stale_after_seconds == 0 {
            return true;
        }
        let Some(updated_at) = self.updated_at else {
            return false;
        };
        // a window too large for chrono never expires
        match i64::try_from(stale_after_seconds)
            .ok()
            .and_then(ChronoDuration::try_seconds)
        {
            Some(window) => now.signed_duration_since(updated_at) < window,
            None => true,
        }
    }
}

struct CacheSlot {
    source: Arc<dyn EpisodeSource>,
    entry: CacheEntry,
    in_flight: Option<(u64, SharedLoad)>,
    generation: u64,
}

pub struct DatasetCache {
    config: CacheConfig,
    slots: Mutex<HashMap<String, CacheSlot>>,
}

impl DatasetCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Register (or replace) the source behind `key`
    pub fn with_source(self, key: impl Into<String>, source: Arc<dyn EpisodeSource>) -> Self {
        self.register(key, source);
        self
    }

    pub fn register(&self, key: impl Into<String>, source: Arc<dyn EpisodeSource>) {
        self.slots.lock().insert(
            key.into(),
            CacheSlot {
                source,
                entry: CacheEntry::default(),
                in_flight: None,
                generation: 0,
            },
        );
    }

    /// Cached data when fresh, otherwise load (joining a load already in flight)
    pub async fn fetch(&self, key: &str) -> LoadResult<Arc<[Episode]>> {
        self.run(key, false).await
    }

    /// Load again regardless of cached data (joining a load already in flight)
    pub async fn refetch(&self, key: &str) -> LoadResult<Arc<[Episode]>> {
        self.run(key, true).await
    }

    /// Forget cached data and errors for `key`.
    ///
    /// A load in flight keeps running for whoever awaits it, but its outcome
    /// is no longer recorded.
    pub fn invalidate(&self, key: &str) {
        if let Some(slot) = self.slots.lock().get_mut(key) {
            slot.entry = CacheEntry::default();
            slot.in_flight = None;
            debug!("Invalidated dataset {:?}", key);
        }
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.slots.lock().get(key).map(|slot| slot.entry.clone())
    }

    async fn run(&self, key: &str, force: bool) -> LoadResult<Arc<[Episode]>> {
        let (generation, load) = {
            let mut slots = self.slots.lock();
            let slot = slots.get_mut(key).ok_or_else(|| {
                LoadError::configuration(format!("No source registered for dataset {key:?}"))
            })?;

            if !force && slot.entry.is_fresh(Utc::now(), self.config.stale_after_seconds) {
                if let Some(data) = &slot.entry.data {
                    debug!("Serving dataset {:?} from cache", key);
                    return Ok(data.clone());
                }
            }

            match &slot.in_flight {
                Some((generation, load)) => {
                    debug!("Joining in-flight load of dataset {:?}", key);
                    (*generation, load.clone())
                }
                None => {
                    slot.generation += 1;
                    let source = slot.source.clone();
                    let load: SharedLoad =
                        async move { source.load().await.map(Arc::<[Episode]>::from) }
                            .boxed()
                            .shared();
                    slot.in_flight = Some((slot.generation, load.clone()));
                    slot.entry.is_loading = true;
                    info!("Loading dataset {:?}", key);
                    (slot.generation, load)
                }
            }
        };

        let result = load.await;
        self.record(key, generation, &result);
        result
    }

    fn record(&self, key: &str, generation: u64, result: &LoadResult<Arc<[Episode]>>) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        if !matches!(&slot.in_flight, Some((current, _)) if *current == generation) {
            return;
        }

        slot.in_flight = None;
        slot.entry = CacheEntry {
            data: result.as_ref().ok().cloned(),
            error: result.as_ref().err().cloned(),
            is_loading: false,
            updated_at: Some(Utc::now()),
        };
    }
}
