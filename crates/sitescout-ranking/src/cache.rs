//! Viewport-keyed TTL cache for slow-changing market lookups.
//!
//! Keys are built from viewport centers rounded to a coarse grid, so nearby
//! searches share an entry. Entries expire on read; nothing is evicted in the
//! background. A lookup, the fetch that follows a miss, and the store are not
//! atomic: two concurrent cold misses on the same cell both fetch and the last
//! write wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sitescout_core::{AppConfig, Coordinates};
use tokio::sync::Mutex;

use crate::types::{PopulationEstimate, RetailAnchor};

/// Source of "now" for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-advanced clock for deterministic expiry in tests.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    cached_at: DateTime<Utc>,
}

/// Generic TTL cache shared across requests.
pub struct ViewportCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ViewportCache<T> {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the cached payload if it is younger than the TTL.
    ///
    /// An expired entry is removed as a side effect.
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if now - entry.cached_at < self.ttl {
            return Some(entry.payload.clone());
        }
        entries.remove(key);
        None
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub async fn put(&self, key: &str, payload: T) {
        let cached_at = self.clock.now();
        self.entries
            .lock()
            .await
            .insert(key.to_string(), CacheEntry { payload, cached_at });
    }

    /// Return the cached payload or run `fetch` and cache its success.
    ///
    /// The lock is not held while `fetch` runs. Errors are returned as-is and
    /// never cached.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            tracing::debug!(key, "viewport cache hit");
            return Ok(hit);
        }
        tracing::debug!(key, "viewport cache miss");
        let payload = fetch().await?;
        self.put(key, payload.clone()).await;
        Ok(payload)
    }
}

/// Build a cache key from a viewport center rounded to `precision` decimals.
///
/// At precision 1 each cell is ~0.1 degree (~7 miles) on a side.
#[must_use]
pub fn viewport_key(kind: &str, center: Coordinates, precision: u32) -> String {
    let scale = 10_f64.powi(i32::try_from(precision).unwrap_or(6));
    // Adding 0.0 turns -0.0 into 0.0 so both sides of the meridian/equator share a key.
    let round = |v: f64| (v * scale).round() / scale + 0.0;
    let places = precision as usize;
    format!(
        "{kind}:{:.places$}:{:.places$}",
        round(center.lat),
        round(center.lng)
    )
}

fn ttl_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// The process-wide caches used by the market context enricher.
pub struct MarketCaches {
    pub population: ViewportCache<PopulationEstimate>,
    pub retail_anchors: ViewportCache<Vec<RetailAnchor>>,
}

impl MarketCaches {
    #[must_use]
    pub fn new(population_ttl: Duration, retail_anchor_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            population: ViewportCache::new(population_ttl, Arc::clone(&clock)),
            retail_anchors: ViewportCache::new(retail_anchor_ttl, clock),
        }
    }

    /// Build caches with the configured TTLs on the wall clock.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            ttl_from_secs(config.population_ttl_secs),
            ttl_from_secs(config.retail_anchor_ttl_secs),
            Arc::new(SystemClock),
        )
    }
}
