//! Bounded, time-limited response store.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::key::CacheKey;

/// A serialized response and the instant it was produced.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub created_at: Instant,
    pub payload: Bytes,
}

impl CacheEntry {
    /// Create an entry stamped with the current instant.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self { created_at: Instant::now(), payload: payload.into() }
    }

    /// Create an entry with an explicit creation instant.
    pub fn with_created_at(payload: impl Into<Bytes>, created_at: Instant) -> Self {
        Self { created_at, payload: payload.into() }
    }

    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }

    /// Seconds between `now` and the entry's expiry instant, rounded.
    ///
    /// This is the absolute distance to `created_at + ttl`; for a live entry it
    /// equals the remaining lifetime. A TTL past the clock's range never
    /// expires and reports the TTL itself.
    pub fn max_age(&self, ttl: Duration, now: Instant) -> u64 {
        let Some(expires_at) = self.created_at.checked_add(ttl) else {
            return ttl.as_secs();
        };
        let distance = if now >= expires_at { now - expires_at } else { expires_at - now };
        distance.as_secs_f64().round() as u64
    }
}

/// In-memory LRU cache of serialized responses with a fixed TTL.
///
/// All operations take one internal lock, so concurrent `get`/`put` calls are
/// linearizable. Expired entries are dropped lazily on `get` and in bulk by
/// `purge_expired`.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<LruCache<CacheKey, CacheEntry>>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self { entries: Arc::new(Mutex::new(LruCache::new(capacity))), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }

    /// Look up a live entry, promoting it to most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.peek(key)?.is_expired(self.ttl, now) {
            entries.pop(key);
            tracing::debug!(key = %key.digest(), "dropped expired entry on lookup");
            return None;
        }

        entries.get(key).cloned()
    }

    /// Insert or replace an entry, evicting the least recently used one on overflow.
    pub async fn put(&self, key: CacheKey, entry: CacheEntry) {
        let mut entries = self.entries.lock().await;

        if let Some((evicted, _)) = entries.push(key.clone(), entry)
            && evicted != key
        {
            tracing::debug!(evicted = %evicted.digest(), url = %evicted.url, "evicted least recently used entry");
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }

        expired.len()
    }

    /// Spawn a task that calls `purge_expired` every `period`.
    ///
    /// The caller owns the handle and aborts it on shutdown.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "swept expired cache entries");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
