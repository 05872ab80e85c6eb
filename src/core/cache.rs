use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default lifetime of a cached upstream response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Time-expiring in-memory cache shared by every clone.
///
/// Value and timestamp are written together under one lock, so readers
/// never observe a half-written entry. Expired entries are dropped lazily
/// when their key is looked up again.
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
    // One lock per key with a fetch in progress.
    inflight: Arc<Mutex<HashMap<K, Arc<Mutex<()>>>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, entry);
    }

    /// Returns the live value for `key`, or runs `fetch` and stores its result.
    ///
    /// Callers missing on the same key at the same time wait for the first
    /// fetch and then read its stored value instead of fetching again. Other
    /// keys are never blocked. A failed fetch stores nothing, so the next
    /// waiter runs its own `fetch`.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        K: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let slot = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key.clone()).or_default())
        };

        let result = {
            let _fetching = slot.lock().await;
            match self.get(&key).await {
                Some(value) => Ok(value),
                None => match fetch().await {
                    Ok(value) => {
                        self.put(key.clone(), value.clone()).await;
                        Ok(value)
                    }
                    Err(e) => Err(e),
                },
            }
        };

        // The last caller holding this slot removes it.
        let mut inflight = self.inflight.lock().await;
        if inflight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2)
        {
            inflight.remove(&key);
        }
        result
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::advance;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = TtlCache::<String, i32>::default();

        // Initially, cache is empty
        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        // Get a non-existent key
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_expiration_evicts_lazily() {
        let cache = TtlCache::<String, i32>::new(Duration::from_secs(20));
        cache.put("key1".to_string(), 123).await;

        advance(Duration::from_secs(19)).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));
        assert_eq!(cache.inner.lock().await.len(), 1);

        advance(Duration::from_secs(1)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        assert!(cache.inner.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_refreshes_timestamp() {
        let cache = TtlCache::<String, i32>::new(Duration::from_secs(20));
        cache.put("key1".to_string(), 1).await;
        advance(Duration::from_secs(15)).await;
        cache.put("key1".to_string(), 2).await;
        advance(Duration::from_secs(15)).await;

        assert_eq!(cache.get(&"key1".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = TtlCache::<String, i32>::default();
        let other = cache.clone();

        cache.put("key1".to_string(), 7).await;
        assert_eq!(other.get(&"key1".to_string()).await, Some(7));
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = TtlCache::<String, u32>::default();
        let fetches = AtomicUsize::new(0);

        let lookups = (0..5).map(|_| {
            cache.get_or_fetch("key1".to_string(), || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<u32, String>(99)
            })
        });

        for value in futures::future::join_all(lookups).await {
            assert_eq!(value, Ok(99));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(cache.inflight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_stored() {
        let cache = TtlCache::<String, u32>::default();

        let failed = cache
            .get_or_fetch("key1".to_string(), || async { Err::<u32, _>("upstream down") })
            .await;
        assert_eq!(failed, Err("upstream down"));
        assert!(cache.get(&"key1".to_string()).await.is_none());

        let recovered = cache
            .get_or_fetch("key1".to_string(), || async { Ok::<u32, &str>(7) })
            .await;
        assert_eq!(recovered, Ok(7));
        assert_eq!(cache.get(&"key1".to_string()).await, Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_tear_entries() {
        let cache = TtlCache::<String, (usize, usize)>::default();

        let writers = (0..32).map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache.put("shared".to_string(), (i, i * 2)).await;
                cache.get(&"shared".to_string()).await
            })
        });

        for handle in futures::future::join_all(writers).await {
            let (a, b) = handle.unwrap().unwrap();
            assert_eq!(b, a * 2);
        }
    }
}
