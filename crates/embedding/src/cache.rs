//! Process-wide LRU cache for query embeddings.
//!
//! Repeated queries skip the provider entirely. Keys include the provider and
//! model name so a config switch cannot serve stale vectors.

use lru::LruCache;
use once_cell::sync::Lazy;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

const DEFAULT_CAPACITY: usize = 256;

static QUERY_CACHE: Lazy<Mutex<LruCache<String, Vec<f32>>>> = Lazy::new(|| {
    Mutex::new(LruCache::new(
        NonZeroUsize::new(DEFAULT_CAPACITY).expect("default capacity is nonzero"),
    ))
});

pub(crate) fn cache_key(provider: &str, model: &str, text: &str) -> String {
    format!("{provider}:{model}:{text}")
}

/// Look up a cached embedding. A zero capacity disables the cache entirely.
pub(crate) async fn lookup(key: &str, capacity: usize) -> Option<Vec<f32>> {
    let capacity = NonZeroUsize::new(capacity)?;
    let mut cache = QUERY_CACHE.lock().await;
    if cache.cap() != capacity {
        cache.resize(capacity);
    }
    cache.get(key).cloned()
}

/// Store an embedding under the given key.
pub(crate) async fn store(key: String, vector: Vec<f32>, capacity: usize) {
    let Some(capacity) = NonZeroUsize::new(capacity) else {
        return;
    };
    let mut cache = QUERY_CACHE.lock().await;
    if cache.cap() != capacity {
        cache.resize(capacity);
    }
    cache.put(key, vector);
}
