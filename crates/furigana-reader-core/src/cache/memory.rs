use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// In-memory response cache using moka with text-size-based eviction.
pub struct MemoryCache {
    cache: Cache<String, Arc<Vec<String>>>,
}

impl MemoryCache {
    pub fn new(max_mb: u64, ttl_seconds: u64) -> Self {
        let max_bytes = max_mb.saturating_mul(1024 * 1024);

        let mut builder = Cache::builder()
            .max_capacity(max_bytes)
            .weigher(|_key: &String, value: &Arc<Vec<String>>| -> u32 {
                // Weight is the total text byte size, capped at u32::MAX
                let bytes: usize = value.iter().map(String::len).sum();
                bytes.try_into().unwrap_or(u32::MAX)
            });

        if ttl_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_seconds));
        }

        Self {
            cache: builder.build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<String>>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: Arc<Vec<String>>) {
        self.cache.insert(key, value).await;
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
