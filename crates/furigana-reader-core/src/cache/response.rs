use std::sync::Arc;

use super::{DiskCache, MemoryCache, ResponseKey};
use crate::config::CacheConfig;
use crate::error::Result;

/// Combined response cache with memory and disk layers, shared across readers
pub struct ResponseCache {
    memory: Option<MemoryCache>,
    disk: Option<DiskCache>,
}

impl ResponseCache {
    /// Create a new response cache from configuration
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let memory = if config.memory_enabled {
            Some(MemoryCache::new(
                config.memory_max_mb,
                config.memory_ttl_seconds,
            ))
        } else {
            None
        };

        let disk = if config.disk_enabled {
            let path = config
                .disk_path
                .clone()
                .unwrap_or_else(crate::util::translation_cache_path);
            Some(DiskCache::new(path)?)
        } else {
            None
        };

        Ok(Self { memory, disk })
    }

    /// Get a cached response
    pub async fn get(&self, key: &ResponseKey) -> Option<Arc<Vec<String>>> {
        let key_str = key.to_string();

        // Try memory cache first
        if let Some(ref memory) = self.memory
            && let Some(value) = memory.get(&key_str).await
        {
            return Some(value);
        }

        // Try disk cache
        if let Some(ref disk) = self.disk
            && let Some(value) = disk.get(&key_str)
        {
            let value = Arc::new(value);
            // Populate memory cache on disk hit
            if let Some(ref memory) = self.memory {
                memory.insert(key_str, Arc::clone(&value)).await;
            }
            return Some(value);
        }

        None
    }

    /// Store a response in cache
    pub async fn insert(&self, key: &ResponseKey, value: Vec<String>) {
        let key_str = key.to_string();
        let value = Arc::new(value);

        if let Some(ref disk) = self.disk
            && let Err(e) = disk.insert(&key_str, &value)
        {
            tracing::warn!("Failed to persist cached response: {}", e);
        }

        if let Some(ref memory) = self.memory {
            memory.insert(key_str, value).await;
        }
    }

    /// Clear all caches
    pub fn clear(&self) {
        if let Some(ref memory) = self.memory {
            memory.clear();
        }

        if let Some(ref disk) = self.disk
            && let Err(e) = disk.clear()
        {
            tracing::warn!("Failed to clear disk cache: {}", e);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Lang, Provider};

    fn key(text: &str) -> ResponseKey {
        ResponseKey::new(Provider::DeepL, &Lang::new("ja"), &Lang::new("en"), &[text.to_string()])
    }

    #[tokio::test]
    async fn test_memory_only_round_trip() {
        let config = CacheConfig {
            disk_enabled: false,
            ..Default::default()
        };
        let cache = ResponseCache::new(&config).unwrap();
        assert!(cache.get(&key("a")).await.is_none());

        cache.insert(&key("a"), vec!["A".to_string()]).await;
        assert_eq!(cache.get(&key("a")).await.unwrap().as_slice(), ["A".to_string()]);

        cache.clear();
        assert!(cache.get(&key("a")).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_layer_serves_hits() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            memory_enabled: false,
            disk_path: Some(dir.path().join("responses")),
            ..Default::default()
        };

        let cache = ResponseCache::new(&config).unwrap();
        cache.insert(&key("b"), vec!["B".to_string()]).await;
        assert_eq!(cache.get(&key("b")).await.unwrap().as_slice(), ["B".to_string()]);
        assert!(cache.get(&key("c")).await.is_none());
    }
}
