mod disk;
mod key;
mod memory;
mod persisted;
mod response;

pub use disk::DiskCache;
pub use key::{CacheKey, ResponseKey};
pub use memory::MemoryCache;
pub use persisted::{paragraph_key, to_paragraph_map, ParagraphMap, PersistedTranslations};
pub use response::ResponseCache;

use std::collections::HashMap;
use tracing::debug;

/// Which tier satisfied a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Memory,
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub entry: Vec<String>,
    pub source: CacheSource,
}

/// Session-scoped page translation cache.
///
/// The memory tier holds every translation produced or adopted during the
/// session. The persisted tier is the document's stored translations as
/// they were when the session was mounted; it is never written here.
#[derive(Debug, Default)]
pub struct TranslationCache {
    memory: HashMap<CacheKey, Vec<String>>,
    persisted: PersistedTranslations,
}

impl TranslationCache {
    pub fn new(persisted: PersistedTranslations) -> Self {
        Self {
            memory: HashMap::new(),
            persisted,
        }
    }

    /// Memory first, then the persisted store.
    ///
    /// A persisted hit needs translations for every paragraph of the page
    /// and is adopted into memory so later lookups skip the store.
    pub fn lookup(&mut self, key: &CacheKey, paragraph_count: usize) -> Option<CacheHit> {
        if let Some(entry) = self.memory.get(key) {
            return Some(CacheHit {
                entry: entry.clone(),
                source: CacheSource::Memory,
            });
        }

        let entry = self
            .persisted
            .page_entry(key.provider, &key.lang, paragraph_count)?;
        if key.page > 1 {
            // persisted entries carry paragraph indices only, not pages
            debug!(
                "Adopting persisted translations for {} from a store that is not page-qualified",
                key
            );
        } else {
            debug!("Adopting persisted translations for {}", key);
        }
        self.memory.insert(key.clone(), entry.clone());
        Some(CacheHit {
            entry,
            source: CacheSource::Persisted,
        })
    }

    /// Memory tier only
    pub fn get(&self, key: &CacheKey) -> Option<&[String]> {
        self.memory.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.memory.contains_key(key)
    }

    pub fn store(&mut self, key: CacheKey, entry: Vec<String>) {
        self.memory.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Lang, Provider};

    fn persisted() -> PersistedTranslations {
        let mut store = PersistedTranslations::new();
        store.merge(
            Provider::DeepL,
            &Lang::new("zh-TW"),
            to_paragraph_map(&["快取翻譯".to_string()]),
        );
        store
    }

    #[test]
    fn test_store_then_get() {
        let mut cache = TranslationCache::default();
        let key = CacheKey::new(Provider::Google, "en", 2);
        assert!(cache.get(&key).is_none());

        cache.store(key.clone(), vec!["hello".into()]);
        assert_eq!(cache.get(&key).unwrap(), ["hello".to_string()]);
        assert_eq!(cache.lookup(&key, 1).unwrap().source, CacheSource::Memory);
    }

    #[test]
    fn test_persisted_hit_is_adopted() {
        let mut cache = TranslationCache::new(persisted());
        let key = CacheKey::new(Provider::DeepL, "zh-TW", 1);
        assert!(cache.get(&key).is_none());

        let hit = cache.lookup(&key, 1).unwrap();
        assert_eq!(hit.source, CacheSource::Persisted);
        assert_eq!(hit.entry, vec!["快取翻譯".to_string()]);

        assert!(cache.contains(&key));
        assert_eq!(cache.lookup(&key, 1).unwrap().source, CacheSource::Memory);
    }

    #[test]
    fn test_persisted_entry_is_shared_across_pages() {
        let mut cache = TranslationCache::new(persisted());
        let page2 = CacheKey::new(Provider::DeepL, "zh-TW", 2);

        let hit = cache.lookup(&page2, 1).unwrap();
        assert_eq!(hit.source, CacheSource::Persisted);
        assert_eq!(hit.entry, vec!["快取翻譯".to_string()]);

        // adopted under the page it was looked up for only
        assert!(cache.contains(&page2));
        assert!(!cache.contains(&CacheKey::new(Provider::DeepL, "zh-TW", 1)));
    }

    #[test]
    fn test_incomplete_persisted_entry_misses() {
        let mut cache = TranslationCache::new(persisted());
        let key = CacheKey::new(Provider::DeepL, "zh-TW", 1);
        assert!(cache.lookup(&key, 2).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_isolated() {
        let mut cache = TranslationCache::new(persisted());
        cache.store(CacheKey::new(Provider::Google, "en", 1), vec!["a".into()]);

        assert!(cache.lookup(&CacheKey::new(Provider::Claude, "en", 1), 1).is_none());
        assert!(cache.lookup(&CacheKey::new(Provider::Google, "ko", 1), 1).is_none());
        assert!(cache.lookup(&CacheKey::new(Provider::Google, "en", 2), 1).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let mut cache = TranslationCache::default();
        let key = CacheKey::new(Provider::DeepL, "ko", 1);
        cache.store(key.clone(), vec!["old".into()]);
        cache.store(key.clone(), vec!["new".into()]);
        assert_eq!(cache.get(&key).unwrap(), ["new".to_string()]);
    }
}
