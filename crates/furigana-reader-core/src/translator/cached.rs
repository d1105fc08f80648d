use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::traits::TranslationService;
use crate::cache::{ResponseCache, ResponseKey};
use crate::config::{Lang, Provider};
use crate::error::Result;

/// Wraps a translation service with the shared response cache.
///
/// Identical requests (provider, languages and paragraph texts) are answered
/// from memory or disk. Only successful responses are cached.
pub struct CachedTranslationService {
    inner: Arc<dyn TranslationService>,
    cache: Arc<ResponseCache>,
    source_lang: Lang,
}

impl CachedTranslationService {
    pub fn new(inner: Arc<dyn TranslationService>, cache: Arc<ResponseCache>, source_lang: Lang) -> Self {
        Self {
            inner,
            cache,
            source_lang,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

#[async_trait]
impl TranslationService for CachedTranslationService {
    async fn translate(&self, paragraphs: &[String], provider: Provider, target: &Lang) -> Result<Vec<String>> {
        if paragraphs.is_empty() {
            return Ok(Vec::new());
        }

        let key = ResponseKey::new(provider, &self.source_lang, target, paragraphs);
        if let Some(hit) = self.cache.get(&key).await {
            debug!("Response cache hit: {}", key);
            return Ok(hit.as_ref().clone());
        }

        let translations = self.inner.translate(paragraphs, provider, target).await?;
        self.cache.insert(&key, translations.clone()).await;
        Ok(translations)
    }
}
