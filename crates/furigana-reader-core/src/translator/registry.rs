use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::{TranslationService, Translator};
use super::{ClaudeTranslator, DeepLTranslator, GoogleTranslator};
use crate::config::{Lang, Provider, TranslatorConfig};
use crate::error::{Error, Result};

/// Dispatches translation requests to the backend named by the provider
pub struct TranslatorRegistry {
    translators: HashMap<Provider, Arc<dyn Translator>>,
    source_lang: Lang,
}

impl TranslatorRegistry {
    pub fn new(source_lang: Lang) -> Self {
        Self {
            translators: HashMap::new(),
            source_lang,
        }
    }

    /// Build every provider's backend from configuration.
    ///
    /// Backends without an API key are still registered and fail with
    /// [`Error::MissingApiKey`] when used.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let timeout = config.timeout_seconds;
        let registry = Self::new(config.source_lang.clone())
            .with(
                Provider::DeepL,
                Arc::new(DeepLTranslator::new(
                    config.deepl_api_base.clone(),
                    config.deepl_api_key.clone(),
                    timeout,
                )?),
            )
            .with(
                Provider::Google,
                Arc::new(GoogleTranslator::new(
                    config.google_api_base.clone(),
                    config.google_api_key.clone(),
                    timeout,
                )?),
            )
            .with(
                Provider::Claude,
                Arc::new(ClaudeTranslator::new(
                    config.anthropic_api_base.clone(),
                    config.anthropic_api_key.clone(),
                    config.claude_model.clone(),
                    timeout,
                )?),
            );

        info!(
            "Translators available: {:?}",
            registry.available().iter().map(|p| p.as_str()).collect::<Vec<_>>()
        );
        Ok(registry)
    }

    #[must_use]
    pub fn with(mut self, provider: Provider, translator: Arc<dyn Translator>) -> Self {
        self.translators.insert(provider, translator);
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&Arc<dyn Translator>> {
        self.translators.get(&provider)
    }

    /// Providers whose backend is registered and configured
    pub fn available(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some_and(|t| t.is_available()))
            .collect()
    }
}

#[async_trait]
impl TranslationService for TranslatorRegistry {
    async fn translate(&self, paragraphs: &[String], provider: Provider, target: &Lang) -> Result<Vec<String>> {
        let translator = self
            .get(provider)
            .ok_or_else(|| Error::UnsupportedProvider(provider.to_string()))?;
        debug!("Dispatching {} paragraphs to {}", paragraphs.len(), translator.name());
        translator.translate(paragraphs, &self.source_lang, target).await
    }
}
