use async_trait::async_trait;

use crate::config::{Lang, Provider};
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Environment variable the API key is read from
    pub api_key_env: &'static str,
}

/// A single translation backend speaking one provider's HTTP API
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate paragraphs in one request.
    ///
    /// The output is index-aligned with `texts`. Empty input yields empty
    /// output without contacting the provider.
    async fn translate(&self, texts: &[String], source: &Lang, target: &Lang) -> Result<Vec<String>>;

    /// Check if the translator is available (e.g., API key configured)
    fn is_available(&self) -> bool {
        true
    }
}

/// Paragraph translation as seen by a reading session.
///
/// Implementations pick the backend from `provider`. Failures carry a
/// message suitable for showing to the reader.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, paragraphs: &[String], provider: Provider, target: &Lang) -> Result<Vec<String>>;
}
