use anyhow::{Context, Result};
use furigana_reader_core::{
    AppConfig, CachedTranslationService, Library, ResponseCache, TranslationService,
    TranslatorRegistry,
};
use std::sync::Arc;
use tracing::info;

/// Global application state
pub struct AppState {
    pub library: Library,
    /// Provider dispatch behind the shared response cache
    pub translator: Arc<dyn TranslationService>,
    pub config: AppConfig,
}

impl AppState {
    /// Open the library and response cache described by `config`.
    ///
    /// Fails fast when either store is locked by another process.
    pub fn new(config: AppConfig) -> Result<Self> {
        let library_dir = config.library.resolved_dir();
        let library = Library::open(&library_dir)
            .with_context(|| format!("Failed to open library at {}", library_dir.display()))?;

        let registry = Arc::new(
            TranslatorRegistry::from_config(&config.translator)
                .context("Failed to initialize translators")?,
        );
        let translator: Arc<dyn TranslationService> =
            if config.cache.memory_enabled || config.cache.disk_enabled {
                let cache = ResponseCache::new(&config.cache).context("Failed to open translation cache")?;
                Arc::new(CachedTranslationService::new(
                    registry,
                    Arc::new(cache),
                    config.translator.source_lang.clone(),
                ))
            } else {
                info!("Translation response cache disabled");
                registry
            };

        Ok(Self::with_parts(library, translator, config))
    }

    pub fn with_parts(library: Library, translator: Arc<dyn TranslationService>, config: AppConfig) -> Self {
        Self {
            library,
            translator,
            config,
        }
    }
}
