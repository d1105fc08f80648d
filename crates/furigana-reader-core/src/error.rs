use thiserror::Error;

/// Unified error type for furigana-reader-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Translation operations (provider requests, responses, configuration)
/// - Library operations (folders, tags, documents, stored HTML)
/// - Cache operations (initialization, reading, writing)
/// - Configuration and rendering
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// The provider rejected the request; the message is shown to the reader as-is
    #[error("{0}")]
    Provider(String),

    /// Translation request could not be delivered
    #[error("translation request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from a translation provider
    #[error("invalid translation response: {0}")]
    InvalidResponse(String),

    /// Provider returned a different number of paragraphs than it was sent
    #[error("provider returned {got} translations for {expected} paragraphs")]
    TranslationCountMismatch { expected: usize, got: usize },

    /// Rate limited by translation provider
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// API key not configured for a provider
    #[error("{0} is not configured")]
    MissingApiKey(&'static str),

    /// Provider name not recognised
    #[error("unsupported translation provider: {0}")]
    UnsupportedProvider(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    Timeout,

    // ==========================================================================
    // Library Errors
    // ==========================================================================
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// Document exists but no HTML has been uploaded for it
    #[error("document HTML not found: {0}")]
    DocumentHtmlMissing(String),

    /// Underlying library database failed
    #[error("library store error: {0}")]
    LibraryStore(String),

    // ==========================================================================
    // Cache Errors
    // ==========================================================================
    /// Failed to initialize the cache
    #[error("failed to initialize cache: {0}")]
    CacheInit(String),

    /// Failed to write to cache
    #[error("failed to write to cache: {0}")]
    CacheWrite(String),

    // ==========================================================================
    // Configuration / Rendering Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    /// Preview template failed to render
    #[error("failed to render preview: {0}")]
    Render(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure comes from caller input or local setup rather than
    /// the provider or the network.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey(_) | Self::UnsupportedProvider(_) | Self::ConfigInvalid { .. }
        )
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FolderNotFound(_)
                | Self::TagNotFound(_)
                | Self::DocumentNotFound(_)
                | Self::DocumentHtmlMissing(_)
        )
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Self::LibraryStore(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_verbatim() {
        let err = Error::Provider("API 金鑰無效".to_string());
        assert_eq!(err.to_string(), "API 金鑰無效");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::MissingApiKey("DEEPL_API_KEY").is_client_error());
        assert!(Error::UnsupportedProvider("bing".into()).is_client_error());
        assert!(!Error::Timeout.is_client_error());
        assert!(Error::DocumentNotFound("doc-1".into()).is_not_found());
        assert!(!Error::Timeout.is_not_found());
    }

    #[test]
    fn test_rate_limited_display() {
        let err = Error::RateLimited { retry_after: Some(5) };
        assert_eq!(err.to_string(), "translation rate limited, retry after 5 seconds");
        assert_eq!(Error::RateLimited { retry_after: None }.to_string(), "translation rate limited");
    }
}
