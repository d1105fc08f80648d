mod cached;
mod claude;
mod deepl;
mod google;
mod registry;
mod traits;

pub use cached::CachedTranslationService;
pub use claude::ClaudeTranslator;
pub use deepl::DeepLTranslator;
pub use google::GoogleTranslator;
pub use registry::TranslatorRegistry;
pub use traits::{TranslationService, Translator, TranslatorInfo};

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};

pub(crate) fn http_client(timeout_seconds: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| Error::TranslationRequest(format!("failed to create HTTP client: {e}")))
}

pub(crate) fn send_error(e: &reqwest::Error) -> Error {
    warn!("Request failed: {}", e);
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::TranslationRequest(e.to_string())
    }
}

/// Turn non-success statuses into errors. Rate limits keep the server's
/// `retry-after` hint; nothing here waits or retries.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        warn!("Rate limited, retry after {:?}s", retry_after);
        return Err(Error::RateLimited { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    warn!("API error: {} - {}", status, body);
    Err(Error::Provider(format!("HTTP {status}: {}", body.trim())))
}

pub(crate) const fn ensure_count(expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::TranslationCountMismatch { expected, got })
    }
}
