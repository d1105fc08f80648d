//! Translation route - paragraph batches from the reader front end.

use axum::{Json, extract::State, http::StatusCode};
use furigana_reader_core::{Lang, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::helpers::{ApiError, RouteResult};
use crate::state::AppState;

const UNAVAILABLE: &str = "翻譯服務暫時無法使用";

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub texts: Vec<String>,
    pub provider: String,
    pub target_lang: String,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    pub translations: Vec<String>,
}

/// Translate `texts` with the named provider.
///
/// Caller mistakes (unknown provider, missing API key) answer 400 with the
/// message; anything the provider or network did answers 502.
pub async fn translate_texts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> RouteResult<Json<TranslateResponse>> {
    let provider: Provider = req.provider.parse()?;
    let target = Lang::new(req.target_lang);
    debug!("Translating {} texts via {} into {}", req.texts.len(), provider, target);

    match state.translator.translate(&req.texts, provider, &target).await {
        Ok(translations) => Ok(Json(TranslateResponse { translations })),
        Err(e) if e.is_client_error() => Err(ApiError::bad_request(e.to_string())),
        Err(e) => {
            warn!("Translation via {} failed: {}", provider, e);
            Err(ApiError::new(StatusCode::BAD_GATEWAY, UNAVAILABLE))
        }
    }
}
