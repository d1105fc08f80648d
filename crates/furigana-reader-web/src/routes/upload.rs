//! Upload route - annotated HTML for an existing document.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::Multipart;
use furigana_reader_core::{Document, page_count};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::helpers::{ApiError, ResultExt, RouteResult};
use crate::state::AppState;

/// Updated document plus the page count of the stored HTML
#[derive(Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub document: Document,
    pub page_count: usize,
}

fn is_html_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Store the uploaded `file` field as the document's HTML.
pub async fn upload_html(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> RouteResult<Json<UploadResponse>> {
    // 404 before reading the body
    state.library.document(&id)?;

    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::bad_request("請選擇檔案"));
        }
        if !is_html_file(&filename) {
            return Err(ApiError::bad_request("只接受 HTML 檔案"));
        }

        let data = field.bytes().await.or_bad_request()?;
        let html = String::from_utf8(data.to_vec())
            .map_err(|_| ApiError::bad_request("HTML 必須為 UTF-8 編碼"))?;

        let document = state.library.set_document_html(&id, &html)?;
        let pages = page_count(&html);
        info!("Stored {} for {} ({} pages)", filename, id, pages);

        return Ok(Json(UploadResponse {
            document,
            page_count: pages,
        }));
    }

    Err(ApiError::bad_request("請選擇檔案"))
}
