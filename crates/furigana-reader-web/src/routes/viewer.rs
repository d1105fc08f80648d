//! Viewer routes - stored HTML and single-page previews.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use furigana_reader_core::{
    DocumentHtml, HtmlPreview, Lang, Provider, extract_paragraphs, split_pages,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::helpers::RouteResult;
use crate::state::AppState;

/// Query params for the preview. Missing values fall back to reader defaults.
#[derive(Deserialize, Default)]
pub struct PreviewQuery {
    /// 1-based page, clamped into range
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub ruby: Option<bool>,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(default)]
    pub lang: Option<String>,
}

pub async fn get_document_html(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RouteResult<Json<DocumentHtml>> {
    Ok(Json(state.library.document_html(&id)?))
}

/// Render one page with the document's persisted translations under each paragraph.
pub async fn get_preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> RouteResult<Html<String>> {
    let doc = state.library.document(&id)?;
    let stored = state.library.document_html(&id)?;
    let reader = &state.config.reader;

    let mut pages = split_pages(&stored.html);
    if pages.is_empty() {
        pages.push(stored.html);
    }
    let page = query.page.unwrap_or(1).clamp(1, u32::try_from(pages.len()).unwrap_or(u32::MAX));
    let fragment = &pages[page as usize - 1];

    let provider = query.provider.unwrap_or(reader.default_provider);
    let lang = query
        .lang
        .map_or_else(|| reader.default_target_lang.clone(), Lang::new);
    let paragraph_count = extract_paragraphs(fragment).len();
    let translations = doc.translations.page_entry(provider, &lang, paragraph_count);

    let html = HtmlPreview {
        html: fragment,
        page_count: pages.len(),
        show_ruby: query.ruby.unwrap_or(reader.show_ruby),
        translations: translations.as_deref(),
        is_translating: false,
    }
    .render()?;

    Ok(Html(html))
}
