//! Library routes - folders, tags, documents and stored translations.

use axum::{
    Json,
    extract::{Path, State},
};
use furigana_reader_core::{
    Document, DocumentUpdate, Folder, Lang, LibrarySnapshot, ParagraphMap, Provider, Tag,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::helpers::RouteResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FolderBody {
    pub name: String,
}

#[derive(Deserialize)]
pub struct TagBody {
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    pub name: String,
    pub folder_id: String,
}

#[derive(Deserialize)]
pub struct TranslationsBody {
    pub provider: Provider,
    pub lang: String,
    pub translations: ParagraphMap,
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn get_library(State(state): State<Arc<AppState>>) -> RouteResult<Json<LibrarySnapshot>> {
    Ok(Json(state.library.snapshot()?))
}

pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FolderBody>,
) -> RouteResult<Json<Folder>> {
    let folder = state.library.create_folder(&body.name)?;
    info!("Created folder {} ({})", folder.id, folder.name);
    Ok(Json(folder))
}

pub async fn rename_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<FolderBody>,
) -> RouteResult<Json<Folder>> {
    Ok(Json(state.library.rename_folder(&id, &body.name)?))
}

/// Deletes the folder together with its documents.
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RouteResult<Json<Value>> {
    state.library.delete_folder(&id)?;
    Ok(ok())
}

pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TagBody>,
) -> RouteResult<Json<Tag>> {
    Ok(Json(state.library.create_tag(&body.name, &body.color)?))
}

pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RouteResult<Json<Value>> {
    state.library.delete_tag(&id)?;
    Ok(ok())
}

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DocumentBody>,
) -> RouteResult<Json<Document>> {
    let doc = state.library.create_document(&body.name, &body.folder_id)?;
    info!("Created document {} in {}", doc.id, doc.folder_id);
    Ok(Json(doc))
}

pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<DocumentUpdate>,
) -> RouteResult<Json<Document>> {
    Ok(Json(state.library.update_document(&id, update)?))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RouteResult<Json<Value>> {
    state.library.delete_document(&id)?;
    Ok(ok())
}

/// Merge paragraph translations reported by a reader into the document.
pub async fn update_translations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TranslationsBody>,
) -> RouteResult<Json<Document>> {
    let lang = Lang::new(body.lang);
    let doc = state
        .library
        .merge_translations(&id, body.provider, &lang, body.translations)?;
    Ok(Json(doc))
}
