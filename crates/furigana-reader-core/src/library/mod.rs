//! Document library: folders, tags, documents and their stored HTML.
//!
//! JSON field names are camelCase so stored records and API payloads keep
//! the shape the reader front end consumes.

mod store;

pub use store::Library;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::cache::{ParagraphMap, PersistedTranslations};
use crate::config::{Lang, Provider};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub folder_id: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Set once HTML has been uploaded
    pub html_file: Option<String>,
    /// Last page the reader reported; 0 until the first page change
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub translations: PersistedTranslations,
    pub created_at: Timestamp,
    pub uploaded_at: Option<Timestamp>,
}

/// Editable document fields. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub folder_id: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub last_page: Option<u32>,
    pub notes: Option<String>,
}

/// Everything in the library at one point in time
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibrarySnapshot {
    pub folders: Vec<Folder>,
    pub tags: Vec<Tag>,
    pub documents: Vec<Document>,
}

/// Stored HTML for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHtml {
    pub html: String,
    pub page_count: usize,
}

/// What a reading session needs from wherever documents live
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_document_html(&self, id: &str) -> Result<DocumentHtml>;

    /// Remember the page the reader settled on
    async fn persist_page_progress(&self, id: &str, page: u32) -> Result<()>;

    /// Merge paragraph translations into the document's store
    async fn persist_translations(
        &self,
        id: &str,
        provider: Provider,
        lang: &Lang,
        mapping: ParagraphMap,
    ) -> Result<Document>;
}
