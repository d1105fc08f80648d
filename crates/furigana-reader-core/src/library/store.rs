use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Document, DocumentHtml, DocumentStore, DocumentUpdate, Folder, LibrarySnapshot, Tag};
use crate::cache::ParagraphMap;
use crate::config::{Lang, Provider};
use crate::error::{Error, Result};
use crate::html::page_count;
use crate::util::open_db;

/// sled-backed library.
///
/// Each entity kind has its own tree keyed by id with JSON values; uploaded
/// HTML lives in a separate tree keyed by document id.
pub struct Library {
    db: Db,
    folders: Tree,
    tags: Tree,
    documents: Tree,
    html: Tree,
    // Serializes read-modify-write sequences across trees
    write_lock: Mutex<()>,
}

fn short_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..8])
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn put<T: Serialize>(tree: &Tree, id: &str, value: &T) -> Result<()> {
    tree.insert(id.as_bytes(), serde_json::to_vec(value)?)?;
    Ok(())
}

fn all<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
    tree.iter()
        .values()
        .map(|value| decode(&value?))
        .collect()
}

impl Library {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = open_db(&path.join("library")).map_err(Error::LibraryStore)?;
        let library = Self {
            folders: db.open_tree("folders")?,
            tags: db.open_tree("tags")?,
            documents: db.open_tree("documents")?,
            html: db.open_tree("html")?,
            db,
            write_lock: Mutex::new(()),
        };

        info!(
            "Opened library at {} ({} documents)",
            path.display(),
            library.documents.len()
        );
        Ok(library)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::LibraryStore("library lock poisoned".to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<LibrarySnapshot> {
        let mut folders: Vec<Folder> = all(&self.folders)?;
        folders.sort_by_key(|f| f.order);
        let mut tags: Vec<Tag> = all(&self.tags)?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        let mut documents: Vec<Document> = all(&self.documents)?;
        documents.sort_by_key(|d| d.created_at);

        Ok(LibrarySnapshot {
            folders,
            tags,
            documents,
        })
    }

    // ==========================================================================
    // Folders
    // ==========================================================================

    pub fn folder(&self, id: &str) -> Result<Folder> {
        self.folders
            .get(id.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()?
            .ok_or_else(|| Error::FolderNotFound(id.to_string()))
    }

    pub fn find_folder_by_name(&self, name: &str) -> Result<Option<Folder>> {
        Ok(all::<Folder>(&self.folders)?
            .into_iter()
            .find(|f| f.name == name))
    }

    pub fn create_folder(&self, name: &str) -> Result<Folder> {
        let _guard = self.lock()?;
        let folder = Folder {
            id: short_id("f"),
            name: name.to_string(),
            order: self.folders.len(),
        };
        put(&self.folders, &folder.id, &folder)?;
        self.flush()?;
        debug!("Created folder {} ({})", folder.id, folder.name);
        Ok(folder)
    }

    pub fn rename_folder(&self, id: &str, name: &str) -> Result<Folder> {
        let _guard = self.lock()?;
        let mut folder = self.folder(id)?;
        folder.name = name.to_string();
        put(&self.folders, id, &folder)?;
        self.flush()?;
        Ok(folder)
    }

    /// Delete a folder together with its documents and their HTML.
    pub fn delete_folder(&self, id: &str) -> Result<()> {
        let _guard = self.lock()?;
        self.folder(id)?;

        let mut removed = 0;
        for doc in all::<Document>(&self.documents)? {
            if doc.folder_id == id {
                self.documents.remove(doc.id.as_bytes())?;
                self.html.remove(doc.id.as_bytes())?;
                removed += 1;
            }
        }
        self.folders.remove(id.as_bytes())?;
        self.flush()?;
        info!("Deleted folder {} and {} documents", id, removed);
        Ok(())
    }

    // ==========================================================================
    // Tags
    // ==========================================================================

    pub fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let _guard = self.lock()?;
        let tag = Tag {
            id: short_id("t"),
            name: name.to_string(),
            color: color.to_string(),
        };
        put(&self.tags, &tag.id, &tag)?;
        self.flush()?;
        Ok(tag)
    }

    /// Delete a tag and detach it from every document
    pub fn delete_tag(&self, id: &str) -> Result<()> {
        let _guard = self.lock()?;
        if self.tags.remove(id.as_bytes())?.is_none() {
            return Err(Error::TagNotFound(id.to_string()));
        }

        for mut doc in all::<Document>(&self.documents)? {
            let before = doc.tag_ids.len();
            doc.tag_ids.retain(|t| t != id);
            if doc.tag_ids.len() != before {
                put(&self.documents, &doc.id, &doc)?;
            }
        }
        self.flush()?;
        Ok(())
    }

    // ==========================================================================
    // Documents
    // ==========================================================================

    pub fn document(&self, id: &str) -> Result<Document> {
        self.documents
            .get(id.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()?
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))
    }

    pub fn create_document(&self, name: &str, folder_id: &str) -> Result<Document> {
        let _guard = self.lock()?;
        self.folder(folder_id)?;

        let doc = Document {
            id: short_id("doc"),
            name: name.to_string(),
            folder_id: folder_id.to_string(),
            tag_ids: Vec::new(),
            html_file: None,
            last_page: 0,
            notes: String::new(),
            translations: Default::default(),
            created_at: Timestamp::now(),
            uploaded_at: None,
        };
        put(&self.documents, &doc.id, &doc)?;
        self.flush()?;
        debug!("Created document {} in {}", doc.id, folder_id);
        Ok(doc)
    }

    /// Read-modify-write one document under the write lock
    fn modify_document(&self, id: &str, apply: impl FnOnce(&mut Document) -> Result<()>) -> Result<Document> {
        let _guard = self.lock()?;
        let mut doc = self.document(id)?;
        apply(&mut doc)?;
        put(&self.documents, id, &doc)?;
        self.flush()?;
        Ok(doc)
    }

    pub fn update_document(&self, id: &str, update: DocumentUpdate) -> Result<Document> {
        if let Some(folder_id) = &update.folder_id {
            self.folder(folder_id)?;
        }

        self.modify_document(id, |doc| {
            if let Some(name) = update.name {
                doc.name = name;
            }
            if let Some(folder_id) = update.folder_id {
                doc.folder_id = folder_id;
            }
            if let Some(tag_ids) = update.tag_ids {
                doc.tag_ids = tag_ids;
            }
            if let Some(last_page) = update.last_page {
                doc.last_page = last_page;
            }
            if let Some(notes) = update.notes {
                doc.notes = notes;
            }
            Ok(())
        })
    }

    pub fn delete_document(&self, id: &str) -> Result<()> {
        let _guard = self.lock()?;
        if self.documents.remove(id.as_bytes())?.is_none() {
            return Err(Error::DocumentNotFound(id.to_string()));
        }
        self.html.remove(id.as_bytes())?;
        self.flush()?;
        Ok(())
    }

    /// Store uploaded HTML, replacing any previous upload
    pub fn set_document_html(&self, id: &str, html: &str) -> Result<Document> {
        let html_file = format!("{id}.html");
        self.modify_document(id, |doc| {
            self.html.insert(id.as_bytes(), html.as_bytes())?;
            doc.html_file = Some(html_file);
            doc.uploaded_at = Some(Timestamp::now());
            Ok(())
        })
    }

    pub fn document_html(&self, id: &str) -> Result<DocumentHtml> {
        let doc = self.document(id)?;
        if doc.html_file.is_none() {
            return Err(Error::DocumentHtmlMissing(id.to_string()));
        }
        let bytes = self
            .html
            .get(id.as_bytes())?
            .ok_or_else(|| Error::DocumentHtmlMissing(id.to_string()))?;
        let html = String::from_utf8_lossy(&bytes).into_owned();

        Ok(DocumentHtml {
            page_count: page_count(&html),
            html,
        })
    }

    /// Merge paragraph translations for one provider and language
    pub fn merge_translations(
        &self,
        id: &str,
        provider: Provider,
        lang: &Lang,
        mapping: ParagraphMap,
    ) -> Result<Document> {
        self.modify_document(id, |doc| {
            doc.translations.merge(provider, lang, mapping);
            Ok(())
        })
    }
}

#[async_trait]
impl DocumentStore for Library {
    async fn fetch_document_html(&self, id: &str) -> Result<DocumentHtml> {
        self.document_html(id)
    }

    async fn persist_page_progress(&self, id: &str, page: u32) -> Result<()> {
        self.modify_document(id, |doc| {
            doc.last_page = page;
            Ok(())
        })
        .map(|_| ())
        .inspect_err(|e| warn!("Failed to save reading progress for {}: {}", id, e))
    }

    async fn persist_translations(
        &self,
        id: &str,
        provider: Provider,
        lang: &Lang,
        mapping: ParagraphMap,
    ) -> Result<Document> {
        self.merge_translations(id, provider, lang, mapping)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::to_paragraph_map;

    const TWO_PAGES: &str =
        r#"<section class="page"><p>一</p></section><section class="page"><p>二</p></section>"#;

    fn open() -> (tempfile::TempDir, Library) {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();
        (dir, library)
    }

    #[test]
    fn test_folder_ids_and_order() {
        let (_dir, lib) = open();
        let a = lib.create_folder("A").unwrap();
        let b = lib.create_folder("B").unwrap();
        assert!(a.id.starts_with("f-"));
        assert_eq!(a.id.len(), 10);
        assert_eq!((a.order, b.order), (0, 1));

        let renamed = lib.rename_folder(&b.id, "B2").unwrap();
        assert_eq!(renamed.name, "B2");
        let names: Vec<_> = lib.snapshot().unwrap().folders.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["A", "B2"]);
        assert!(matches!(lib.rename_folder("f-missing", "x"), Err(Error::FolderNotFound(_))));
    }

    #[test]
    fn test_delete_folder_cascades() {
        let (_dir, lib) = open();
        let keep = lib.create_folder("keep").unwrap();
        let doomed = lib.create_folder("doomed").unwrap();
        let kept = lib.create_document("k", &keep.id).unwrap();
        let gone = lib.create_document("g", &doomed.id).unwrap();
        lib.set_document_html(&gone.id, TWO_PAGES).unwrap();

        lib.delete_folder(&doomed.id).unwrap();
        let snapshot = lib.snapshot().unwrap();
        assert_eq!(snapshot.folders.len(), 1);
        assert_eq!(snapshot.documents.len(), 1);
        assert_eq!(snapshot.documents[0].id, kept.id);
        assert!(matches!(lib.document_html(&gone.id), Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn test_delete_tag_detaches_from_documents() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let red = lib.create_tag("red", "#f00").unwrap();
        let blue = lib.create_tag("blue", "#00f").unwrap();
        assert!(red.id.starts_with("t-"));

        let doc = lib.create_document("d", &folder.id).unwrap();
        lib.update_document(
            &doc.id,
            DocumentUpdate {
                tag_ids: Some(vec![red.id.clone(), blue.id.clone()]),
                ..Default::default()
            },
        )
        .unwrap();

        lib.delete_tag(&red.id).unwrap();
        assert_eq!(lib.document(&doc.id).unwrap().tag_ids, vec![blue.id]);
        assert!(matches!(lib.delete_tag(&red.id), Err(Error::TagNotFound(_))));
    }

    #[test]
    fn test_new_document_defaults() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let doc = lib.create_document("読み物", &folder.id).unwrap();

        assert!(doc.id.starts_with("doc-"));
        assert_eq!(doc.last_page, 0);
        assert!(doc.html_file.is_none());
        assert!(doc.uploaded_at.is_none());
        assert!(doc.translations.is_empty());
        assert!(matches!(
            lib.create_document("x", "f-nope"),
            Err(Error::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let doc = lib.create_document("d", &folder.id).unwrap();

        let updated = lib
            .update_document(
                &doc.id,
                DocumentUpdate {
                    notes: Some("memo".to_string()),
                    last_page: Some(4),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "d");
        assert_eq!(updated.notes, "memo");
        assert_eq!(updated.last_page, 4);
        assert_eq!(updated.created_at, doc.created_at);
    }

    #[test]
    fn test_update_ignores_unknown_json_fields() {
        let update: DocumentUpdate =
            serde_json::from_str(r#"{"name":"n","htmlFile":"evil.html","lastPage":2}"#).unwrap();
        assert_eq!(update.name.as_deref(), Some("n"));
        assert_eq!(update.last_page, Some(2));
    }

    #[test]
    fn test_html_upload_and_page_count() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let doc = lib.create_document("d", &folder.id).unwrap();
        assert!(matches!(lib.document_html(&doc.id), Err(Error::DocumentHtmlMissing(_))));

        let doc = lib.set_document_html(&doc.id, TWO_PAGES).unwrap();
        assert_eq!(doc.html_file, Some(format!("{}.html", doc.id)));
        assert!(doc.uploaded_at.is_some());

        let stored = lib.document_html(&doc.id).unwrap();
        assert_eq!(stored.html, TWO_PAGES);
        assert_eq!(stored.page_count, 2);

        lib.set_document_html(&doc.id, "<p>no pages</p>").unwrap();
        assert_eq!(lib.document_html(&doc.id).unwrap().page_count, 1);
    }

    #[tokio::test]
    async fn test_document_store_persists() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let doc = lib.create_document("d", &folder.id).unwrap();
        let lang = Lang::new("zh-TW");

        lib.persist_page_progress(&doc.id, 3).await.unwrap();
        lib.persist_translations(&doc.id, Provider::DeepL, &lang, to_paragraph_map(&["甲".into(), "乙".into()]))
            .await
            .unwrap();
        let doc = lib
            .persist_translations(&doc.id, Provider::DeepL, &lang, to_paragraph_map(&["丙".into()]))
            .await
            .unwrap();

        assert_eq!(doc.last_page, 3);
        assert_eq!(
            doc.translations.page_entry(Provider::DeepL, &lang, 2),
            Some(vec!["丙".to_string(), "乙".to_string()])
        );
        assert!(lib.persist_page_progress("doc-missing", 1).await.is_err());
    }

    #[test]
    fn test_document_json_is_camel_case() {
        let (_dir, lib) = open();
        let folder = lib.create_folder("f").unwrap();
        let doc = lib.create_document("d", &folder.id).unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        for field in ["folderId", "tagIds", "htmlFile", "lastPage", "createdAt", "uploadedAt"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
