//! Furigana Reader Core Library
//!
//! This library provides the core of a paginated reader for furigana-annotated
//! HTML documents:
//! - Page splitting and paragraph extraction
//! - A reading session with debounced page-change notification
//! - Page translation through DeepL, Google or Claude with session caching
//! - A sled-backed document library

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod html;
pub mod library;
pub mod pagination;
pub mod preview;
pub mod reader;
pub mod translator;
pub mod util;

pub use cache::{
    CacheHit, CacheKey, CacheSource, ParagraphMap, PersistedTranslations, ResponseCache,
    TranslationCache,
};
pub use config::{
    AppConfig, CacheConfig, Lang, LanguageOption, LibraryConfig, Provider, ReaderConfig,
    TranslatorConfig, target_languages, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG,
};
pub use coordinator::{
    Notice, ReaderEvent, RequestOutcome, RetryRequest, SavedTranslation, TranslationCoordinator,
    TranslationPhase,
};
pub use error::{Error, Result};
pub use html::{extract_paragraphs, page_count, split_pages};
pub use library::{
    Document, DocumentHtml, DocumentStore, DocumentUpdate, Folder, Library, LibrarySnapshot, Tag,
};
pub use pagination::Paginator;
pub use preview::HtmlPreview;
pub use reader::{Navigation, ReaderSession, SessionInput};
pub use translator::{CachedTranslationService, TranslationService, Translator, TranslatorRegistry};
pub use util::clear_translation_cache;
