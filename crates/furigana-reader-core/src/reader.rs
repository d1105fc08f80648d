//! Paginated reading session for one mounted document.
//!
//! A session owns the page fragments, navigation state, the translation
//! coordinator and the page-change debouncer. All methods take `&self`, so a
//! session shared behind an `Arc` can keep navigating while a translation is
//! outstanding.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::cache::{CacheKey, PersistedTranslations};
use crate::config::{Lang, Provider, ReaderConfig};
use crate::coordinator::{ReaderEvent, RequestOutcome, RetryRequest, TranslationCoordinator, TranslationPhase};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::html::split_pages;
use crate::pagination::Paginator;
use crate::preview::HtmlPreview;
use crate::translator::TranslationService;

/// What a session is mounted with
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub html: String,
    /// Page count reported by the document store
    pub page_count: usize,
    pub initial_page: Option<u32>,
    pub persisted: Option<PersistedTranslations>,
}

/// Result of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub page: u32,
    /// Set when the move triggered an automatic translation request
    pub translation: Option<RequestOutcome>,
}

#[derive(Debug)]
struct View {
    paginator: Paginator,
    overlay: bool,
    show_ruby: bool,
    provider: Provider,
    lang: Lang,
}

pub struct ReaderSession {
    pages: Arc<[String]>,
    coordinator: TranslationCoordinator,
    debouncer: Debouncer<u32>,
    view: Mutex<View>,
}

impl ReaderSession {
    pub fn new(
        input: SessionInput,
        service: Arc<dyn TranslationService>,
        events: UnboundedSender<ReaderEvent>,
        config: &ReaderConfig,
    ) -> Self {
        let mut pages = split_pages(&input.html);
        if pages.is_empty() {
            // Unpaginated documents are read as a single page
            pages.push(input.html);
        }
        if pages.len() != input.page_count.max(1) {
            warn!(
                "Document reports {} pages but {} were found; using {}",
                input.page_count,
                pages.len(),
                pages.len()
            );
        }

        let page_count = u32::try_from(pages.len()).unwrap_or(u32::MAX);
        let pages: Arc<[String]> = pages.into();
        let coordinator = TranslationCoordinator::new(
            Arc::clone(&pages),
            input.persisted.unwrap_or_default(),
            service,
            events.clone(),
        );
        let debouncer = Debouncer::new(
            Duration::from_millis(config.page_change_debounce_ms),
            move |page| {
                debug!("Page settled on {}", page);
                if events.send(ReaderEvent::PageChanged(page)).is_err() {
                    debug!("Reader event receiver dropped");
                }
            },
        );

        Self {
            pages,
            coordinator,
            debouncer,
            view: Mutex::new(View {
                paginator: Paginator::new(page_count, input.initial_page),
                overlay: false,
                show_ruby: config.show_ruby,
                provider: config.default_provider,
                lang: config.default_target_lang.clone(),
            }),
        }
    }

    fn view(&self) -> MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn coordinator(&self) -> &TranslationCoordinator {
        &self.coordinator
    }

    pub fn current_page(&self) -> u32 {
        self.view().paginator.current()
    }

    pub fn page_count(&self) -> u32 {
        self.view().paginator.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.view().paginator.has_previous()
    }

    pub fn has_next(&self) -> bool {
        self.view().paginator.has_next()
    }

    pub fn page_input(&self) -> String {
        self.view().paginator.input().to_string()
    }

    pub fn provider(&self) -> Provider {
        self.view().provider
    }

    pub fn lang(&self) -> Lang {
        self.view().lang.clone()
    }

    pub fn overlay(&self) -> bool {
        self.view().overlay
    }

    pub fn show_ruby(&self) -> bool {
        self.view().show_ruby
    }

    /// Phase of the active provider and language
    pub fn phase(&self) -> TranslationPhase {
        let (provider, lang) = self.active_pair();
        self.coordinator.phase(provider, &lang)
    }

    /// False while any translation call is in flight
    pub fn can_translate(&self) -> bool {
        self.coordinator.can_translate()
    }

    pub fn current_paragraphs(&self) -> Vec<String> {
        self.coordinator.paragraphs(self.current_page())
    }

    fn active_pair(&self) -> (Provider, Lang) {
        let view = self.view();
        (view.provider, view.lang.clone())
    }

    fn active_key(&self) -> CacheKey {
        let view = self.view();
        CacheKey::new(view.provider, view.lang.clone(), view.paginator.current())
    }

    /// Translations shown for the current page, if any
    pub fn current_translations(&self) -> Option<Vec<String>> {
        self.coordinator.cached(&self.active_key())
    }

    // ==========================================================================
    // Navigation
    // ==========================================================================

    pub async fn navigate(&self, target: i64) -> Navigation {
        let (before, page) = {
            let mut view = self.view();
            let before = view.paginator.current();
            (before, view.paginator.navigate(target))
        };
        self.after_move(before, page).await
    }

    pub async fn next(&self) -> Navigation {
        let (before, page) = {
            let mut view = self.view();
            let before = view.paginator.current();
            (before, view.paginator.next())
        };
        match page {
            Some(page) => self.after_move(before, page).await,
            None => Navigation {
                page: before,
                translation: None,
            },
        }
    }

    pub async fn previous(&self) -> Navigation {
        let (before, page) = {
            let mut view = self.view();
            let before = view.paginator.current();
            (before, view.paginator.previous())
        };
        match page {
            Some(page) => self.after_move(before, page).await,
            None => Navigation {
                page: before,
                translation: None,
            },
        }
    }

    /// Update the page-number text without navigating
    pub fn set_input(&self, text: impl Into<String>) {
        self.view().paginator.set_input(text);
    }

    /// Navigate to the typed page; unparseable text only resets the input.
    pub async fn commit_input(&self) -> Option<Navigation> {
        let (before, page) = {
            let mut view = self.view();
            let before = view.paginator.current();
            (before, view.paginator.commit_input())
        };
        match page {
            Some(page) => Some(self.after_move(before, page).await),
            None => None,
        }
    }

    async fn after_move(&self, before: u32, page: u32) -> Navigation {
        self.debouncer.schedule(page).await;
        let translation = if page == before {
            None
        } else {
            self.auto_translate(page).await
        };
        Navigation { page, translation }
    }

    /// Request the page when the overlay is on and the active pair was asked for.
    async fn auto_translate(&self, page: u32) -> Option<RequestOutcome> {
        let (overlay, provider, lang) = {
            let view = self.view();
            (view.overlay, view.provider, view.lang.clone())
        };
        if !overlay || self.coordinator.phase(provider, &lang) == TranslationPhase::NotRequested {
            return None;
        }
        Some(self.coordinator.request_translation(page, provider, &lang).await)
    }

    // ==========================================================================
    // Translation controls
    // ==========================================================================

    /// Translate the current page with the active provider and language
    pub async fn translate_now(&self) -> RequestOutcome {
        let (page, provider, lang) = {
            let view = self.view();
            (view.paginator.current(), view.provider, view.lang.clone())
        };
        self.coordinator.mark_requested(provider, &lang);
        self.coordinator.request_translation(page, provider, &lang).await
    }

    pub async fn retry(&self, request: RetryRequest) -> RequestOutcome {
        self.coordinator.retry(request).await
    }

    /// Show or hide the translation overlay.
    ///
    /// Turning it on acts like arriving at the current page.
    pub async fn set_overlay(&self, enabled: bool) -> Option<RequestOutcome> {
        let page = {
            let mut view = self.view();
            view.overlay = enabled;
            view.paginator.current()
        };
        if enabled { self.auto_translate(page).await } else { None }
    }

    pub fn set_ruby(&self, visible: bool) {
        self.view().show_ruby = visible;
    }

    /// Switch provider. Selecting the active one changes nothing.
    pub fn set_provider(&self, provider: Provider) {
        let lang = {
            let mut view = self.view();
            if view.provider == provider {
                return;
            }
            view.provider = provider;
            view.lang.clone()
        };
        self.coordinator.reset_phase(provider, &lang);
    }

    /// Switch target language. Selecting the active one changes nothing.
    pub fn set_lang(&self, lang: impl Into<Lang>) {
        let lang = lang.into();
        let provider = {
            let mut view = self.view();
            if view.lang == lang {
                return;
            }
            view.lang = lang.clone();
            view.provider
        };
        self.coordinator.reset_phase(provider, &lang);
    }

    /// Unmount: a page change still waiting out the quiet interval is dropped.
    pub async fn close(&self) {
        self.debouncer.cancel().await;
    }

    // ==========================================================================
    // Rendering
    // ==========================================================================

    /// Render the current page with the active display settings
    pub fn render(&self) -> Result<String> {
        let (page, page_count, show_ruby, overlay, key) = {
            let view = self.view();
            let page = view.paginator.current();
            (
                page,
                view.paginator.page_count(),
                view.show_ruby,
                view.overlay,
                CacheKey::new(view.provider, view.lang.clone(), page),
            )
        };

        let translations = if overlay { self.coordinator.cached(&key) } else { None };
        let index = usize::try_from(page).map_or(0, |p| p.saturating_sub(1));
        let html = self.pages.get(index).map_or("", String::as_str);

        HtmlPreview {
            html,
            page_count: usize::try_from(page_count).unwrap_or(usize::MAX),
            show_ruby,
            translations: translations.as_deref(),
            is_translating: overlay && self.coordinator.is_in_flight(&key),
        }
        .render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc::unbounded_channel;

    struct Upper;

    #[async_trait]
    impl TranslationService for Upper {
        async fn translate(&self, paragraphs: &[String], _provider: Provider, _lang: &Lang) -> Result<Vec<String>> {
            Ok(paragraphs.iter().map(|p| p.to_uppercase()).collect())
        }
    }

    const DOC: &str = r#"<section class="page"><p>one</p></section><section class="page"><p>two</p></section><section class="page"><p>three</p></section>"#;

    fn session(html: &str, initial: Option<u32>) -> ReaderSession {
        let (tx, _rx) = unbounded_channel();
        ReaderSession::new(
            SessionInput {
                html: html.to_string(),
                page_count: 3,
                initial_page: initial,
                persisted: None,
            },
            Arc::new(Upper),
            tx,
            &ReaderConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_defaults_and_initial_page() {
        let s = session(DOC, Some(2));
        assert_eq!(s.current_page(), 2);
        assert_eq!(s.page_count(), 3);
        assert_eq!(s.provider(), Provider::DeepL);
        assert_eq!(s.lang().as_str(), "zh-TW");
        assert!(!s.overlay());
        assert!(s.show_ruby());
        assert_eq!(s.current_paragraphs(), vec!["two"]);
    }

    #[tokio::test]
    async fn test_unpaginated_document_is_one_page() {
        let s = session("<p>solo</p>", Some(3));
        assert_eq!(s.page_count(), 1);
        assert_eq!(s.current_page(), 1);
        assert!(s.render().unwrap().contains("solo"));
    }

    #[tokio::test]
    async fn test_navigation_without_overlay_never_translates() {
        let s = session(DOC, None);
        s.translate_now().await;
        let nav = s.next().await;
        assert_eq!(nav, Navigation { page: 2, translation: None });
        assert_eq!(s.previous().await.page, 1);
        assert_eq!(s.previous().await, Navigation { page: 1, translation: None });
    }

    #[tokio::test]
    async fn test_overlay_renders_cached_translation() {
        let s = session(DOC, None);
        assert_eq!(s.translate_now().await, RequestOutcome::Translated);
        assert!(!s.render().unwrap().contains("ONE"));

        assert_eq!(
            s.set_overlay(true).await,
            Some(RequestOutcome::Cached(crate::cache::CacheSource::Memory))
        );
        assert!(s.render().unwrap().contains(r#"<p class="translation-text">ONE</p>"#));
    }

    #[tokio::test]
    async fn test_commit_input() {
        let s = session(DOC, None);
        s.set_input("3");
        assert_eq!(s.commit_input().await.map(|n| n.page), Some(3));
        s.set_input("x");
        assert_eq!(s.commit_input().await, None);
        assert_eq!(s.page_input(), "3");
    }

    #[tokio::test]
    async fn test_reselecting_active_pair_keeps_phase() {
        let s = session(DOC, None);
        s.translate_now().await;
        assert_eq!(s.phase(), TranslationPhase::Ready);

        s.set_provider(Provider::DeepL);
        s.set_lang("zh-TW");
        assert_eq!(s.phase(), TranslationPhase::Ready);

        s.set_provider(Provider::Google);
        s.set_provider(Provider::DeepL);
        assert_eq!(s.phase(), TranslationPhase::NotRequested);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_pending_page_change() {
        let (tx, mut rx) = unbounded_channel();
        let s = ReaderSession::new(
            SessionInput {
                html: DOC.to_string(),
                page_count: 3,
                initial_page: None,
                persisted: None,
            },
            Arc::new(Upper),
            tx,
            &ReaderConfig::default(),
        );

        s.next().await;
        s.close().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_change_after_receiver_dropped() {
        // the helper drops the receiver
        let s = session(DOC, None);
        assert_eq!(s.next().await.page, 2);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(s.next().await.page, 3);
        assert_eq!(s.translate_now().await, RequestOutcome::Translated);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(s.current_page(), 3);
    }

    #[tokio::test]
    async fn test_ruby_toggle_reaches_render() {
        let s = session(DOC, None);
        s.set_ruby(false);
        assert!(s.render().unwrap().contains("hide-ruby"));
    }
}
