//! Translation request coordination for one reading session.
//!
//! Every request goes through the same path: session cache (memory, then the
//! document's persisted translations), then at most one network call at a
//! time. Results are stored under the key captured when the request started,
//! so navigating away mid-flight never misfiles a translation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheSource, ParagraphMap, PersistedTranslations, TranslationCache, to_paragraph_map};
use crate::config::{Lang, Provider};
use crate::html::extract_paragraphs;
use crate::translator::TranslationService;

/// Request progress for one (provider, language) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationPhase {
    /// The reader has not asked for this pair since it was selected
    #[default]
    NotRequested,
    Requested,
    InFlight,
    Ready,
    Failed,
}

/// Arguments of a failed request, captured so a retry repeats it exactly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    pub page: u32,
    pub provider: Provider,
    pub lang: Lang,
    pub paragraphs: Vec<String>,
}

/// A message for the reader, optionally offering a retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub retry: Option<RetryRequest>,
}

/// A fresh page translation the embedder should persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTranslation {
    pub provider: Provider,
    pub lang: Lang,
    pub page: u32,
    /// `"p-{index}"` → translated text
    pub paragraphs: ParagraphMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// Debounced: the page the reader settled on
    PageChanged(u32),
    TranslationSaved(SavedTranslation),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The page has nothing to translate
    NoParagraphs,
    Cached(CacheSource),
    /// Another call is in flight; nothing was queued
    Busy,
    Translated,
    /// The call failed and a notice with a retry was emitted
    Failed,
}

#[derive(Default)]
struct State {
    cache: TranslationCache,
    in_flight: Option<CacheKey>,
    phases: HashMap<(Provider, Lang), TranslationPhase>,
}

impl State {
    fn set_phase(&mut self, provider: Provider, lang: &Lang, phase: TranslationPhase) {
        self.phases.insert((provider, lang.clone()), phase);
    }

    /// Leave `InFlight` for `phase`. A pair reset while its call was running
    /// keeps the phase it was reset to.
    fn settle(&mut self, key: &CacheKey, phase: TranslationPhase) {
        let pair = (key.provider, key.lang.clone());
        if self.phases.get(&pair) == Some(&TranslationPhase::InFlight) {
            self.phases.insert(pair, phase);
        } else {
            debug!("Phase of {}|{} changed while in flight; keeping it", key.provider, key.lang);
        }
    }
}

/// Releases the in-flight slot if the request future is dropped early
struct InFlightGuard<'a> {
    state: &'a Mutex<State>,
    key: Option<CacheKey>,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.key = None;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.in_flight.as_ref() == Some(&key) {
                debug!("Translation for {} abandoned", key);
                state.in_flight = None;
                state.settle(&key, TranslationPhase::Requested);
            }
        }
    }
}

pub struct TranslationCoordinator {
    pages: Arc<[String]>,
    service: Arc<dyn TranslationService>,
    events: UnboundedSender<ReaderEvent>,
    state: Mutex<State>,
}

impl TranslationCoordinator {
    /// `pages` are the page fragments, page `n` at index `n - 1`.
    pub fn new(
        pages: Arc<[String]>,
        persisted: PersistedTranslations,
        service: Arc<dyn TranslationService>,
        events: UnboundedSender<ReaderEvent>,
    ) -> Self {
        Self {
            pages,
            service,
            events,
            state: Mutex::new(State {
                cache: TranslationCache::new(persisted),
                ..Default::default()
            }),
        }
    }

    // The lock is only taken in short synchronous sections.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ReaderEvent) {
        if self.events.send(event).is_err() {
            debug!("Reader event receiver dropped");
        }
    }

    /// Ordered paragraph texts of a 1-based page; empty past the last page
    pub fn paragraphs(&self, page: u32) -> Vec<String> {
        let index = usize::try_from(page).ok().and_then(|p| p.checked_sub(1));
        index
            .and_then(|i| self.pages.get(i))
            .map(|html| extract_paragraphs(html))
            .unwrap_or_default()
    }

    pub fn phase(&self, provider: Provider, lang: &Lang) -> TranslationPhase {
        self.state()
            .phases
            .get(&(provider, lang.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Record that the reader asked for this pair
    pub fn mark_requested(&self, provider: Provider, lang: &Lang) {
        let mut state = self.state();
        let key = (provider, lang.clone());
        if state.phases.get(&key).copied().unwrap_or_default() == TranslationPhase::NotRequested {
            state.phases.insert(key, TranslationPhase::Requested);
        }
    }

    /// Forget that the pair was requested. Cached entries are kept.
    pub fn reset_phase(&self, provider: Provider, lang: &Lang) {
        self.state().phases.remove(&(provider, lang.clone()));
    }

    pub fn can_translate(&self) -> bool {
        self.state().in_flight.is_none()
    }

    pub fn in_flight(&self) -> Option<CacheKey> {
        self.state().in_flight.clone()
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.state().in_flight.as_ref() == Some(key)
    }

    /// Translations held in the session's memory tier
    pub fn cached(&self, key: &CacheKey) -> Option<Vec<String>> {
        self.state().cache.get(key).map(<[String]>::to_vec)
    }

    /// Translate a page unless it is already cached or another call is running.
    pub async fn request_translation(&self, page: u32, provider: Provider, lang: &Lang) -> RequestOutcome {
        let paragraphs = self.paragraphs(page);
        if paragraphs.is_empty() {
            debug!("Page {} has no paragraphs to translate", page);
            return RequestOutcome::NoParagraphs;
        }

        self.dispatch(RetryRequest {
            page,
            provider,
            lang: lang.clone(),
            paragraphs,
        })
        .await
    }

    /// Repeat a failed request with exactly its original arguments
    pub async fn retry(&self, request: RetryRequest) -> RequestOutcome {
        info!("Retrying translation of page {} via {}", request.page, request.provider);
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: RetryRequest) -> RequestOutcome {
        let key = CacheKey::new(request.provider, request.lang.clone(), request.page);

        {
            let mut state = self.state();
            if let Some(hit) = state.cache.lookup(&key, request.paragraphs.len()) {
                debug!("Cache hit for {} ({:?})", key, hit.source);
                state.set_phase(key.provider, &key.lang, TranslationPhase::Ready);
                return RequestOutcome::Cached(hit.source);
            }
            if let Some(current) = &state.in_flight {
                debug!("Skipping {}: {} is in flight", key, current);
                return RequestOutcome::Busy;
            }
            state.in_flight = Some(key.clone());
            state.set_phase(key.provider, &key.lang, TranslationPhase::InFlight);
        }

        let mut guard = InFlightGuard {
            state: &self.state,
            key: Some(key.clone()),
        };
        debug!("Translating {} ({} paragraphs)", key, request.paragraphs.len());
        let result = self
            .service
            .translate(&request.paragraphs, request.provider, &request.lang)
            .await;
        guard.disarm();

        let mut state = self.state();
        state.in_flight = None;
        match result {
            Ok(entry) => {
                let paragraphs = to_paragraph_map(&entry);
                state.cache.store(key.clone(), entry);
                state.settle(&key, TranslationPhase::Ready);
                drop(state);

                info!("Translated {}", key);
                self.emit(ReaderEvent::TranslationSaved(SavedTranslation {
                    provider: key.provider,
                    lang: key.lang,
                    page: key.page,
                    paragraphs,
                }));
                RequestOutcome::Translated
            }
            Err(e) => {
                state.settle(&key, TranslationPhase::Failed);
                drop(state);

                warn!("Translation of {} failed: {}", key, e);
                self.emit(ReaderEvent::Notice(Notice {
                    message: e.to_string(),
                    retry: Some(request),
                }));
                RequestOutcome::Failed
            }
        }
    }
}
