//! Line-oriented reader loop.

use anyhow::{Context, Result};
use furigana_reader_core::{
    DocumentStore, Library, Notice, ReaderConfig, ReaderEvent, ReaderSession, RequestOutcome,
    RetryRequest, SessionInput, TranslationService,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::{debug, warn};

const HELP: &str = "\
n / p            next / previous page
<number>         jump to page
t                translate this page
o                toggle translation overlay
r                toggle furigana
provider <name>  deepl, google or claude
lang <code>      zh-TW, zh-CN, en or ko
retry            repeat the last failed translation
q                quit";

enum Step {
    Continue,
    Quit,
}

struct Reader<'a> {
    library: &'a Library,
    doc_id: &'a str,
    session: ReaderSession,
    events: UnboundedReceiver<ReaderEvent>,
    last_failure: Option<RetryRequest>,
    raw: bool,
}

pub async fn run(
    library: &Library,
    doc_id: &str,
    service: Arc<dyn TranslationService>,
    config: &ReaderConfig,
    raw: bool,
) -> Result<()> {
    let doc = library.document(doc_id)?;
    let stored = library
        .fetch_document_html(doc_id)
        .await
        .with_context(|| format!("Document {doc_id} has no readable HTML"))?;

    let (tx, rx) = unbounded_channel();
    let session = ReaderSession::new(
        SessionInput {
            html: stored.html,
            page_count: stored.page_count,
            initial_page: Some(doc.last_page),
            persisted: Some(doc.translations),
        },
        service,
        tx,
        config,
    );

    let mut reader = Reader {
        library,
        doc_id,
        session,
        events: rx,
        last_failure: None,
        raw,
    };

    say(&format!("{}  (type `h` for help)", doc.name));
    reader.show()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let step = reader.handle(line.trim()).await?;
        reader.drain_events().await;
        if matches!(step, Step::Quit) {
            break;
        }
    }

    reader.finish().await;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn say(text: &str) {
    println!("{text}");
}

impl Reader<'_> {
    async fn handle(&mut self, line: &str) -> Result<Step> {
        let (command, arg) = line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim()));

        match command {
            "" => return Ok(Step::Continue),
            "q" | "quit" => return Ok(Step::Quit),
            "h" | "help" | "?" => {
                say(HELP);
                return Ok(Step::Continue);
            }
            "n" | "next" => {
                self.session.next().await;
            }
            "p" | "prev" => {
                self.session.previous().await;
            }
            "t" | "translate" => {
                let outcome = self.session.translate_now().await;
                report(outcome);
            }
            "o" | "overlay" => {
                let enabled = !self.session.overlay();
                if let Some(outcome) = self.session.set_overlay(enabled).await {
                    report(outcome);
                }
            }
            "r" | "ruby" => {
                self.session.set_ruby(!self.session.show_ruby());
            }
            "provider" => match arg.parse() {
                Ok(provider) => self.session.set_provider(provider),
                Err(e) => say(&e.to_string()),
            },
            "lang" if !arg.is_empty() => self.session.set_lang(arg),
            "retry" => match self.last_failure.take() {
                Some(request) => report(self.session.retry(request).await),
                None => say("Nothing to retry"),
            },
            _ => {
                self.session.set_input(line);
                if self.session.commit_input().await.is_none() {
                    say("Unknown command; type `h` for help");
                    return Ok(Step::Continue);
                }
            }
        }

        self.show()?;
        Ok(Step::Continue)
    }

    fn show(&self) -> Result<()> {
        let s = &self.session;
        let header = format!(
            "--- page {}/{} | {} → {} | overlay {} | furigana {} ---",
            s.current_page(),
            s.page_count(),
            s.provider().label(),
            s.lang(),
            if s.overlay() { "on" } else { "off" },
            if s.show_ruby() { "on" } else { "off" },
        );
        say(&header);

        if self.raw {
            say(&s.render()?);
            return Ok(());
        }

        let translations = if s.overlay() { s.current_translations() } else { None };
        let paragraphs = s.current_paragraphs();
        if paragraphs.is_empty() {
            say("(no text on this page)");
        }
        for (i, text) in paragraphs.iter().enumerate() {
            say(text);
            if let Some(translated) = translations.as_ref().and_then(|t| t.get(i)) {
                say(&format!("  ⤷ {translated}"));
            }
        }
        Ok(())
    }

    async fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ReaderEvent::PageChanged(page) => {
                    debug!("Saving progress: page {}", page);
                    let _ = self.library.persist_page_progress(self.doc_id, page).await;
                }
                ReaderEvent::TranslationSaved(saved) => {
                    if let Err(e) = self
                        .library
                        .persist_translations(self.doc_id, saved.provider, &saved.lang, saved.paragraphs)
                        .await
                    {
                        warn!("Failed to store translations: {}", e);
                    }
                }
                ReaderEvent::Notice(Notice { message, retry }) => {
                    if retry.is_some() {
                        say(&format!("! {message} (type `retry` to try again)"));
                    } else {
                        say(&format!("! {message}"));
                    }
                    self.last_failure = retry;
                }
            }
        }
    }

    async fn finish(&mut self) {
        self.session.close().await;
        self.drain_events().await;
        // Stands in for the page change dropped by close
        let page = self.session.current_page();
        let _ = self.library.persist_page_progress(self.doc_id, page).await;
    }
}

fn report(outcome: RequestOutcome) {
    match outcome {
        RequestOutcome::NoParagraphs => say("(nothing to translate on this page)"),
        RequestOutcome::Busy => say("(a translation is already running)"),
        RequestOutcome::Cached(_) | RequestOutcome::Translated | RequestOutcome::Failed => {}
    }
}
