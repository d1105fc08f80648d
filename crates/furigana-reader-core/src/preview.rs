//! Preview rendering for a single page.
//!
//! The renderer is stateless: it receives a page fragment plus display flags
//! and produces an HTML string. When the fragment has paragraphs, each one is
//! wrapped so a translation row (or a loading skeleton) can sit under it.
//! Fragments without paragraphs are passed through untouched.

use askama::Template;

use crate::error::{Error, Result};
use crate::html::paragraph_fragments;

/// Input for rendering one page.
#[derive(Debug, Clone, Copy)]
pub struct HtmlPreview<'a> {
    /// Page fragment (or the whole document when it has no page markers)
    pub html: &'a str,
    pub page_count: usize,
    /// Hidden ruby is expressed through the `hide-ruby` class
    pub show_ruby: bool,
    /// Index-aligned with the fragment's paragraphs
    pub translations: Option<&'a [String]>,
    pub is_translating: bool,
}

struct ParagraphView {
    html: String,
    skeleton: bool,
    translation: String,
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<div class="preview">
<h2 class="preview-title">Preview ({{ page_count }} pages)</h2>
{% if paragraphs.is_empty() %}<div class="preview-body{{ ruby_class }}">{{ raw_html|safe }}</div>
{% else %}<div class="preview-body{{ ruby_class }}">
{% for p in paragraphs %}<div class="paragraph">
{{ p.html|safe }}
{% if p.skeleton %}<div class="translation-skeleton"></div>
{% else if !p.translation.is_empty() %}<p class="translation-text">{{ p.translation }}</p>
{% endif %}</div>
{% endfor %}</div>
{% endif %}</div>"#
)]
struct PreviewTemplate<'a> {
    page_count: usize,
    ruby_class: &'static str,
    raw_html: &'a str,
    paragraphs: Vec<ParagraphView>,
}

impl HtmlPreview<'_> {
    pub fn render(&self) -> Result<String> {
        let has_translations = self.translations.is_some_and(|t| !t.is_empty());
        let show_row = self.is_translating || has_translations;

        let paragraphs = paragraph_fragments(self.html)
            .into_iter()
            .enumerate()
            .map(|(i, html)| ParagraphView {
                html,
                skeleton: show_row && self.is_translating,
                translation: if show_row && !self.is_translating {
                    self.translations
                        .and_then(|t| t.get(i))
                        .cloned()
                        .unwrap_or_default()
                } else {
                    String::new()
                },
            })
            .collect();

        PreviewTemplate {
            page_count: self.page_count,
            ruby_class: if self.show_ruby { "" } else { " hide-ruby" },
            raw_html: self.html,
            paragraphs,
        }
        .render()
        .map_err(|e| Error::Render(e.to_string()))
    }
}
