//! Document-scoped translation store.
//!
//! Shape: provider → target language → `"p-{index}"` → translated text.
//! The document entity owns this data; a reading session only reads it at
//! mount time and reports new translations through events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{Lang, Provider};

/// Paragraph key → translated text for one provider and language
pub type ParagraphMap = BTreeMap<String, String>;

/// Key used for paragraph `index` (0-based within its page)
pub fn paragraph_key(index: usize) -> String {
    format!("p-{index}")
}

/// Build the paragraph map for an index-aligned list of translations
pub fn to_paragraph_map(entry: &[String]) -> ParagraphMap {
    entry
        .iter()
        .enumerate()
        .map(|(i, text)| (paragraph_key(i), text.clone()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedTranslations(BTreeMap<String, BTreeMap<String, ParagraphMap>>);

impl PersistedTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|langs| langs.values().all(BTreeMap::is_empty))
    }

    pub fn get(&self, provider: Provider, lang: &Lang) -> Option<&ParagraphMap> {
        self.0.get(provider.as_str())?.get(lang.as_str())
    }

    /// Translations for a page with `paragraph_count` paragraphs.
    ///
    /// Only a complete set (`p-0` through `p-{n-1}`) counts; a partial map
    /// returns `None` so the page is translated afresh.
    pub fn page_entry(&self, provider: Provider, lang: &Lang, paragraph_count: usize) -> Option<Vec<String>> {
        if paragraph_count == 0 {
            return None;
        }
        let map = self.get(provider, lang)?;
        (0..paragraph_count)
            .map(|i| map.get(&paragraph_key(i)).cloned())
            .collect()
    }

    /// Merge new paragraph translations, overwriting keys that already exist.
    pub fn merge(&mut self, provider: Provider, lang: &Lang, mapping: ParagraphMap) {
        self.0
            .entry(provider.as_str().to_string())
            .or_default()
            .entry(lang.as_str().to_string())
            .or_default()
            .extend(mapping);
    }
}
