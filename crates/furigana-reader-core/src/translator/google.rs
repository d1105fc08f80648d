use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{Translator, TranslatorInfo};
use super::{check_status, ensure_count, http_client, send_error};
use crate::config::Lang;
use crate::error::{Error, Result};

/// Google Cloud Translation (v2) translator
pub struct GoogleTranslator {
    client: Client,
    pub api_base: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(api_base: String, api_key: Option<String>, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_base,
            api_key,
        })
    }
}

fn parse_response(body: &str, expected: usize) -> Result<Vec<String>> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))?;
    let translations = response.data.translations;
    ensure_count(expected, translations.len())?;
    Ok(translations.into_iter().map(|t| t.translated_text).collect())
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "Google",
            api_key_env: "GOOGLE_API_KEY",
        }
    }

    async fn translate(&self, texts: &[String], source: &Lang, target: &Lang) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingApiKey(self.info().api_key_env))?;

        let url = format!(
            "{}/language/translate/v2",
            self.api_base.trim_end_matches('/')
        );
        let body = TranslateRequest {
            q: texts,
            source: source.as_str(),
            target: target.as_str(),
        };
        debug!("Google request: {} paragraphs to {}", texts.len(), target);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(&e))?;
        let text = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| send_error(&e))?;

        parse_response(&text, texts.len())
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
