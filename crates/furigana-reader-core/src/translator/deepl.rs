use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use super::traits::{Translator, TranslatorInfo};
use super::{check_status, ensure_count, http_client, send_error};
use crate::config::Lang;
use crate::error::{Error, Result};

/// DeepL REST API translator
pub struct DeepLTranslator {
    client: Client,
    /// Base URL, e.g. "https://api-free.deepl.com/v2"
    pub api_base: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    source_lang: String,
    target_lang: Cow<'static, str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(api_base: String, api_key: Option<String>, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_base,
            api_key,
        })
    }
}

/// DeepL's own target codes. Unknown codes are upper-cased and passed through.
fn deepl_target(lang: &Lang) -> Cow<'static, str> {
    match lang.as_str() {
        "zh-TW" => "ZH-HANT".into(),
        "zh-CN" => "ZH".into(),
        "en" => "EN-US".into(),
        "ko" => "KO".into(),
        other => other.to_uppercase().into(),
    }
}

fn parse_response(body: &str, expected: usize) -> Result<Vec<String>> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))?;
    ensure_count(expected, response.translations.len())?;
    Ok(response.translations.into_iter().map(|t| t.text).collect())
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "DeepL",
            api_key_env: "DEEPL_API_KEY",
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

        let url = format!("{}/translate", self.api_base.trim_end_matches('/'));
        let body = TranslateRequest {
            text: texts,
            source_lang: source.as_str().to_uppercase(),
            target_lang: deepl_target(target),
        };
        debug!("DeepL request: {} paragraphs to {}", texts.len(), body.target_lang);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {api_key}"))
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_target_codes() {
        assert_eq!(deepl_target(&Lang::new("zh-TW")), "ZH-HANT");
        assert_eq!(deepl_target(&Lang::new("zh-CN")), "ZH");
        assert_eq!(deepl_target(&Lang::new("en")), "EN-US");
        assert_eq!(deepl_target(&Lang::new("ko")), "KO");
        assert_eq!(deepl_target(&Lang::new("fr")), "FR");
    }

    #[test]
    fn test_request_shape() {
        let texts = vec!["猫".to_string()];
        let request = TranslateRequest {
            text: &texts,
            source_lang: "JA".to_string(),
            target_lang: "ZH-HANT".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"][0], "猫");
        assert_eq!(json["source_lang"], "JA");
        assert_eq!(json["target_lang"], "ZH-HANT");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"translations":[{"detected_source_language":"JA","text":"貓"},{"text":"狗"}]}"#;
        assert_eq!(parse_response(body, 2).unwrap(), vec!["貓", "狗"]);
    }

    #[test]
    fn test_parse_count_mismatch() {
        let body = r#"{"translations":[{"text":"貓"}]}"#;
        assert!(matches!(
            parse_response(body, 2),
            Err(Error::TranslationCountMismatch { expected: 2, got: 1 })
        ));
    }

    #[tokio::test]
    async fn test_missing_key_and_empty_input() {
        let translator = DeepLTranslator::new("http://127.0.0.1:1".to_string(), None, 5).unwrap();
        assert!(!translator.is_available());
        let ja = Lang::new("ja");
        let en = Lang::new("en");

        assert!(translator.translate(&[], &ja, &en).await.unwrap().is_empty());
        let err = translator.translate(&["a".to_string()], &ja, &en).await.unwrap_err();
        assert_eq!(err.to_string(), "DEEPL_API_KEY is not configured");
    }
}
