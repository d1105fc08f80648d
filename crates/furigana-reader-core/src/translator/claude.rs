use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{Translator, TranslatorInfo};
use super::{check_status, ensure_count, http_client, send_error};
use crate::config::Lang;
use crate::error::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Anthropic Messages API translator.
///
/// All paragraphs go out in one prompt as a JSON array and the model is asked
/// to answer with an array of the same length.
pub struct ClaudeTranslator {
    client: Client,
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl ClaudeTranslator {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout_seconds: u64,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_base,
            api_key,
            model,
        })
    }

    fn create_prompt(texts: &[String], target: &Lang) -> Result<String> {
        let paragraphs = serde_json::to_string(texts)?;
        Ok(format!(
            "請將以下日文段落翻譯為{}。\n以 JSON 陣列格式回傳，每個元素對應一個段落的翻譯，不要加任何說明。\n\n段落：\n{}",
            target_language_name(target),
            paragraphs
        ))
    }
}

/// Names the model sees for the offered target languages
fn target_language_name(lang: &Lang) -> &str {
    match lang.as_str() {
        "zh-TW" => "繁體中文",
        "zh-CN" => "簡體中文",
        "en" => "English",
        "ko" => "한국어",
        other => other,
    }
}

/// Remove a surrounding markdown code fence, if the model added one
fn strip_code_fence(raw: &str) -> &str {
    let raw = raw.trim();
    if !raw.starts_with("```") {
        return raw;
    }
    let body = raw.split_once('\n').map_or("", |(_, rest)| rest);
    body.rsplit_once("```").map_or(body, |(inner, _)| inner).trim()
}

fn parse_reply(raw: &str, expected: usize) -> Result<Vec<String>> {
    let translations: Vec<String> = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        warn!("Claude reply is not a JSON array: {}", e);
        Error::InvalidResponse(e.to_string())
    })?;
    ensure_count(expected, translations.len())?;
    Ok(translations)
}

#[async_trait]
impl Translator for ClaudeTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "Claude AI",
            api_key_env: "ANTHROPIC_API_KEY",
        }
    }

    async fn translate(&self, texts: &[String], _source: &Lang, target: &Lang) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingApiKey(self.info().api_key_env))?;

        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: Self::create_prompt(texts, target)?,
            }],
        };
        debug!("Claude request: {} paragraphs to {} via {}", texts.len(), target, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(&e))?;
        let reply: MessagesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let raw = reply
            .content
            .first()
            .map(|block| block.text.as_str())
            .ok_or_else(|| Error::InvalidResponse("No content in response".to_string()))?;
        parse_reply(raw, texts.len())
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
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence(r#"["a"]"#), r#"["a"]"#);
        assert_eq!(strip_code_fence("```json\n[\"a\"]\n```"), r#"["a"]"#);
        assert_eq!(strip_code_fence("  ```\n[\"b\"]```  "), r#"["b"]"#);
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(
            parse_reply("```json\n[\"這是東京\", \"你好\"]\n```", 2).unwrap(),
            vec!["這是東京", "你好"]
        );
        assert!(matches!(parse_reply("Sorry, I can't", 1), Err(Error::InvalidResponse(_))));
        assert!(matches!(
            parse_reply(r#"["a"]"#, 3),
            Err(Error::TranslationCountMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn test_prompt_names_target_and_embeds_json() {
        let prompt = ClaudeTranslator::create_prompt(&["東京です".to_string()], &Lang::new("ko")).unwrap();
        assert!(prompt.contains("한국어"));
        assert!(prompt.contains(r#"["東京です"]"#));
    }

    #[test]
    fn test_unknown_target_name_passes_through() {
        assert_eq!(target_language_name(&Lang::new("fr")), "fr");
        assert_eq!(target_language_name(&Lang::new("zh-CN")), "簡體中文");
    }
}
