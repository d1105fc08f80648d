use crate::config::{Lang, Provider};

/// Identifies one page translation within a reading session.
///
/// Two keys are equal iff provider, target language and page are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub provider: Provider,
    pub lang: Lang,
    /// 1-based page ordinal
    pub page: u32,
}

impl CacheKey {
    pub fn new(provider: Provider, lang: impl Into<Lang>, page: u32) -> Self {
        Self {
            provider,
            lang: lang.into(),
            page,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.provider, self.lang, self.page)
    }
}

/// Cache key for a translation service response.
///
/// Keys are opaque MD5 hashes of all request inputs, ensuring:
/// - Same provider + languages + paragraphs = same key
/// - Any change to inputs produces a different key
/// - Keys are fixed-length (32 hex chars) for consistent storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    hash: String,
}

impl ResponseKey {
    pub fn new(provider: Provider, source_lang: &Lang, target_lang: &Lang, texts: &[String]) -> Self {
        // Null bytes separate fields and paragraphs so ("a", "bc") and
        // ("ab", "c") never collide.
        let mut combined = format!(
            "{}\0{}\0{}",
            provider.as_str(),
            source_lang.as_str(),
            target_lang.as_str(),
        );
        for text in texts {
            combined.push('\0');
            combined.push_str(text);
        }

        Self {
            hash: format!("{:x}", md5::compute(combined.as_bytes())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn response_key(provider: Provider, tgt: &str, items: &[&str]) -> ResponseKey {
        ResponseKey::new(provider, &Lang::new("ja"), &Lang::new(tgt), &texts(items))
    }

    #[test]
    fn test_cache_key_equality() {
        assert_eq!(CacheKey::new(Provider::DeepL, "zh-TW", 1), CacheKey::new(Provider::DeepL, "zh-TW", 1));
        assert_ne!(CacheKey::new(Provider::DeepL, "zh-TW", 1), CacheKey::new(Provider::Google, "zh-TW", 1));
        assert_ne!(CacheKey::new(Provider::DeepL, "zh-TW", 1), CacheKey::new(Provider::DeepL, "en", 1));
        assert_ne!(CacheKey::new(Provider::DeepL, "zh-TW", 1), CacheKey::new(Provider::DeepL, "zh-TW", 2));
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::new(Provider::DeepL, "zh-TW", 3).to_string(), "deepl|zh-TW|3");
    }

    #[test]
    fn test_response_key_is_fixed_length_hash() {
        let k = response_key(Provider::DeepL, "en", &["こんにちは"]);
        assert_eq!(k.to_string().len(), 32);
        assert!(k.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_response_key_differs_by_inputs() {
        let base = response_key(Provider::DeepL, "en", &["a", "b"]);
        assert_eq!(base, response_key(Provider::DeepL, "en", &["a", "b"]));
        assert_ne!(base, response_key(Provider::Google, "en", &["a", "b"]));
        assert_ne!(base, response_key(Provider::DeepL, "ko", &["a", "b"]));
        assert_ne!(base, response_key(Provider::DeepL, "en", &["b", "a"]));
    }

    #[test]
    fn test_response_key_paragraph_boundaries() {
        assert_ne!(
            response_key(Provider::DeepL, "en", &["a", "bc"]),
            response_key(Provider::DeepL, "en", &["ab", "c"])
        );
    }
}
