use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Serde default functions for common languages
fn default_source_lang() -> Lang {
    Lang::new(DEFAULT_SOURCE_LANG)
}

fn default_target_lang() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Translation backend selectable by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    DeepL,
    Google,
    Claude,
}

impl Provider {
    pub const ALL: [Self; 3] = [Self::DeepL, Self::Google, Self::Claude];

    /// Identifier used in URLs, persisted stores and cache keys
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeepL => "deepl",
            Self::Google => "google",
            Self::Claude => "claude",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DeepL => "DeepL",
            Self::Google => "Google",
            Self::Claude => "Claude AI",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "google" => Ok(Self::Google),
            "claude" => Ok(Self::Claude),
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Translation provider credentials and endpoints.
///
/// API keys left empty here are picked up from `DEEPL_API_KEY`,
/// `GOOGLE_API_KEY` and `ANTHROPIC_API_KEY` by [`TranslatorConfig::with_env_keys`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Language of the documents being read
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,
    pub deepl_api_key: Option<String>,
    #[serde(default = "default_deepl_api_base")]
    pub deepl_api_base: String,
    pub google_api_key: Option<String>,
    #[serde(default = "default_google_api_base")]
    pub google_api_base: String,
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_anthropic_api_base")]
    pub anthropic_api_base: String,
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_deepl_api_base() -> String {
    "https://api-free.deepl.com/v2".to_string()
}

fn default_google_api_base() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_anthropic_api_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-6".to_string()
}

const fn default_timeout_seconds() -> u64 {
    60
}

impl TranslatorConfig {
    /// Fill missing API keys from the process environment
    #[must_use]
    pub fn with_env_keys(mut self) -> Self {
        let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        if self.deepl_api_key.is_none() {
            self.deepl_api_key = from_env("DEEPL_API_KEY");
        }
        if self.google_api_key.is_none() {
            self.google_api_key = from_env("GOOGLE_API_KEY");
        }
        if self.anthropic_api_key.is_none() {
            self.anthropic_api_key = from_env("ANTHROPIC_API_KEY");
        }
        self
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            deepl_api_key: None,
            deepl_api_base: default_deepl_api_base(),
            google_api_key: None,
            google_api_base: default_google_api_base(),
            anthropic_api_key: None,
            anthropic_api_base: default_anthropic_api_base(),
            claude_model: default_claude_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Reader session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_provider")]
    pub default_provider: Provider,

    #[serde(default = "default_target_lang")]
    pub default_target_lang: Lang,

    /// Quiet interval before a page change is reported
    #[serde(default = "default_debounce_ms")]
    pub page_change_debounce_ms: u64,

    #[serde(default = "default_true")]
    pub show_ruby: bool,
}

const fn default_provider() -> Provider {
    Provider::DeepL
}

const fn default_debounce_ms() -> u64 {
    1000
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_target_lang: default_target_lang(),
            page_change_debounce_ms: default_debounce_ms(),
            show_ruby: true,
        }
    }
}

/// Cache configuration for the service-side response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable memory cache
    #[serde(default = "default_true")]
    pub memory_enabled: bool,

    /// Memory cache budget in megabytes of translated text
    #[serde(default = "default_memory_max_mb")]
    pub memory_max_mb: u64,

    /// Memory cache TTL in seconds (0 = no expiry)
    #[serde(default)]
    pub memory_ttl_seconds: u64,

    /// Enable disk cache
    #[serde(default = "default_true")]
    pub disk_enabled: bool,

    /// Disk cache directory (defaults to .cache/furigana-reader)
    pub disk_path: Option<PathBuf>,
}

const fn default_true() -> bool {
    true
}

const fn default_memory_max_mb() -> u64 {
    64
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_enabled: true,
            memory_max_mb: default_memory_max_mb(),
            memory_ttl_seconds: 0,
            disk_enabled: true,
            disk_path: None,
        }
    }
}

/// Where the document library lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Library directory (defaults to $XDG_DATA_HOME/furigana-reader)
    pub data_dir: Option<PathBuf>,
}

impl LibraryConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(crate::util::library_path)
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub library: LibraryConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.translator.timeout_seconds == 0 {
            return Err(Error::ConfigInvalid {
                field: "translator.timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Load from default locations (~/.config/furigana-reader/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("furigana-reader").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// A language option for UI dropdowns
#[derive(Debug, Clone)]
pub struct LanguageOption {
    /// ISO language code (e.g., "en", "zh-TW")
    pub code: &'static str,
    /// Display name in the language itself
    pub name: &'static str,
}

/// Languages available as translation target.
pub fn target_languages() -> Vec<LanguageOption> {
    vec![
        LanguageOption { code: "zh-TW", name: "繁體中文" },
        LanguageOption { code: "zh-CN", name: "簡體中文" },
        LanguageOption { code: "en", name: "English" },
        LanguageOption { code: "ko", name: "한국어" },
    ]
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "ja";
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "zh-TW";
