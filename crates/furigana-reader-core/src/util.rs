//! Utility functions shared across the crate.

use std::path::{Path, PathBuf};

use crate::cache::DiskCache;
use crate::error::Result;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Get the user's cache directory following XDG conventions.
///
/// Returns `$XDG_CACHE_HOME` if set, otherwise `$HOME/.cache`.
pub fn cache_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
}

/// Get the user's data directory following XDG conventions.
///
/// Returns `$XDG_DATA_HOME` if set, otherwise `$HOME/.local/share`.
pub fn data_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_DATA_HOME").map(PathBuf::from).or_else(|| {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    })
}

/// Get the default translation response cache path.
pub fn translation_cache_path() -> PathBuf {
    cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("furigana-reader")
}

/// Get the default library directory.
pub fn library_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from(".data"))
        .join("furigana-reader")
}

/// Open a sled database, creating missing parent directories.
///
/// A held lock is reported with the command that clears a stale one.
pub(crate) fn open_db(path: &Path) -> std::result::Result<sled::Db, String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {e}", parent.display()))?;
    }

    sled::open(path).map_err(|e| {
        let message = e.to_string();
        if message.contains("WouldBlock") || message.contains("lock") {
            format!(
                "{} is locked by another process or a crashed instance.\n\
                 To fix: rm {}/db/LOCK",
                path.display(),
                path.display()
            )
        } else {
            format!("Failed to open {}: {message}", path.display())
        }
    })
}

/// Clear the translation response cache on disk.
///
/// Returns the number of entries cleared.
pub fn clear_translation_cache() -> Result<usize> {
    let cache_path = translation_cache_path();
    if !cache_path.exists() {
        return Ok(0);
    }

    let cache = DiskCache::new(&cache_path)?;
    let count = cache.len();
    cache.clear()?;
    Ok(count)
}
