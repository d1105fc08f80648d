use sled::Db;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::util::open_db;

/// Disk tier of the response cache. Values are JSON arrays of translations.
pub struct DiskCache {
    db: Db,
}

impl DiskCache {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = open_db(path).map_err(Error::CacheInit)?;
        debug!("Opened disk cache at {} ({} entries)", path.display(), db.len());
        Ok(Self { db })
    }

    /// Unreadable entries count as misses
    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        let bytes = self
            .db
            .get(key.as_bytes())
            .inspect_err(|e| warn!("Cache read error: {}", e))
            .ok()??;

        serde_json::from_slice(&bytes)
            .inspect_err(|e| warn!("Discarding unreadable cache entry {}: {}", key, e))
            .ok()
    }

    pub fn insert(&self, key: &str, translations: &[String]) -> Result<()> {
        let bytes = serde_json::to_vec(translations)?;
        self.db
            .insert(key.as_bytes(), bytes)
            .map_err(|e| Error::CacheWrite(e.to_string()))?;
        self.flush()
    }

    pub fn clear(&self) -> Result<()> {
        self.db.clear().map_err(|e| Error::CacheWrite(e.to_string()))?;
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| Error::CacheWrite(format!("Flush failed: {e}")))
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}
