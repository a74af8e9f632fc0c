//! In-memory keyspace, loadable from a JSON dump.
//!
//! Dump format:
//!
//! ```json
//! {
//!   "keys": {
//!     "cache:page:home": { "type": "string", "size": 2048,
//!                          "stats": { "get_count": 90, "set_count": 10,
//!                                     "size_bytes": 2048, "lifetime_seconds": 300 } },
//!     "cache:menu": { "type": "hash", "size": 512 }
//!   }
//! }
//! ```

use super::{KeySource, KeyStats, KeyType};
use crate::utils::error::SourceError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything known about one key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    #[serde(rename = "type", default)]
    pub key_type: KeyType,

    /// Value size in bytes
    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<KeyStats>,
}

impl KeyRecord {
    pub fn new(key_type: KeyType, size: u64) -> Self {
        Self {
            key_type,
            size,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: KeyStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Key source backed by a map held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryKeySource {
    keys: BTreeMap<String, KeyRecord>,
}

impl MemoryKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key (builder style)
    pub fn with_key(mut self, key: impl Into<String>, record: KeyRecord) -> Self {
        self.insert(key, record);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, record: KeyRecord) {
        self.keys.insert(key.into(), record);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Load a keyspace dump written as JSON
    ///
    /// # Errors
    /// * `SourceError::DumpIo` - file cannot be opened
    /// * `SourceError::DumpFormat` - file is not a valid dump
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!("Reading keyspace dump from: {}", path.display());

        let file = File::open(path)?;
        let source: Self = serde_json::from_reader(BufReader::new(file))?;

        info!("Loaded {} keys from {}", source.len(), path.display());
        Ok(source)
    }

    fn record(&self, key: &str) -> Result<&KeyRecord, SourceError> {
        self.keys.get(key).ok_or_else(|| SourceError::Query {
            key: key.to_string(),
            message: "no such key".to_string(),
        })
    }
}

impl KeySource for MemoryKeySource {
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError> {
        Ok(self.keys.keys().cloned().collect())
    }

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError> {
        Ok(self.record(key)?.key_type)
    }

    fn size_of(&mut self, key: &str) -> Result<u64, SourceError> {
        let record = self.record(key)?;
        Ok(match record.key_type {
            KeyType::Other => 0,
            _ => record.size,
        })
    }

    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError> {
        Ok(self.record(key)?.stats.unwrap_or_default())
    }
}
