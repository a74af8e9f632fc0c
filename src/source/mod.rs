//! Key sources: where key names and per-key metrics come from.
//!
//! The aggregator only talks to the `KeySource` trait. Implementations:
//! - `RedisKeySource` - a live cache store
//! - `MemoryKeySource` - an in-memory keyspace, loadable from a JSON dump
//! - `RetryingSource` - bounded retries around any other source

pub mod memory;
pub mod redis_store;
pub mod retry;

use crate::utils::error::SourceError;
use serde::{Deserialize, Serialize};

// Re-export main types
pub use memory::{KeyRecord, MemoryKeySource};
pub use redis_store::RedisKeySource;
pub use retry::RetryingSource;

/// Value type of a key, as far as size accounting is concerned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    String,
    Hash,
    Set,
    #[serde(other)]
    Other,
}

impl KeyType {
    /// Map a store type name (`TYPE` reply) to a key type
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => KeyType::String,
            "hash" => KeyType::Hash,
            "set" => KeyType::Set,
            _ => KeyType::Other,
        }
    }
}

/// Access statistics recorded for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStats {
    #[serde(default)]
    pub get_count: u64,

    #[serde(default)]
    pub set_count: u64,

    /// Value size in bytes
    #[serde(default)]
    pub size_bytes: u64,

    /// Seconds between two consecutive sets
    #[serde(default)]
    pub lifetime_seconds: u64,
}

/// A source of key names and per-key metrics
///
/// Methods take `&mut self` because live sources hold a connection.
pub trait KeySource {
    /// Snapshot of every key name at call time
    ///
    /// # Errors
    /// * `SourceError::Unavailable` - the keyspace cannot be enumerated
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError>;

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError>;

    /// Value size in bytes
    ///
    /// Sum of member lengths for hashes and sets, raw length for strings,
    /// 0 for any other type.
    fn size_of(&mut self, key: &str) -> Result<u64, SourceError>;

    /// Access statistics, used by the hit rate report only
    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError>;
}

impl<S: KeySource + ?Sized> KeySource for Box<S> {
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError> {
        (**self).list_keys()
    }

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError> {
        (**self).type_of(key)
    }

    fn size_of(&mut self, key: &str) -> Result<u64, SourceError> {
        (**self).size_of(key)
    }

    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError> {
        (**self).stats_of(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_from_type_name() {
        assert_eq!(KeyType::from_type_name("hash"), KeyType::Hash);
        assert_eq!(KeyType::from_type_name("SET"), KeyType::Set);
        assert_eq!(KeyType::from_type_name("string"), KeyType::String);
        assert_eq!(KeyType::from_type_name("zset"), KeyType::Other);
        assert_eq!(KeyType::from_type_name("none"), KeyType::Other);
    }

    #[test]
    fn test_key_type_deserialize_unknown() {
        let t: KeyType = serde_json::from_str("\"stream\"").unwrap();
        assert_eq!(t, KeyType::Other);
    }
}
