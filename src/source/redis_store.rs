//! Blocking client for a live Redis-compatible cache store.

use super::{KeySource, KeyStats, KeyType};
use crate::utils::config::SourceConfig;
use crate::utils::error::SourceError;
use log::{debug, info, warn};
use redis::{Client, Cmd, Connection, FromRedisValue, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 1000;

/// Key source reading from a cache store
///
/// Per-key access statistics are read from a hash stored under the key
/// itself (`get`, `set`, `size`, `lifetime` fields), as written by the
/// traffic monitor that feeds the hit rate report.
pub struct RedisKeySource {
    client: Client,
    conn: Option<Connection>,
    timeout: Duration,
}

impl RedisKeySource {
    /// Connect to the store
    ///
    /// # Errors
    /// * `SourceError::Unavailable` - bad URL or the store cannot be reached
    pub fn connect(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", config.url, e)))?;

        let mut source = Self {
            client,
            conn: None,
            timeout: config.timeout,
        };

        source
            .connection()
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", config.url, e)))?;

        info!("Connected to cache store: {}", config.url);
        Ok(source)
    }

    /// Current connection, reopened if a previous query dropped it
    fn connection(&mut self) -> Result<&mut Connection, SourceError> {
        if self.conn.is_none() {
            debug!("Opening cache store connection (timeout {:?})", self.timeout);
            let conn = self.client.get_connection_with_timeout(self.timeout)?;
            conn.set_read_timeout(Some(self.timeout))?;
            conn.set_write_timeout(Some(self.timeout))?;
            self.conn = Some(conn);
        }

        self.conn
            .as_mut()
            .ok_or_else(|| SourceError::Unavailable("no connection".to_string()))
    }

    fn query<T: FromRedisValue>(&mut self, cmd: &Cmd) -> Result<T, SourceError> {
        let result = cmd.query(self.connection()?);

        if let Err(e) = &result {
            if e.is_connection_dropped() || e.is_io_error() || e.is_timeout() {
                warn!("Cache store connection lost: {}", e);
                self.conn = None;
            }
        }

        result.map_err(SourceError::from)
    }
}

impl KeySource for RedisKeySource {
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError> {
        let mut keys = Vec::new();
        let mut skipped = 0;
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<Vec<u8>>) = self
                .query(redis::cmd("SCAN").arg(cursor).arg("COUNT").arg(SCAN_BATCH))
                .map_err(|e| SourceError::Unavailable(format!("SCAN failed: {}", e)))?;

            skipped += extend_utf8_keys(&mut keys, batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();

        info!(
            "Fetched {} keys from cache store ({} non-UTF-8 keys skipped)",
            keys.len(),
            skipped
        );
        Ok(keys)
    }

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError> {
        let name: String = self.query(redis::cmd("TYPE").arg(key))?;
        Ok(KeyType::from_type_name(&name))
    }

    fn size_of(&mut self, key: &str) -> Result<u64, SourceError> {
        let key_type = self.type_of(key)?;
        match size_command(key_type, key) {
            Some(cmd) => {
                let reply: Value = self.query(&cmd)?;
                Ok(payload_bytes(&reply))
            }
            None => Ok(0),
        }
    }

    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError> {
        let fields: HashMap<String, String> = self.query(redis::cmd("HGETALL").arg(key))?;
        Ok(stats_from_fields(&fields))
    }
}

/// Command whose reply carries a key's value bytes; `None` for other types
fn size_command(key_type: KeyType, key: &str) -> Option<Cmd> {
    let name = match key_type {
        KeyType::Hash => "HGETALL",
        KeyType::Set => "SMEMBERS",
        KeyType::String => "GET",
        KeyType::Other => return None,
    };
    let mut cmd = redis::cmd(name);
    cmd.arg(key);
    Some(cmd)
}

/// Total bytes of every bulk string in a reply
///
/// Hash replies count field names and values, set replies every member,
/// string replies the raw value. A missing key (nil) is 0.
fn payload_bytes(reply: &Value) -> u64 {
    match reply {
        Value::Data(bytes) => bytes.len() as u64,
        Value::Bulk(items) => items.iter().map(payload_bytes).sum(),
        _ => 0,
    }
}

/// Append the UTF-8 keys of a SCAN batch, returning how many were skipped
fn extend_utf8_keys(keys: &mut Vec<String>, batch: Vec<Vec<u8>>) -> usize {
    let mut skipped = 0;
    for raw in batch {
        match String::from_utf8(raw) {
            Ok(key) => keys.push(key),
            Err(e) => {
                warn!(
                    "Skipping non-UTF-8 key: {}",
                    String::from_utf8_lossy(e.as_bytes())
                );
                skipped += 1;
            }
        }
    }
    skipped
}

/// Decode a stats hash; missing or unparsable fields count as 0
fn stats_from_fields(fields: &HashMap<String, String>) -> KeyStats {
    KeyStats {
        get_count: parse_counter(fields, "get"),
        set_count: parse_counter(fields, "set"),
        size_bytes: parse_counter(fields, "size"),
        lifetime_seconds: parse_counter(fields, "lifetime"),
    }
}

/// Counters are written as floats by the monitor and truncated here
fn parse_counter(fields: &HashMap<String, String>, name: &str) -> u64 {
    fields
        .get(name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}
