//! Bounded retries around any key source.

use super::{KeySource, KeyStats, KeyType};
use crate::utils::config::SourceConfig;
use crate::utils::error::SourceError;
use log::debug;
use std::thread;
use std::time::Duration;

/// Wraps a source and retries transient failures
///
/// Each query gets at most `1 + max_retries` attempts, sleeping
/// `backoff * attempt` between them. Non-transient errors (a wrong value
/// type, a missing key) are returned immediately.
pub struct RetryingSource<S> {
    inner: S,
    max_retries: u32,
    backoff: Duration,
}

impl<S: KeySource> RetryingSource<S> {
    pub fn new(inner: S, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }

    pub fn from_config(inner: S, config: &SourceConfig) -> Self {
        Self::new(inner, config.max_retries, config.retry_backoff)
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn retry<T>(
        &mut self,
        what: &str,
        mut op: impl FnMut(&mut S) -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        let mut attempt = 0;
        loop {
            match op(&mut self.inner) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(
                        "{} failed ({}), retry {}/{}",
                        what, e, attempt, self.max_retries
                    );
                    thread::sleep(self.backoff * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: KeySource> KeySource for RetryingSource<S> {
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError> {
        self.retry("list_keys", |s| s.list_keys())
    }

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError> {
        self.retry(key, |s| s.type_of(key))
    }

    fn size_of(&mut self, key: &str) -> Result<u64, SourceError> {
        self.retry(key, |s| s.size_of(key))
    }

    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError> {
        self.retry(key, |s| s.stats_of(key))
    }
}
