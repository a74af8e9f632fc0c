//! Configuration and constants for the CLI.

use std::time::Duration;

/// Separator between namespace segments in a key name
pub const NAMESPACE_SEPARATOR: char = ':';

/// Display path of the synthetic root node
///
/// The root is addressed by index, never by path, so a real key named
/// `ROOT` cannot collide with it.
pub const ROOT_KEY: &str = "ROOT";

/// Suffix appended to collapsed subtrees in report rows
pub const WILDCARD_SUFFIX: &str = ":*";

/// Keys with more segments than this are skipped when building a tree
///
/// Tree walks recurse once per level, so this also bounds their stack depth.
pub const MAX_KEY_SEGMENTS: usize = 512;

/// Default report depth (levels below the root)
pub const DEFAULT_DEPTH: usize = 2;

/// Default directory for tree snapshots
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default cache store endpoint
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default timeout for a single key source query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries after the first failed attempt of a transient query
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay between retries (multiplied by the attempt number)
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Current snapshot schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Emit a progress line every N keys while building or aggregating
pub const PROGRESS_LOG_INTERVAL: usize = 10_000;

/// Connection settings for a key source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            timeout: DEFAULT_QUERY_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl SourceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}
