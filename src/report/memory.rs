//! Memory distribution report rows.

use super::projector::filtered_frontier;
use super::{bytes_to_mb, format_float};
use crate::tree::PrefixTree;
use serde::{Deserialize, Serialize};

/// Column headers of the memory table
pub const MEMORY_HEADERS: [&str; 4] = ["Key", "Nr. Keys", "Size (MB)", "Size (%)"];

/// One row of the memory report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRow {
    /// Key name, or group if it ends with a wildcard
    pub key: String,

    /// Number of keys under this row
    pub leaf_count: u64,

    pub size_bytes: u64,

    pub size_mb: f64,

    /// Share of the whole keyspace's size
    pub size_percent: f64,
}

impl MemoryRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.leaf_count.to_string(),
            format_float(self.size_mb),
            format_float(self.size_percent),
        ]
    }
}

/// Project a memory-aggregated tree into rows
///
/// **Public** - main entry point for the memory view
///
/// Rows are sorted by key count, largest first.
pub fn project_memory(tree: &PrefixTree, depth: usize, prefix: &str) -> Vec<MemoryRow> {
    let total_bytes = tree.root().metrics.size_bytes;

    let mut rows: Vec<MemoryRow> = filtered_frontier(tree, depth, prefix)
        .into_iter()
        .map(|entry| MemoryRow {
            size_mb: bytes_to_mb(entry.metrics.size_bytes),
            size_percent: percentage(entry.metrics.size_bytes, total_bytes),
            leaf_count: entry.metrics.leaf_count,
            size_bytes: entry.metrics.size_bytes,
            key: entry.key,
        })
        .collect();

    rows.sort_by(|a, b| b.leaf_count.cmp(&a.leaf_count));
    rows
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
