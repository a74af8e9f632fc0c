//! Hit rate report rows.

use super::projector::filtered_frontier;
use super::{bytes_to_mb, format_optional};
use crate::tree::PrefixTree;
use serde::{Deserialize, Serialize};

/// Column headers of the hit rate table
pub const HITRATE_HEADERS: [&str; 8] = [
    "Key",
    "Nr. Keys",
    "GET",
    "SET",
    "Hit Rate(%)",
    "Size (KB)",
    "Lifetime (seconds)",
    "Network Traffic (MB)",
];

/// One row of the hit rate report
///
/// Averages are `None` when no key under the row reported the metric,
/// which keeps "no data" apart from a genuine zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitrateRow {
    /// Key name, or group if it ends with a wildcard
    pub key: String,

    pub leaf_count: u64,

    pub get_count: u64,

    pub set_count: u64,

    /// gets / (gets + sets) as a truncated percentage
    pub hit_rate: u32,

    /// Average value size over keys that reported one
    pub avg_size_kb: Option<f64>,

    /// Average lifetime over keys that reported one
    pub avg_lifetime_seconds: Option<f64>,

    pub network_traffic_mb: Option<f64>,
}

impl HitrateRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.leaf_count.to_string(),
            self.get_count.to_string(),
            self.set_count.to_string(),
            self.hit_rate.to_string(),
            format_optional(self.avg_size_kb),
            format_optional(self.avg_lifetime_seconds),
            format_optional(self.network_traffic_mb),
        ]
    }
}

/// Project a hitrate-aggregated tree into rows
///
/// **Public** - main entry point for the hit rate view
///
/// Rows are sorted by hit rate, worst first.
pub fn project_hitrate(tree: &PrefixTree, depth: usize, prefix: &str) -> Vec<HitrateRow> {
    let mut rows: Vec<HitrateRow> = filtered_frontier(tree, depth, prefix)
        .into_iter()
        .map(|entry| {
            let m = entry.metrics;
            HitrateRow {
                leaf_count: m.leaf_count,
                get_count: m.get_count,
                set_count: m.set_count,
                hit_rate: hit_rate(m.get_count, m.set_count),
                avg_size_kb: average(m.size_bytes, m.size_sample_count).map(|b| b / 1024.0),
                avg_lifetime_seconds: average(m.lifetime_total, m.lifetime_sample_count),
                network_traffic_mb: (m.network_traffic_bytes > 0)
                    .then(|| bytes_to_mb(m.network_traffic_bytes)),
                key: entry.key,
            }
        })
        .collect();

    rows.sort_by_key(|row| row.hit_rate);
    rows
}

/// Hit rate as a truncated percentage; 0 when there was no traffic
pub fn hit_rate(gets: u64, sets: u64) -> u32 {
    let total = u128::from(gets) + u128::from(sets);
    if total == 0 {
        return 0;
    }
    (u128::from(gets) * 100 / total) as u32
}

fn average(total: u64, samples: u64) -> Option<f64> {
    if samples == 0 {
        return None;
    }
    Some(total as f64 / samples as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        assert_eq!(hit_rate(0, 0), 0);
        assert_eq!(hit_rate(1, 2), 33);
        assert_eq!(hit_rate(2, 1), 66);
        assert_eq!(hit_rate(5, 0), 100);
        assert_eq!(hit_rate(u64::MAX, u64::MAX), 50);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(10, 0), None);
        assert_eq!(average(10, 4), Some(2.5));
    }

    #[test]
    fn test_hitrate_row_cells_absent_values() {
        let row = HitrateRow {
            key: "a:b".to_string(),
            leaf_count: 1,
            get_count: 0,
            set_count: 0,
            hit_rate: 0,
            avg_size_kb: None,
            avg_lifetime_seconds: Some(12.0),
            network_traffic_mb: None,
        };

        assert_eq!(
            row.cells(),
            vec!["a:b", "1", "0", "0", "0", "n/a", "12.00", "n/a"]
        );
    }
}
