//! Per-report aggregation policies.
//!
//! A policy decides what a leaf's metrics are (one key source query per
//! leaf) and how a child's metrics fold into its parent. The traversal
//! itself is shared, see `rollup`.

use crate::source::KeySource;
use crate::tree::Metrics;
use crate::utils::error::SourceError;

/// One variant of the shared bottom-up traversal
pub trait AggregationPolicy {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Query the source once and build the metrics of a leaf
    fn leaf_metrics(&self, source: &mut dyn KeySource, key: &str) -> Result<Metrics, SourceError>;

    /// Fold a child's metrics into its parent's running total
    fn combine(&self, total: &mut Metrics, child: &Metrics) {
        *total += child;
    }
}

/// Memory distribution: value sizes and key counts
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryPolicy;

impl AggregationPolicy for MemoryPolicy {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn leaf_metrics(&self, source: &mut dyn KeySource, key: &str) -> Result<Metrics, SourceError> {
        let size_bytes = source.size_of(key)?;
        Ok(Metrics {
            leaf_count: 1,
            size_bytes,
            ..Metrics::default()
        })
    }

    fn combine(&self, total: &mut Metrics, child: &Metrics) {
        total.leaf_count = total.leaf_count.saturating_add(child.leaf_count);
        total.size_bytes = total.size_bytes.saturating_add(child.size_bytes);
    }
}

/// Hit rate: access counters, sizes, lifetimes and traffic
#[derive(Debug, Clone, Copy, Default)]
pub struct HitratePolicy;

impl AggregationPolicy for HitratePolicy {
    fn name(&self) -> &'static str {
        "hitrate"
    }

    fn leaf_metrics(&self, source: &mut dyn KeySource, key: &str) -> Result<Metrics, SourceError> {
        let stats = source.stats_of(key)?;

        let has_size = stats.size_bytes > 0;
        let has_lifetime = stats.lifetime_seconds > 0;

        let network_traffic_bytes = if has_size {
            stats
                .get_count
                .saturating_add(stats.set_count)
                .saturating_mul(stats.size_bytes)
        } else {
            0
        };

        Ok(Metrics {
            leaf_count: 1,
            size_bytes: stats.size_bytes,
            size_sample_count: u64::from(has_size),
            get_count: stats.get_count,
            set_count: stats.set_count,
            lifetime_total: stats.lifetime_seconds,
            lifetime_sample_count: u64::from(has_lifetime),
            network_traffic_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{KeyRecord, KeyStats, KeyType, MemoryKeySource};

    #[test]
    fn test_memory_leaf_metrics() {
        let mut source =
            MemoryKeySource::new().with_key("a", KeyRecord::new(KeyType::Set, 64));

        let m = MemoryPolicy.leaf_metrics(&mut source, "a").unwrap();
        assert_eq!(m.leaf_count, 1);
        assert_eq!(m.size_bytes, 64);
        assert_eq!(m.size_sample_count, 0);
    }

    #[test]
    fn test_hitrate_leaf_metrics() {
        let stats = KeyStats {
            get_count: 8,
            set_count: 2,
            size_bytes: 100,
            lifetime_seconds: 0,
        };
        let mut source = MemoryKeySource::new()
            .with_key("a", KeyRecord::new(KeyType::String, 100).with_stats(stats));

        let m = HitratePolicy.leaf_metrics(&mut source, "a").unwrap();
        assert_eq!(m.network_traffic_bytes, 1000);
        assert_eq!(m.size_sample_count, 1);
        assert_eq!(m.lifetime_sample_count, 0);
        assert_eq!(m.lifetime_total, 0);
    }

    #[test]
    fn test_hitrate_no_size_means_no_traffic() {
        let stats = KeyStats {
            get_count: 5,
            set_count: 5,
            size_bytes: 0,
            lifetime_seconds: 12,
        };
        let mut source = MemoryKeySource::new()
            .with_key("a", KeyRecord::default().with_stats(stats));

        let m = HitratePolicy.leaf_metrics(&mut source, "a").unwrap();
        assert_eq!(m.network_traffic_bytes, 0);
        assert_eq!(m.size_sample_count, 0);
        assert_eq!(m.lifetime_sample_count, 1);
    }

    #[test]
    fn test_memory_combine_ignores_hitrate_fields() {
        let mut total = Metrics::default();
        let child = Metrics {
            leaf_count: 2,
            size_bytes: 30,
            get_count: 9,
            ..Metrics::default()
        };
        MemoryPolicy.combine(&mut total, &child);

        assert_eq!(total.leaf_count, 2);
        assert_eq!(total.size_bytes, 30);
        assert_eq!(total.get_count, 0);
    }
}
