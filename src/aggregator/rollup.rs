//! Bottom-up metric rollup over a built prefix tree.
//!
//! One post-order pass: every leaf is queried exactly once, every internal
//! node is the fold of its children, and each call hands its subtree total
//! back to the caller so nothing is walked twice.

use super::policy::AggregationPolicy;
use crate::source::KeySource;
use crate::tree::{Metrics, NodeId, PrefixTree, ROOT};
use crate::utils::config::PROGRESS_LOG_INTERVAL;
use log::{debug, info, warn};

/// Outcome of an aggregation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Metrics stored on the root
    pub totals: Metrics,

    /// Number of leaves queried (one query each)
    pub leaves_queried: usize,

    /// Leaves whose query failed and were recorded as empty
    pub failed_leaves: usize,
}

/// Populate every node's metrics
///
/// **Public** - main entry point for aggregation
///
/// A failed leaf query is logged and the leaf is recorded with
/// `leaf_count = 1` and every other metric zero; the walk continues.
/// Zero therefore also means "lookup failed" in the finished tree.
pub fn aggregate(
    tree: &mut PrefixTree,
    source: &mut dyn KeySource,
    policy: &dyn AggregationPolicy,
) -> AggregationSummary {
    let total_leaves = tree.leaves().count();
    info!(
        "Aggregating {} leaves with {} policy",
        total_leaves,
        policy.name()
    );

    let mut walk = Walk {
        source,
        policy,
        total_leaves,
        summary: AggregationSummary::default(),
    };
    let totals = walk.visit(tree, ROOT);

    let mut summary = walk.summary;
    summary.totals = totals;

    if summary.failed_leaves > 0 {
        warn!(
            "{} of {} leaf queries failed and were recorded as empty",
            summary.failed_leaves, summary.leaves_queried
        );
    }
    debug!("Aggregation totals: {:?}", summary.totals);

    summary
}

struct Walk<'a> {
    source: &'a mut dyn KeySource,
    policy: &'a dyn AggregationPolicy,
    total_leaves: usize,
    summary: AggregationSummary,
}

impl Walk<'_> {
    fn visit(&mut self, tree: &mut PrefixTree, id: NodeId) -> Metrics {
        // The root is never queried, even when the tree is empty.
        if id != ROOT && tree.node(id).is_leaf() {
            let metrics = self.query_leaf(&tree.node(id).key);
            tree.node_mut(id).metrics = metrics;
            return metrics;
        }

        let mut total = Metrics::default();
        for i in 0..tree.node(id).children.len() {
            let child = tree.node(id).children[i];
            let child_metrics = self.visit(tree, child);
            self.policy.combine(&mut total, &child_metrics);
        }

        tree.node_mut(id).metrics = total;
        total
    }

    fn query_leaf(&mut self, key: &str) -> Metrics {
        self.summary.leaves_queried += 1;
        if self.summary.leaves_queried % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                "Populating the report: {}/{} keys",
                self.summary.leaves_queried, self.total_leaves
            );
        }

        match self.policy.leaf_metrics(&mut *self.source, key) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Lookup failed for key {}: {}", key, e);
                self.summary.failed_leaves += 1;
                Metrics::empty_leaf()
            }
        }
    }
}
