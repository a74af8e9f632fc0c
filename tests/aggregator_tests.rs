use keyspace_report::aggregator::{aggregate, HitratePolicy, MemoryPolicy};
use keyspace_report::source::{KeyRecord, KeySource, KeyStats, KeyType, MemoryKeySource};
use keyspace_report::tree::{build, Metrics, NodeId, PrefixTree, ROOT};
use keyspace_report::utils::error::SourceError;
use proptest::prelude::*;
use std::collections::HashMap;

/// Counts every query that reaches the wrapped source
struct CountingSource {
    inner: MemoryKeySource,
    queries: HashMap<String, usize>,
}

impl CountingSource {
    fn new(inner: MemoryKeySource) -> Self {
        Self {
            inner,
            queries: HashMap::new(),
        }
    }

    fn record(&mut self, key: &str) {
        *self.queries.entry(key.to_string()).or_insert(0) += 1;
    }
}

impl KeySource for CountingSource {
    fn list_keys(&mut self) -> Result<Vec<String>, SourceError> {
        self.inner.list_keys()
    }

    fn type_of(&mut self, key: &str) -> Result<KeyType, SourceError> {
        self.inner.type_of(key)
    }

    fn size_of(&mut self, key: &str) -> Result<u64, SourceError> {
        self.record(key);
        self.inner.size_of(key)
    }

    fn stats_of(&mut self, key: &str) -> Result<KeyStats, SourceError> {
        self.record(key);
        self.inner.stats_of(key)
    }
}

fn memory_source(keys: &[(&str, u64)]) -> MemoryKeySource {
    keys.iter().fold(MemoryKeySource::new(), |source, (key, size)| {
        source.with_key(*key, KeyRecord::new(KeyType::String, *size))
    })
}

fn stats(get: u64, set: u64, size: u64, lifetime: u64) -> KeyStats {
    KeyStats {
        get_count: get,
        set_count: set,
        size_bytes: size,
        lifetime_seconds: lifetime,
    }
}

/// Every internal node equals the sum of its children (recursively)
fn assert_rollup(tree: &PrefixTree, id: NodeId) -> Metrics {
    let node = tree.node(id);
    if id != ROOT && node.is_leaf() {
        assert_eq!(node.metrics.leaf_count, 1, "leaf {} must count itself", node.key);
        return node.metrics;
    }

    let mut sum = Metrics::default();
    for &child in &node.children {
        sum += &assert_rollup(tree, child);
    }
    assert_eq!(node.metrics, sum, "node {} is not the sum of its children", node.key);
    sum
}

fn count_leaves(tree: &PrefixTree, id: NodeId) -> u64 {
    let node = tree.node(id);
    if id != ROOT && node.is_leaf() {
        return 1;
    }
    node.children.iter().map(|&c| count_leaves(tree, c)).sum()
}

#[test]
fn test_memory_example_rollup() {
    let keys = ["a:b:c", "a:b:d", "a:e"];
    let mut source = memory_source(&[("a:b:c", 10), ("a:b:d", 10), ("a:e", 10)]);
    let mut tree = build(&keys);

    aggregate(&mut tree, &mut source, &MemoryPolicy);

    let ab = tree.node(tree.find("a:b").unwrap()).metrics;
    let a = tree.node(tree.find("a").unwrap()).metrics;
    assert_eq!(ab.leaf_count, 2);
    assert_eq!(ab.size_bytes, 20);
    assert_eq!(a.leaf_count, 3);
    assert_eq!(a.size_bytes, 30);
    assert_rollup(&tree, ROOT);
}

#[test]
fn test_each_leaf_queried_exactly_once() {
    let keys = ["x:1", "x:2:a", "x:2:b", "y", "y"];
    let inner = memory_source(&[("x:1", 1), ("x:2:a", 2), ("x:2:b", 3), ("y", 4)]);
    let mut source = CountingSource::new(inner);
    let mut tree = build(&keys);

    let summary = aggregate(&mut tree, &mut source, &MemoryPolicy);

    assert_eq!(summary.leaves_queried, 4);
    assert_eq!(source.queries.len(), 4);
    assert!(source.queries.values().all(|&n| n == 1));
    assert!(!source.queries.contains_key("x"));
    assert!(!source.queries.contains_key("x:2"));
}

#[test]
fn test_hitrate_rollup_sums_sample_counters() {
    let source = MemoryKeySource::new()
        .with_key("s:a", KeyRecord::default().with_stats(stats(9, 1, 100, 60)))
        .with_key("s:b", KeyRecord::default().with_stats(stats(0, 0, 0, 0)))
        .with_key("s:c", KeyRecord::default().with_stats(stats(1, 1, 50, 0)));
    let mut source = source;
    let mut tree = build(&["s:a", "s:b", "s:c"]);

    aggregate(&mut tree, &mut source, &HitratePolicy);

    let s = tree.node(tree.find("s").unwrap()).metrics;
    assert_eq!(s.leaf_count, 3);
    assert_eq!(s.get_count, 10);
    assert_eq!(s.set_count, 2);
    assert_eq!(s.size_bytes, 150);
    assert_eq!(s.size_sample_count, 2);
    assert_eq!(s.lifetime_total, 60);
    assert_eq!(s.lifetime_sample_count, 1);
    assert_eq!(s.network_traffic_bytes, 10 * 100 + 2 * 50);
    assert_rollup(&tree, ROOT);
}

#[test]
fn test_failed_queries_do_not_stop_the_walk() {
    let mut source = memory_source(&[("k:ok", 7)]);
    let mut tree = build(&["k:gone", "k:ok", "k:also_gone"]);

    let summary = aggregate(&mut tree, &mut source, &MemoryPolicy);

    assert_eq!(summary.failed_leaves, 2);
    assert_eq!(tree.root().metrics.leaf_count, 3);
    assert_eq!(tree.root().metrics.size_bytes, 7);
}

#[test]
fn test_aggregate_is_repeatable() {
    let mut source = memory_source(&[("a:1", 3), ("a:2", 4)]);
    let mut tree = build(&["a:1", "a:2"]);

    let first = aggregate(&mut tree, &mut source, &MemoryPolicy);
    let second = aggregate(&mut tree, &mut source, &MemoryPolicy);

    assert_eq!(first.totals, second.totals);
    assert_eq!(tree.root().metrics.size_bytes, 7);
}

proptest! {
    #[test]
    fn prop_leaf_count_matches_leaf_descendants(
        keyspace in prop::collection::btree_map("[a-c]{1,2}(:[a-c]{1,2}){0,3}", 0u64..1000, 0..40)
    ) {
        let keys: Vec<String> = keyspace.keys().cloned().collect();
        let mut source = keyspace.iter().fold(MemoryKeySource::new(), |s, (k, size)| {
            s.with_key(k.clone(), KeyRecord::new(KeyType::Hash, *size))
        });
        let mut tree = build(&keys);

        aggregate(&mut tree, &mut source, &MemoryPolicy);

        for (id, node) in tree.nodes().iter().enumerate() {
            prop_assert_eq!(node.metrics.leaf_count, count_leaves(&tree, id));
        }
        assert_rollup(&tree, ROOT);
    }
}
