//! Arena-backed prefix tree over colon-namespaced key names.
//!
//! Nodes live in a flat `Vec` and refer to their children by index.
//! Parents are never stored: building appends, aggregation walks bottom-up
//! and projection walks top-down, so no back-pointer is ever needed.
//!
//! Invariants held by every `PrefixTree`:
//! - index 0 is the synthetic root
//! - a child's index is strictly greater than its parent's
//! - every non-root node has exactly one parent
//! - a child's path is its parent's path plus one segment

use crate::utils::config::{MAX_KEY_SEGMENTS, NAMESPACE_SEPARATOR, ROOT_KEY};
use crate::utils::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::AddAssign;

/// Stable index of a node inside its tree
pub type NodeId = usize;

/// Index of the synthetic root node
pub const ROOT: NodeId = 0;

/// Metric bundle carried by every node
///
/// On leaves these are the values reported by the key source; on internal
/// nodes, after aggregation, each field is the sum over the direct children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of leaf keys in the subtree (1 on a leaf)
    pub leaf_count: u64,

    /// Bytes occupied by the values in the subtree
    pub size_bytes: u64,

    /// Number of leaves that reported a positive size
    pub size_sample_count: u64,

    /// Number of GET operations
    pub get_count: u64,

    /// Number of SET operations
    pub set_count: u64,

    /// Sum of reported lifetimes (seconds between two consecutive sets)
    pub lifetime_total: u64,

    /// Number of leaves that reported a positive lifetime
    pub lifetime_sample_count: u64,

    /// Bytes moved in and out of the subtree: (gets + sets) * size per leaf
    pub network_traffic_bytes: u64,
}

impl Metrics {
    /// Metrics for a leaf whose lookup produced no data
    pub fn empty_leaf() -> Self {
        Self {
            leaf_count: 1,
            ..Self::default()
        }
    }
}

impl AddAssign<&Metrics> for Metrics {
    fn add_assign(&mut self, other: &Metrics) {
        self.leaf_count = self.leaf_count.saturating_add(other.leaf_count);
        self.size_bytes = self.size_bytes.saturating_add(other.size_bytes);
        self.size_sample_count = self.size_sample_count.saturating_add(other.size_sample_count);
        self.get_count = self.get_count.saturating_add(other.get_count);
        self.set_count = self.set_count.saturating_add(other.set_count);
        self.lifetime_total = self.lifetime_total.saturating_add(other.lifetime_total);
        self.lifetime_sample_count = self
            .lifetime_sample_count
            .saturating_add(other.lifetime_sample_count);
        self.network_traffic_bytes = self
            .network_traffic_bytes
            .saturating_add(other.network_traffic_bytes);
    }
}

/// A single namespace node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Full namespace path, e.g. `cache:page:home`
    pub key: String,

    /// Child indices in first-seen order
    pub children: Vec<NodeId>,

    pub metrics: Metrics,
}

impl Node {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
            metrics: Metrics::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Prefix tree of namespace paths
#[derive(Debug, Clone)]
pub struct PrefixTree {
    nodes: Vec<Node>,

    /// Path -> index for every non-root node
    index: HashMap<String, NodeId>,
}

impl Default for PrefixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTree {
    /// Create a tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(ROOT_KEY)],
            index: HashMap::new(),
        }
    }

    /// Rebuild a tree from a previously serialized node arena
    ///
    /// # Errors
    /// * `SnapshotError::Corrupt` - the arena violates a tree invariant
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, SnapshotError> {
        if nodes.is_empty() {
            return Err(SnapshotError::Corrupt("missing root node".to_string()));
        }

        let count = nodes.len();
        let mut owned = vec![false; count];
        let mut depth = vec![0usize; count];
        let mut index = HashMap::with_capacity(count - 1);

        for (id, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                if child <= id || child >= count {
                    return Err(SnapshotError::Corrupt(format!(
                        "node {} has out-of-order child index {}",
                        id, child
                    )));
                }
                if owned[child] {
                    return Err(SnapshotError::Corrupt(format!(
                        "node {} has more than one parent",
                        child
                    )));
                }
                owned[child] = true;

                depth[child] = depth[id] + 1;
                if depth[child] > MAX_KEY_SEGMENTS {
                    return Err(SnapshotError::Corrupt(format!(
                        "node {} is nested deeper than {} levels",
                        child, MAX_KEY_SEGMENTS
                    )));
                }

                if !is_direct_child(&node.key, &nodes[child].key, id == ROOT) {
                    return Err(SnapshotError::Corrupt(format!(
                        "{} is not a direct child of {}",
                        nodes[child].key, node.key
                    )));
                }
            }

            if id != ROOT && index.insert(node.key.clone(), id).is_some() {
                return Err(SnapshotError::Corrupt(format!("duplicate path {}", node.key)));
            }
        }

        if let Some(orphan) = owned.iter().skip(1).position(|&has_parent| !has_parent) {
            return Err(SnapshotError::Corrupt(format!(
                "node {} is unreachable from the root",
                orphan + 1
            )));
        }

        Ok(Self { nodes, index })
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    /// Panics if `id` did not come from this tree
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Number of nodes, not counting the root
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True when nothing but the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node by its full namespace path
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Iterate over every leaf node (the root is never a leaf)
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().skip(1).filter(|node| node.is_leaf())
    }

    /// Parent/child path pairs, with the root reported as `ROOT_KEY`
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|parent| {
                parent
                    .children
                    .iter()
                    .map(move |&child| (parent.key.as_str(), self.nodes[child].key.as_str()))
            })
            .collect()
    }

    /// Insert every namespace prefix of `key`
    ///
    /// Inserting an already present key is a no-op.
    pub fn insert_key(&mut self, key: &str) {
        let mut parent = ROOT;
        for prefix in prefixes(key) {
            parent = self.attach(parent, prefix);
        }
    }

    /// Merge another tree into this one by path
    ///
    /// Metrics of `other` are discarded; grafting happens before aggregation.
    pub fn graft(&mut self, other: PrefixTree) {
        let mut parents = vec![ROOT; other.nodes.len()];
        for (id, node) in other.nodes.iter().enumerate() {
            for &child in &node.children {
                parents[child] = id;
            }
        }

        // Arena order is first-seen order and parents precede children, so
        // replaying it reproduces a sequential insert of the same keys.
        let mut mapped = vec![ROOT; other.nodes.len()];
        for (id, node) in other.nodes.iter().enumerate().skip(1) {
            mapped[id] = self.attach(mapped[parents[id]], &node.key);
        }
    }

    /// Find or create the node for `path` under `parent`
    ///
    /// A path fixes its parent (the path minus its last segment), so an
    /// existing entry in the index is always already attached to `parent`.
    fn attach(&mut self, parent: NodeId, path: &str) -> NodeId {
        if let Some(&id) = self.index.get(path) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node::new(path));
        self.nodes[parent].children.push(id);
        self.index.insert(path.to_string(), id);
        id
    }
}

/// Namespace prefixes of a key, shortest first
///
/// `"a:b:c"` yields `"a"`, `"a:b"`, `"a:b:c"`.
pub fn prefixes(key: &str) -> impl Iterator<Item = &str> + '_ {
    key.match_indices(NAMESPACE_SEPARATOR)
        .map(move |(i, _)| &key[..i])
        .chain(std::iter::once(key))
}

/// Whether `child` is `parent` extended by exactly one whole segment
fn is_direct_child(parent: &str, child: &str, parent_is_root: bool) -> bool {
    let tail = if parent_is_root {
        child
    } else {
        match child
            .strip_prefix(parent)
            .and_then(|rest| rest.strip_prefix(NAMESPACE_SEPARATOR))
        {
            Some(tail) => tail,
            None => return false,
        }
    };
    !tail.contains(NAMESPACE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let p: Vec<&str> = prefixes("pantheon-redis:cache_page:www.example.com").collect();
        assert_eq!(
            p,
            vec![
                "pantheon-redis",
                "pantheon-redis:cache_page",
                "pantheon-redis:cache_page:www.example.com"
            ]
        );
    }

    #[test]
    fn test_prefixes_keep_empty_segments() {
        let p: Vec<&str> = prefixes("a::b").collect();
        assert_eq!(p, vec!["a", "a:", "a::b"]);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut tree = PrefixTree::new();
        tree.insert_key("a:b");
        tree.insert_key("a:b");
        tree.insert_key("a");

        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.root().children.len(), 1);
    }

    #[test]
    fn test_segment_aware_attachment() {
        let mut tree = PrefixTree::new();
        tree.insert_key("foo:x");
        tree.insert_key("foobar:y");

        let foo = tree.find("foo").unwrap();
        let foobar = tree.find("foobar").unwrap();

        assert_eq!(tree.root().children, vec![foo, foobar]);
        assert_eq!(tree.node(foo).children.len(), 1);
        assert_eq!(tree.node(tree.node(foo).children[0]).key, "foo:x");
        assert_eq!(tree.node(tree.node(foobar).children[0]).key, "foobar:y");
    }

    #[test]
    fn test_root_key_is_not_a_path() {
        let mut tree = PrefixTree::new();
        tree.insert_key(ROOT_KEY);

        assert_eq!(tree.node_count(), 1);
        assert_ne!(tree.find(ROOT_KEY), Some(ROOT));
    }

    #[test]
    fn test_graft_merges_shared_branches() {
        let mut left = PrefixTree::new();
        left.insert_key("a:1");
        let mut right = PrefixTree::new();
        right.insert_key("a:2");
        right.insert_key("b:1");

        left.graft(right);

        let a = left.find("a").unwrap();
        assert_eq!(left.root().children.len(), 2);
        assert_eq!(left.node(a).children.len(), 2);
        assert!(left.find("b:1").is_some());
    }

    #[test]
    fn test_from_nodes_round_trip() {
        let mut tree = PrefixTree::new();
        tree.insert_key("a:b:c");
        tree.insert_key("a:e");

        let rebuilt = PrefixTree::from_nodes(tree.clone().into_nodes()).unwrap();
        assert_eq!(rebuilt.nodes(), tree.nodes());
        assert_eq!(rebuilt.find("a:b"), tree.find("a:b"));
    }

    #[test]
    fn test_from_nodes_rejects_cycles() {
        let mut tree = PrefixTree::new();
        tree.insert_key("a:b");
        let mut nodes = tree.into_nodes();
        nodes[2].children.push(1);

        assert!(matches!(
            PrefixTree::from_nodes(nodes),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn test_from_nodes_rejects_misattached_child() {
        let mut tree = PrefixTree::new();
        tree.insert_key("foo");
        tree.insert_key("foobar:x");
        let mut nodes = tree.into_nodes();
        // Move "foobar:x" under "foo" (string prefix, not a segment prefix).
        let foobar = nodes[ROOT].children[1];
        let x = nodes[foobar].children.remove(0);
        nodes[1].children.push(x);

        assert!(matches!(
            PrefixTree::from_nodes(nodes),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn test_from_nodes_rejects_overly_deep_chains() {
        let mut tree = PrefixTree::new();
        tree.insert_key(&vec!["d"; MAX_KEY_SEGMENTS + 1].join(":"));

        assert!(matches!(
            PrefixTree::from_nodes(tree.into_nodes()),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn test_from_nodes_rejects_orphans() {
        let mut tree = PrefixTree::new();
        tree.insert_key("a");
        let mut nodes = tree.into_nodes();
        nodes[ROOT].children.clear();

        assert!(PrefixTree::from_nodes(nodes).is_err());
        assert!(PrefixTree::from_nodes(Vec::new()).is_err());
    }

    #[test]
    fn test_metrics_add_assign() {
        let mut total = Metrics::default();
        let leaf = Metrics {
            leaf_count: 1,
            size_bytes: 10,
            get_count: 3,
            ..Metrics::default()
        };
        total += &leaf;
        total += &leaf;

        assert_eq!(total.leaf_count, 2);
        assert_eq!(total.size_bytes, 20);
        assert_eq!(total.get_count, 6);
        assert_eq!(total.set_count, 0);
    }
}
