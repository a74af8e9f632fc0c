//! Walk a finished tree down to the requested depth.
//!
//! Depth counts levels below the root: depth 1 is the top-level namespaces.
//! A node becomes a row when the walk reaches the frontier. A subtree that
//! ends above the frontier still yields its leaves, so every leaf is covered
//! by exactly one row at any depth.

use crate::tree::{Metrics, NodeId, PrefixTree};
use crate::utils::config::WILDCARD_SUFFIX;

/// One frontier node, ready to be turned into a report row
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry<'a> {
    /// Display key, with `:*` appended to collapsed subtrees
    pub key: String,

    pub metrics: &'a Metrics,
}

/// Collect the frontier at `depth`, in tree order
///
/// **Public** - shared by the memory and hit rate projections
pub fn frontier(tree: &PrefixTree, depth: usize) -> Vec<FrontierEntry<'_>> {
    let mut entries = Vec::new();
    if depth == 0 {
        return entries;
    }

    for &child in &tree.root().children {
        walk(tree, child, depth, &mut entries);
    }
    entries
}

/// Frontier at `depth`, keeping only display keys that start with `prefix`
///
/// The walk is not pruned; filtering happens on the finished row set.
pub fn filtered_frontier<'a>(
    tree: &'a PrefixTree,
    depth: usize,
    prefix: &str,
) -> Vec<FrontierEntry<'a>> {
    let mut entries = frontier(tree, depth);
    if !prefix.is_empty() {
        entries.retain(|entry| entry.key.starts_with(prefix));
    }
    entries
}

fn walk<'a>(tree: &'a PrefixTree, id: NodeId, budget: usize, out: &mut Vec<FrontierEntry<'a>>) {
    let node = tree.node(id);

    if budget == 1 || node.is_leaf() {
        let key = if node.is_leaf() {
            node.key.clone()
        } else {
            format!("{}{}", node.key, WILDCARD_SUFFIX)
        };
        out.push(FrontierEntry {
            key,
            metrics: &node.metrics,
        });
        return;
    }

    for &child in &node.children {
        walk(tree, child, budget - 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build;

    fn keys_at(tree: &PrefixTree, depth: usize) -> Vec<String> {
        frontier(tree, depth).into_iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_frontier_depths() {
        let tree = build(&["a:b:c", "a:b:d", "a:e"]);

        assert_eq!(keys_at(&tree, 1), vec!["a:*"]);
        assert_eq!(keys_at(&tree, 2), vec!["a:b:*", "a:e"]);
        assert_eq!(keys_at(&tree, 3), vec!["a:b:c", "a:b:d", "a:e"]);
        assert_eq!(keys_at(&tree, 9), vec!["a:b:c", "a:b:d", "a:e"]);
    }

    #[test]
    fn test_frontier_depth_zero_is_empty() {
        let tree = build(&["a:b"]);
        assert!(frontier(&tree, 0).is_empty());
    }

    #[test]
    fn test_filtered_frontier() {
        let tree = build(&["a:b:c", "a:b:d", "a:e"]);
        let keys: Vec<String> = filtered_frontier(&tree, 2, "a:b")
            .into_iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(keys, vec!["a:b:*"]);
    }
}
