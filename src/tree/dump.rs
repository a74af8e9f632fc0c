//! Plain-text structural dump of a prefix tree, for debugging reports.

use super::node::{NodeId, PrefixTree, ROOT};

/// Render the tree as indented lines, one node per line
///
/// **Public** - used by the `tree` command
///
/// # Example output
/// ```text
/// ROOT - (leaves: 3)
/// ----a - (leaves: 3)
/// --------a:b - (leaves: 2)
/// ```
pub fn render_tree(tree: &PrefixTree, max_depth: usize) -> String {
    let mut out = String::new();
    render_node(tree, ROOT, 0, max_depth, &mut out);
    out
}

fn render_node(tree: &PrefixTree, id: NodeId, level: usize, max_depth: usize, out: &mut String) {
    let node = tree.node(id);

    let info = if id != ROOT && node.is_leaf() {
        "(leaf)".to_string()
    } else {
        format!("(leaves: {})", node.metrics.leaf_count)
    };

    out.push_str(&"----".repeat(level));
    out.push_str(&format!("{} - {}\n", node.key, info));

    if level < max_depth {
        for &child in &node.children {
            render_node(tree, child, level + 1, max_depth, out);
        }
    }
}
