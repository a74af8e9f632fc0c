//! Build the prefix tree from a flat list of key names.
//!
//! Each key is decomposed into its namespace prefixes and every prefix is
//! inserted under the one before it:
//!
//! ```text
//! cache:page:home  ->  cache
//!                      cache:page
//!                      cache:page:home
//! ```

use super::node::PrefixTree;
use crate::utils::config::{MAX_KEY_SEGMENTS, NAMESPACE_SEPARATOR, PROGRESS_LOG_INTERVAL};
use log::{debug, info, warn};
use std::thread;

/// Below this many keys the parallel build just runs sequentially
const PARALLEL_THRESHOLD: usize = 2;

/// Build a prefix tree from key names
///
/// **Public** - canonical single-threaded build
///
/// Order, duplicates and keys that are prefixes of other keys do not
/// affect the resulting set of paths; child order is first-seen.
pub fn build<S: AsRef<str>>(keys: &[S]) -> PrefixTree {
    let mut tree = PrefixTree::new();
    let total = keys.len();
    let mut skipped = 0;

    for (i, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        if segment_count(key) > MAX_KEY_SEGMENTS {
            warn!(
                "Skipping key with more than {} segments: {:.64}...",
                MAX_KEY_SEGMENTS, key
            );
            skipped += 1;
        } else {
            tree.insert_key(key);
        }

        if (i + 1) % PROGRESS_LOG_INTERVAL == 0 {
            info!("Building report tree: {}/{} keys", i + 1, total);
        }
    }

    debug!(
        "Built tree with {} nodes from {} keys ({} skipped)",
        tree.node_count(),
        total,
        skipped
    );
    tree
}

fn segment_count(key: &str) -> usize {
    key.matches(NAMESPACE_SEPARATOR).count() + 1
}

/// Build a prefix tree on two worker threads
///
/// **Public** - fork/join fast path
///
/// The keys are sorted and split at the midpoint; each half is built into
/// its own tree by an independent worker and the right tree is grafted onto
/// the left one by path. Every key, including the one at the split point,
/// ends up in the result, which is identical to `build` over the sorted keys.
pub fn build_parallel<S: AsRef<str> + Sync>(keys: &[S]) -> PrefixTree {
    let mut sorted: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    if sorted.len() < PARALLEL_THRESHOLD {
        return build(&sorted);
    }

    let (left, right) = sorted.split_at(sorted.len() / 2);
    debug!(
        "Splitting {} keys at {:?} for parallel build",
        sorted.len(),
        right.first()
    );

    let joined = thread::scope(|scope| {
        let left_worker = scope.spawn(|| build(left));
        let right_worker = scope.spawn(|| build(right));
        (left_worker.join(), right_worker.join())
    });

    match joined {
        (Ok(mut tree), Ok(right_tree)) => {
            tree.graft(right_tree);
            debug!("Merged parallel build into {} nodes", tree.node_count());
            tree
        }
        _ => {
            warn!("Parallel build worker panicked, falling back to sequential build");
            build(&sorted)
        }
    }
}
