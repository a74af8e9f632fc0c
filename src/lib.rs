//! Keyspace Report
//!
//! Hierarchical memory and hit-rate reports for a flat,
//! colon-namespaced cache keyspace.
//!
//! Pipeline: a key source lists every key, the tree builder turns the key
//! names into a prefix tree, the aggregator queries each leaf once and sums
//! metrics upward, and the projector flattens the frozen tree into report
//! rows at a chosen depth. Aggregated trees are snapshotted to disk so later
//! runs can skip the source entirely.
//!
//! ```ignore
//! use keyspace_report::aggregator::{aggregate, MemoryPolicy};
//! use keyspace_report::report::project_memory;
//! use keyspace_report::tree::build;
//!
//! let mut tree = build(&keys);
//! aggregate(&mut tree, &mut source, &MemoryPolicy);
//! let rows = project_memory(&tree, 2, "");
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod report;
pub mod source;
pub mod tree;
pub mod utils;
