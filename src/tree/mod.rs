//! Prefix tree construction over colon-namespaced keys.
//!
//! This module turns a flat keyspace into:
//! - An arena-backed tree of namespace paths
//! - A fork/join build for large keyspaces
//! - A structural text dump for debugging

pub mod builder;
pub mod dump;
pub mod node;

// Re-export main types and functions
pub use builder::{build, build_parallel};
pub use dump::render_tree;
pub use node::{prefixes, Metrics, Node, NodeId, PrefixTree, ROOT};
