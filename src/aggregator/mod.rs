//! Aggregation of per-key metrics up the prefix tree.
//!
//! This module populates a built tree with:
//! - Memory rollups (key counts and value sizes)
//! - Hit rate rollups (gets, sets, sizes, lifetimes, traffic)

pub mod policy;
pub mod rollup;

// Re-export main types and functions
pub use policy::{AggregationPolicy, HitratePolicy, MemoryPolicy};
pub use rollup::{aggregate, AggregationSummary};
