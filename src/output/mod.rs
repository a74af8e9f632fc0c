//! Output and persistence.
//!
//! This module handles writing data to disk and to the console:
//! - Tree snapshots (save, load, invalidate)
//! - ASCII tables
//! - JSON reports

pub mod json;
pub mod snapshot;
pub mod table;

// Re-export main types and functions
pub use json::{report_to_string, write_report};
pub use snapshot::{Snapshot, SnapshotStore};
pub use table::{render_table, Table};
