//! Report projection: from a frozen tree to ordered, display-ready rows.
//!
//! Two views share one frontier walk:
//! - memory: key counts and size share per namespace
//! - hit rate: gets, sets, hit rate, average size/lifetime, traffic

pub mod hitrate;
pub mod memory;
pub mod projector;

use crate::aggregator::{AggregationPolicy, HitratePolicy, MemoryPolicy};
use crate::output::Table;
use crate::tree::PrefixTree;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export main types and functions
pub use hitrate::{hit_rate, project_hitrate, HitrateRow, HITRATE_HEADERS};
pub use memory::{project_memory, MemoryRow, MEMORY_HEADERS};
pub use projector::{filtered_frontier, frontier, FrontierEntry};

/// Kind of report, which also selects the aggregation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Memory,
    Hitrate,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Memory => "memory",
            ReportType::Hitrate => "hitrate",
        }
    }

    /// Aggregation policy that fills the tree for this report
    pub fn policy(self) -> &'static dyn AggregationPolicy {
        match self {
            ReportType::Memory => &MemoryPolicy,
            ReportType::Hitrate => &HitratePolicy,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projected report rows, already filtered and sorted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "rows", rename_all = "lowercase")]
pub enum Report {
    Memory(Vec<MemoryRow>),
    Hitrate(Vec<HitrateRow>),
}

impl Report {
    /// Project `tree` (aggregated for `report_type`) at `depth`
    ///
    /// **Public** - main entry point for projection
    pub fn project(tree: &PrefixTree, report_type: ReportType, depth: usize, prefix: &str) -> Self {
        match report_type {
            ReportType::Memory => Report::Memory(project_memory(tree, depth, prefix)),
            ReportType::Hitrate => Report::Hitrate(project_hitrate(tree, depth, prefix)),
        }
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            Report::Memory(_) => ReportType::Memory,
            Report::Hitrate(_) => ReportType::Hitrate,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Report::Memory(rows) => rows.len(),
            Report::Hitrate(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Headers and display strings for the table renderer
    pub fn to_table(&self) -> Table {
        match self {
            Report::Memory(rows) => Table::new(
                &MEMORY_HEADERS,
                rows.iter().map(MemoryRow::cells).collect(),
            ),
            Report::Hitrate(rows) => Table::new(
                &HITRATE_HEADERS,
                rows.iter().map(HitrateRow::cells).collect(),
            ),
        }
    }
}

pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

pub(crate) fn format_float(value: f64) -> String {
    format!("{:.2}", value)
}

pub(crate) fn format_optional(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_names() {
        assert_eq!(ReportType::Memory.to_string(), "memory");
        assert_eq!(ReportType::Hitrate.policy().name(), "hitrate");
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(format_optional(None), "n/a");
        assert_eq!(format_optional(Some(0.126)), "0.13");
    }

    #[test]
    fn test_empty_report_table() {
        let report = Report::project(&PrefixTree::new(), ReportType::Memory, 3, "");
        assert!(report.is_empty());

        let table = report.to_table();
        assert_eq!(table.headers.len(), 4);
        assert!(table.rows.is_empty());
    }
}
