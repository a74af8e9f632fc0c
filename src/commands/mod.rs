//! CLI command implementations.
//!
//! Commands orchestrate the library components (source, tree, aggregator,
//! report, output) to perform user tasks.

pub mod models;
pub mod report;
pub mod utils;

// Re-export main command functions
pub use models::{OutputFormat, ReportArgs, ReportRequest, SourceSpec};
pub use report::{build_and_aggregate, execute_report, load_or_build, validate_args};
pub use utils::{display_version, invalidate_snapshot, print_tree};
