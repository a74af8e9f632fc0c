use super::models::ReportArgs;
use super::report::{load_or_build, validate_name};
use crate::output::SnapshotStore;
use crate::report::ReportType;
use crate::tree::render_tree;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Print the structure of a report tree
///
/// Uses the same snapshot-or-build path as the report command.
pub fn print_tree(args: &ReportArgs, max_depth: usize) -> Result<()> {
    validate_name(&args.name)?;

    let tree = load_or_build(args)?;
    print!("{}", render_tree(&tree, max_depth));

    Ok(())
}

/// Remove the local snapshot for a report
pub fn invalidate_snapshot(name: &str, report_type: ReportType, data_dir: &Path) -> Result<()> {
    validate_name(name)?;

    let store = SnapshotStore::new(data_dir);
    let removed = store
        .invalidate(name, report_type)
        .context("Failed to remove snapshot")?;

    if removed {
        println!("✓ Removed {} snapshot for '{}'", report_type, name);
    } else {
        println!("No local snapshot for '{}' ({})", name, report_type);
    }
    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Keyspace Report v{}", env!("CARGO_PKG_VERSION"));
    println!("Snapshot Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Memory and hit rate rollups for colon-namespaced cache keyspaces.");
}
