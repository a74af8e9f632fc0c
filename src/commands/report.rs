//! Report command implementation.
//!
//! The report command:
//! 1. Validates the request
//! 2. Loads the tree snapshot, or
//! 3. Lists keys, builds the tree and aggregates it, then saves a snapshot
//! 4. Projects rows at the requested depth and prefix
//! 5. Writes the table or JSON output

use super::models::{OutputFormat, ReportArgs, ReportRequest, SourceSpec};
use crate::aggregator::{aggregate, AggregationSummary};
use crate::output::{render_table, report_to_string, write_report, SnapshotStore};
use crate::report::{Report, ReportType};
use crate::source::{KeySource, MemoryKeySource, RedisKeySource, RetryingSource};
use crate::tree::{build, build_parallel, PrefixTree};
use crate::utils::config::{DEFAULT_DEPTH, NAMESPACE_SEPARATOR};
use crate::utils::error::{RequestError, SourceError};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The projected report, after it has been written out
///
/// # Errors
/// * Invalid request (before any tree work starts)
/// * Key source unavailable when no usable snapshot exists
/// * Output write errors
pub fn execute_report(args: ReportArgs) -> Result<Report> {
    let start_time = Instant::now();

    // Step 1: Validate
    let request = validate_args(&args)?;
    info!(
        "Running {} report '{}' at depth {}",
        args.report_type, args.name, request.depth
    );

    // Step 2/3: Snapshot or full build
    let tree = load_or_build(&args)?;

    // Step 4: Project
    info!("Projecting rows...");
    let report = Report::project(&tree, args.report_type, request.depth, &request.prefix);
    debug!("Projected {} rows", report.len());

    // Step 5: Output
    emit_report(&report, &args)?;

    info!(
        "Report completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Validate report arguments
///
/// **Public** - can be called before execute_report for early validation
///
/// # Returns
/// The concrete depth and bare prefix to project with
pub fn validate_args(args: &ReportArgs) -> Result<ReportRequest, RequestError> {
    validate_name(&args.name)?;

    let prefix = match args.prefix.as_deref() {
        Some(raw) => normalize_prefix(raw)?,
        None => String::new(),
    };

    let depth = match args.depth {
        Some(0) => return Err(RequestError::InvalidDepth),
        Some(depth) => depth,
        // One level per prefix segment; a trailing separator counts as one.
        None if !prefix.is_empty() => prefix.split(NAMESPACE_SEPARATOR).count(),
        None => DEFAULT_DEPTH,
    };

    Ok(ReportRequest { depth, prefix })
}

/// Check that a report name can be used as a snapshot file stem
pub fn validate_name(name: &str) -> Result<(), RequestError> {
    if name.trim().is_empty() {
        return Err(RequestError::MissingName);
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(RequestError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Strip a trailing wildcard; a wildcard anywhere else is rejected
fn normalize_prefix(raw: &str) -> Result<String, RequestError> {
    let bare = raw.strip_suffix('*').unwrap_or(raw);
    if bare.contains('*') {
        return Err(RequestError::MalformedPrefix(raw.to_string()));
    }
    Ok(bare.to_string())
}

/// Reuse the stored snapshot, or build and aggregate from the source
///
/// **Public** - shared by the report and tree commands
///
/// An unreadable snapshot is logged and replaced by a full rebuild.
/// A failure to save the new snapshot is logged and otherwise ignored.
pub fn load_or_build(args: &ReportArgs) -> Result<PrefixTree> {
    let store = SnapshotStore::new(&args.data_dir);

    if args.regenerate {
        if let Err(e) = store.invalidate(&args.name, args.report_type) {
            warn!("Could not remove snapshot: {}", e);
        }
    } else {
        match store.load(&args.name, args.report_type) {
            Ok(Some(tree)) => return Ok(tree),
            Ok(None) => info!("No snapshot found, building report tree"),
            Err(e) => warn!("Snapshot unreadable ({}), rebuilding from source", e),
        }
    }

    let mut source = open_source(&args.source).context("Failed to open key source")?;
    let (tree, key_count, summary) =
        build_and_aggregate(&mut source, args.report_type, args.parallel)
            .context("Failed to list keys from key source")?;

    info!(
        "Aggregated {} keys ({} lookups failed)",
        key_count, summary.failed_leaves
    );

    if let Err(e) = store.save(&args.name, args.report_type, &tree, key_count) {
        warn!("Failed to save snapshot: {}", e);
    }

    Ok(tree)
}

/// Full pipeline against a source: list, build, aggregate
///
/// **Public** - usable with any `KeySource`
///
/// # Errors
/// * `SourceError::Unavailable` - the keyspace cannot be enumerated
pub fn build_and_aggregate(
    source: &mut dyn KeySource,
    report_type: ReportType,
    parallel: bool,
) -> Result<(PrefixTree, usize, AggregationSummary), SourceError> {
    info!("Step 1/3: Fetching key list...");
    let keys = source.list_keys()?;

    info!("Step 2/3: Building prefix tree from {} keys...", keys.len());
    let mut tree = if parallel {
        build_parallel(&keys)
    } else {
        build(&keys)
    };

    info!("Step 3/3: Populating the report...");
    let summary = aggregate(&mut tree, source, report_type.policy());

    Ok((tree, keys.len(), summary))
}

/// Open the configured source behind bounded retries
fn open_source(spec: &SourceSpec) -> Result<RetryingSource<Box<dyn KeySource>>, SourceError> {
    match spec {
        SourceSpec::Redis(config) => {
            let inner: Box<dyn KeySource> = Box::new(RedisKeySource::connect(config)?);
            Ok(RetryingSource::from_config(inner, config))
        }
        SourceSpec::Dump(path) => {
            let inner: Box<dyn KeySource> = Box::new(MemoryKeySource::from_json_file(path)?);
            Ok(RetryingSource::new(inner, 0, Duration::ZERO))
        }
    }
}

/// Print or write the projected report
fn emit_report(report: &Report, args: &ReportArgs) -> Result<()> {
    match (args.format, &args.output) {
        (OutputFormat::Table, _) => {
            if args.output.is_some() {
                warn!("--output is only used with --format json");
            }
            print!("{}", render_table(&report.to_table()));
        }
        (OutputFormat::Json, Some(path)) => {
            write_report(report, path).context("Failed to write report JSON")?;
            info!("✓ Report written to: {}", path.display());
        }
        (OutputFormat::Json, None) => {
            println!("{}", report_to_string(report)?);
        }
    }
    Ok(())
}
