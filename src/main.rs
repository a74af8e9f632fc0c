//! Keyspace Report CLI
//!
//! Memory and hit-rate rollup reports for colon-namespaced cache keyspaces.
//! Renders a namespace tree at a chosen depth, optionally filtered by prefix.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::time::Duration;

use keyspace_report::commands::{
    display_version, execute_report, invalidate_snapshot, print_tree, OutputFormat, ReportArgs,
    SourceSpec,
};
use keyspace_report::report::ReportType;
use keyspace_report::utils::config::{
    SourceConfig, DEFAULT_DATA_DIR, DEFAULT_MAX_RETRIES, DEFAULT_QUERY_TIMEOUT, DEFAULT_REDIS_URL,
};

/// Keyspace Report - memory and hit rate rollups for cache keyspaces
#[derive(Parser, Debug)]
#[command(name = "keyspace-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Report identity and data source, shared by report and tree
#[derive(Args, Debug)]
struct TreeOpts {
    /// Name of this report; the built tree is stored locally under it
    #[arg(short, long)]
    name: String,

    /// Type of report
    #[arg(short = 't', long = "type", value_enum)]
    report_type: ReportType,

    /// Cache store URL
    #[arg(long, env = "KEYSPACE_REPORT_REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    url: String,

    /// Read keys from a JSON keyspace dump instead of the cache store (takes precedence over --url)
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Directory for local tree snapshots
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Discard the local snapshot and rebuild the tree
    #[arg(long)]
    regenerate: bool,

    /// Build the tree on two worker threads
    #[arg(long)]
    parallel: bool,

    /// Per-query timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    /// Retries for a failed query
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    retries: u32,
}

impl TreeOpts {
    fn into_report_args(self) -> ReportArgs {
        let source = match self.dump {
            Some(path) => SourceSpec::Dump(path),
            None => SourceSpec::Redis(
                SourceConfig::new(self.url)
                    .with_timeout(Duration::from_millis(self.timeout_ms))
                    .with_retries(self.retries),
            ),
        };

        ReportArgs {
            name: self.name,
            report_type: self.report_type,
            regenerate: self.regenerate,
            source,
            data_dir: self.data_dir,
            parallel: self.parallel,
            ..Default::default()
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build (or reload) a report tree and render it
    Report {
        #[command(flatten)]
        tree: TreeOpts,

        /// How many levels below the root to render
        #[arg(short, long)]
        depth: Option<usize>,

        /// Only show rows starting with this prefix (e.g. "cache:page:*")
        #[arg(short, long)]
        prefix: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file for JSON format
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the structure of a report tree
    Tree {
        #[command(flatten)]
        tree: TreeOpts,

        /// How many levels below the root to print
        #[arg(short, long, default_value = "3")]
        depth: usize,
    },

    /// Remove the local snapshot of a report
    Invalidate {
        /// Name of the report
        #[arg(short, long)]
        name: String,

        /// Type of report
        #[arg(short = 't', long = "type", value_enum)]
        report_type: ReportType,

        /// Directory for local tree snapshots
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            tree,
            depth,
            prefix,
            format,
            output,
        } => {
            let args = ReportArgs {
                depth,
                prefix,
                format,
                output,
                ..tree.into_report_args()
            };

            execute_report(args)?;
        }

        Commands::Tree { tree, depth } => {
            print_tree(&tree.into_report_args(), depth)?;
        }

        Commands::Invalidate {
            name,
            report_type,
            data_dir,
        } => {
            invalidate_snapshot(&name, report_type, &data_dir)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_source_defaults_follow_config() {
        let cli = Cli::try_parse_from(["keyspace-report", "report", "-n", "client", "-t", "memory"])
            .unwrap();

        let Commands::Report { tree, .. } = cli.command else {
            panic!("expected the report command");
        };
        assert_eq!(tree.timeout_ms, DEFAULT_QUERY_TIMEOUT.as_millis() as u64);
        assert_eq!(tree.retries, DEFAULT_MAX_RETRIES);

        match tree.into_report_args().source {
            SourceSpec::Redis(config) => assert_eq!(config.timeout, DEFAULT_QUERY_TIMEOUT),
            other => panic!("unexpected source {:?}", other),
        }
    }
}
