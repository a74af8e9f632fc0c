use crate::report::ReportType;
use crate::utils::config::{SourceConfig, DEFAULT_DATA_DIR};
use std::path::PathBuf;

/// Where keys and metrics are read from
#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// Live cache store
    Redis(SourceConfig),

    /// JSON keyspace dump
    Dump(PathBuf),
}

impl Default for SourceSpec {
    fn default() -> Self {
        SourceSpec::Redis(SourceConfig::default())
    }
}

/// How report rows are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// ASCII table on stdout
    #[default]
    Table,

    /// Pretty JSON on stdout, or in the `--output` file
    Json,
}

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Report identity, used to name the local snapshot
    pub name: String,

    pub report_type: ReportType,

    /// Levels below the root to render (derived from the prefix if unset)
    pub depth: Option<usize>,

    /// Only keep rows starting with this prefix (a trailing `*` is allowed)
    pub prefix: Option<String>,

    /// Drop the local snapshot and rebuild from the source
    pub regenerate: bool,

    pub source: SourceSpec,

    /// Directory holding snapshots
    pub data_dir: PathBuf,

    /// Use the two-worker fork/join build
    pub parallel: bool,

    pub format: OutputFormat,

    /// JSON output file (stdout if unset)
    pub output: Option<PathBuf>,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            name: String::new(),
            report_type: ReportType::Memory,
            depth: None,
            prefix: None,
            regenerate: false,
            source: SourceSpec::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            parallel: false,
            format: OutputFormat::Table,
            output: None,
        }
    }
}

/// A validated request: concrete depth and a bare prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub depth: usize,

    /// Prefix filter with any trailing `*` removed (empty = no filter)
    pub prefix: String,
}
