//! On-disk snapshots of aggregated trees.
//!
//! Building and aggregating a large keyspace is slow, so the finished tree
//! is saved per report name and type and reloaded on later runs:
//!
//! ```text
//! <data_dir>/<name>.<type>.json
//! ```

use crate::report::ReportType;
use crate::tree::{Node, PrefixTree};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::SnapshotError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Snapshot file contents
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    /// Schema version for compatibility checking
    pub version: String,

    pub name: String,

    pub report_type: ReportType,

    pub generated_at: DateTime<Utc>,

    /// Number of keys the tree was built from
    pub key_count: usize,

    /// Node arena, root first
    pub nodes: Vec<Node>,
}

/// Borrowing twin of `Snapshot`, so saving does not clone the arena
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: &'a str,
    name: &'a str,
    report_type: ReportType,
    generated_at: DateTime<Utc>,
    key_count: usize,
    nodes: &'a [Node],
}

/// Directory of snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot file for a report identity
    pub fn path_for(&self, name: &str, report_type: ReportType) -> PathBuf {
        self.dir.join(format!("{}.{}.json", name, report_type))
    }

    /// Persist an aggregated tree
    ///
    /// The file is written next to its final path and renamed into place,
    /// so a crash never leaves a half-written snapshot behind.
    pub fn save(
        &self,
        name: &str,
        report_type: ReportType,
        tree: &PrefixTree,
        key_count: usize,
    ) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(name, report_type);
        let tmp_path = path.with_extension("json.tmp");

        let snapshot = SnapshotRef {
            version: SCHEMA_VERSION,
            name,
            report_type,
            generated_at: Utc::now(),
            key_count,
            nodes: tree.nodes(),
        };

        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &path)?;

        info!(
            "Saved {} snapshot with {} nodes to {}",
            report_type,
            tree.node_count(),
            path.display()
        );
        Ok(path)
    }

    /// Load a previously saved tree
    ///
    /// Returns `Ok(None)` when no snapshot exists for this identity.
    ///
    /// # Errors
    /// * `SnapshotError::Io` / `Serialization` - unreadable file
    /// * `SnapshotError::Incompatible` - other schema version or report type
    /// * `SnapshotError::Corrupt` - the stored arena is not a valid tree
    pub fn load(
        &self,
        name: &str,
        report_type: ReportType,
    ) -> Result<Option<PrefixTree>, SnapshotError> {
        let path = self.path_for(name, report_type);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;

        if snapshot.version != SCHEMA_VERSION {
            return Err(SnapshotError::Incompatible(format!(
                "schema version {} (expected {})",
                snapshot.version, SCHEMA_VERSION
            )));
        }
        if snapshot.report_type != report_type {
            return Err(SnapshotError::Incompatible(format!(
                "snapshot holds a {} report, {} requested",
                snapshot.report_type, report_type
            )));
        }

        let tree = PrefixTree::from_nodes(snapshot.nodes)?;

        info!(
            "Loaded {} snapshot '{}' ({} keys, generated {})",
            report_type,
            snapshot.name,
            snapshot.key_count,
            snapshot.generated_at.to_rfc3339()
        );
        Ok(Some(tree))
    }

    /// Delete the snapshot for a report identity
    ///
    /// Returns whether a snapshot existed.
    pub fn invalidate(&self, name: &str, report_type: ReportType) -> Result<bool, SnapshotError> {
        let path = self.path_for(name, report_type);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed snapshot {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No local snapshot found at {}", path.display());
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
