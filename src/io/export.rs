//! JSON artifacts: the scored collection and its statistics summary.
//!
//! Both files are written to a temporary file in the destination directory and
//! renamed into place once complete, so readers never observe a partial file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::app::pipeline::RunCounters;
use crate::domain::{ScoredObject, TierThresholds};
use crate::error::EngineError;
use crate::stats::BatchStats;

pub const TOOL_NAME: &str = "starrank";

/// The scored collection as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCollection {
    pub tool: String,
    pub objects: Vec<ScoredObject>,
}

impl ScoredCollection {
    pub fn new(objects: Vec<ScoredObject>) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            objects,
        }
    }
}

/// The statistics summary as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDocument {
    pub tool: String,
    /// Absent when the summary was computed from an existing collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counters: Option<RunCounters>,
    pub thresholds: TierThresholds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_thresholds: Option<TierThresholds>,
    pub stats: BatchStats,
}

/// Write the scored collection (compact JSON).
pub fn write_collection(path: &Path, collection: &ScoredCollection) -> Result<(), EngineError> {
    write_json_atomic(path, collection, false)?;
    info!(path = %path.display(), objects = collection.objects.len(), "wrote scored collection");
    Ok(())
}

/// Read a collection produced by `write_collection`.
pub fn read_collection(path: &Path) -> Result<ScoredCollection, EngineError> {
    let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
    let collection: ScoredCollection = serde_json::from_reader(BufReader::new(file))?;
    Ok(collection)
}

/// Write the collection (compact) and its summary (pretty) together.
///
/// Both files are fully written before either is renamed into place, so a
/// failing summary path leaves an existing collection untouched.
pub fn write_run_artifacts(
    collection_path: &Path,
    collection: &ScoredCollection,
    stats_path: &Path,
    doc: &StatsDocument,
) -> Result<(), EngineError> {
    let staged_collection = stage_json(collection_path, collection, false)?;
    let staged_stats = stage_json(stats_path, doc, true)?;
    staged_collection.commit()?;
    staged_stats.commit()?;
    info!(
        collection = %collection_path.display(),
        stats = %stats_path.display(),
        objects = collection.objects.len(),
        "wrote run artifacts"
    );
    Ok(())
}

/// `scored.json` -> `scored.stats.json`; `out` -> `out.stats.json`.
pub fn default_stats_path(output: &Path) -> PathBuf {
    output.with_extension("stats.json")
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), EngineError> {
    stage_json(path, value, pretty)?.commit()
}

/// A complete temporary file waiting to be renamed onto its target.
struct StagedFile {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    fn commit(self) -> Result<(), EngineError> {
        let path = self.path;
        self.tmp.persist(&path).map_err(|e| EngineError::io(&path, e.error))?;
        Ok(())
    }
}

fn stage_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<StagedFile, EngineError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).map_err(|e| EngineError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        if pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.write_all(b"\n").map_err(|e| EngineError::io(path, e))?;
        writer.flush().map_err(|e| EngineError::io(path, e))?;
    }
    Ok(StagedFile {
        tmp,
        path: path.to_path_buf(),
    })
}
