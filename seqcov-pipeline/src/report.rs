use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use seqcov_core::models::{SPLITS, Split};
use seqcov_records::{Encoding, ShardPlan, count_records};
use seqcov_windows::SplitSummary;

use crate::errors::PipelineError;
use crate::state::State;

/// Outcome of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Done,
    Failed,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    pub identifier: String,
    pub file: PathBuf,
    pub status: Status,
    pub error: Option<String>,
    /// Mean pooled value over all windows.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardReport {
    pub name: String,
    pub split: Split,
    pub expected_records: u64,
    pub found_records: Option<u64>,
    pub status: Status,
    pub error: Option<String>,
}

///
/// Final account of a run: split sizes plus the status of every track and
/// shard.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub state: State,
    pub splits: SplitSummary,
    pub tracks: Vec<TrackReport>,
    pub shards: Vec<ShardReport>,
}

impl RunReport {
    /// Whether every track and every shard is done.
    pub fn is_complete(&self) -> bool {
        self.tracks.iter().all(|t| t.status == Status::Done)
            && self.shards.iter().all(|s| s.status == Status::Done)
    }

    pub fn count_shards(&self, status: Status) -> usize {
        self.shards.iter().filter(|s| s.status == status).count()
    }

    pub fn count_tracks(&self, status: Status) -> usize {
        self.tracks.iter().filter(|t| t.status == status).count()
    }

    /// Log a one-line summary plus one line per failure.
    pub fn log(&self) {
        for track in self.tracks.iter().filter(|t| t.status != Status::Done) {
            log::warn!(
                "track {} {:?}: {}",
                track.identifier,
                track.status,
                track.error.as_deref().unwrap_or("")
            );
        }
        for shard in self.shards.iter().filter(|s| s.status != Status::Done) {
            log::warn!(
                "shard {} {:?}: {}",
                shard.name,
                shard.status,
                shard.error.as_deref().unwrap_or("")
            );
        }
        log::info!(
            "tracks: {} done, {} failed; shards: {} done, {} failed, {} missing",
            self.count_tracks(Status::Done),
            self.count_tracks(Status::Failed),
            self.count_shards(Status::Done),
            self.count_shards(Status::Failed),
            self.count_shards(Status::Missing)
        );
    }
}

///
/// Dataset description read by training code.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub seq_length: u32,
    pub seq_depth: usize,
    pub encoding: Encoding,
    pub pool_width: u32,
    pub target_length: u32,
    pub num_targets: usize,
    /// Identifiers of the included targets, in record order.
    pub targets: Vec<String>,
    pub train_seqs: usize,
    pub valid_seqs: usize,
    pub test_seqs: usize,
}

///
/// Pretty-print a value as JSON.
///
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let output_error = |source| PipelineError::Output {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| output_error(e.into()))?;
    writer.write_all(b"\n").map_err(output_error)?;
    writer.flush().map_err(output_error)
}

///
/// Verify every planned shard after all writers have joined.
///
/// A shard is DONE when its file holds exactly the planned number of
/// records. It is FAILED when its writer reported an error or the file is
/// truncated or corrupt, and MISSING when no file exists.
///
/// # Arguments
/// - dir: shard directory
/// - plans: every planned shard
/// - write_errors: writer errors keyed by shard name
///
pub fn check_shards(
    dir: &Path,
    plans: &[ShardPlan],
    write_errors: &HashMap<String, String>,
) -> Vec<ShardReport> {
    plans
        .iter()
        .map(|plan| {
            let name = plan.name();
            let path = dir.join(&name);
            let expected = plan.len() as u64;

            let (status, found, error) = match write_errors.get(&name) {
                Some(e) => (Status::Failed, None, Some(e.clone())),
                None if !path.is_file() => (Status::Missing, None, None),
                None => match count_records(&path) {
                    Ok(n) if n == expected => (Status::Done, Some(n), None),
                    Ok(n) => (
                        Status::Failed,
                        Some(n),
                        Some(format!("expected {} records, found {}", expected, n)),
                    ),
                    Err(e) => (Status::Failed, None, Some(e.to_string())),
                },
            };

            ShardReport {
                name,
                split: plan.split,
                expected_records: expected,
                found_records: found,
                status,
                error,
            }
        })
        .collect()
}

/// Windows per split, in [SPLITS] order.
pub fn split_sizes(summary: &SplitSummary) -> [usize; 3] {
    let mut sizes = [0; 3];
    for split in SPLITS {
        sizes[split.index()] = summary.get(split).windows;
    }
    sizes
}
