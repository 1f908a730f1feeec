use std::path::Path;

use serde::{Deserialize, Serialize};

use seqcov_coverage::CoverageMatrix;
use seqcov_windows::WindowSet;

use crate::encode::{Encoding, encode_sequence};
use crate::errors::{SequenceError, ShardError};
use crate::naming::ShardPlan;
use crate::sequence::SequenceSource;
use crate::shard::{ShardHeader, ShardRecord, ShardWriter};

///
/// Record layout options shared by every shard of a run.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordOptions {
    pub encoding: Encoding,
    /// Fail on symbols outside {A,C,G,T,N} instead of mapping them to `N`.
    pub strict: bool,
    pub seq_length: u32,
    pub pool_width: u32,
}

impl RecordOptions {
    pub fn target_length(&self) -> u32 {
        self.seq_length / self.pool_width
    }
}

///
/// A track whose pooled signal contributes one target column.
///
#[derive(Debug, Clone)]
pub struct TargetMatrix {
    pub identifier: String,
    pub matrix: CoverageMatrix,
}

///
/// Write one shard: the windows of `plan.range`, their encoded sequence and
/// the pooled signal of every target.
///
/// # Arguments
/// - path: shard file to create
/// - plan: window range and split of the shard
/// - windows: every window of the run
/// - sequences: genome sequence, owned by this writer
/// - targets: pooled-signal matrices, in target order
/// - options: record layout
///
/// # Returns
/// - number of records written
///
pub fn write_shard<S: SequenceSource + ?Sized>(
    path: &Path,
    plan: &ShardPlan,
    windows: &WindowSet,
    sequences: &mut S,
    targets: &[TargetMatrix],
    options: &RecordOptions,
) -> Result<u64, ShardError> {
    let target_length = options.target_length() as usize;
    let num_targets = targets.len();
    let range = plan.range.clone();

    // one read per track, row-major [window][bin]
    let mut columns = Vec::with_capacity(num_targets);
    for target in targets {
        if target.matrix.cols as usize != target_length {
            return Err(ShardError::Format {
                path: target.matrix.path.display().to_string(),
                reason: format!(
                    "{} bins per window, expected {}",
                    target.matrix.cols, target_length
                ),
            });
        }
        let values = target
            .matrix
            .read_rows(range.clone())
            .map_err(|source| ShardError::Targets {
                identifier: target.identifier.clone(),
                source,
            })?;
        columns.push(values);
    }

    let header = ShardHeader {
        encoding: options.encoding,
        seq_length: options.seq_length,
        target_length: target_length as u32,
        num_targets: num_targets as u32,
        num_records: range.len() as u64,
    };
    let mut writer = ShardWriter::create(path, header)?;

    for (row, window) in windows.windows[range.clone()].iter().enumerate() {
        let sequence = sequences.fetch(&window.chr, window.start, window.end)?;
        if sequence.len() != options.seq_length as usize {
            return Err(SequenceError::OutOfRange {
                chrom: window.chr.clone(),
                start: window.start,
                end: window.end,
                length: sequence.len() as u64,
            }
            .into());
        }

        let mut record_targets = vec![0f32; target_length * num_targets];
        for (t, column) in columns.iter().enumerate() {
            let offset = row * target_length;
            for p in 0..target_length {
                record_targets[p * num_targets + t] = column[offset + p];
            }
        }

        writer.write_record(&ShardRecord {
            chrom: window.chr.clone(),
            start: window.start,
            end: window.end,
            split: window.split,
            sequence: encode_sequence(&sequence, options.encoding, options.strict)?,
            targets: record_targets,
        })?;
    }

    let written = writer.finish()?;
    log::debug!("Wrote {} records to {}", written, path.display());
    Ok(written)
}
