use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use seqcov_core::consts::{REPORT_FILE, SHARD_DIR, SHARD_EXT, STATISTICS_FILE, WINDOWS_FILE};
use seqcov_core::errors::ConfigError;
use seqcov_core::models::{Split, Track, read_track_table};
use seqcov_core::utils::read_chrom_sizes;
use seqcov_coverage::{CoverageMatrix, TrackCoverage, TrackReadError, aggregate_track};
use seqcov_records::{
    FastaSequence, SequenceError, SequenceSource, ShardError, TargetMatrix, plan_shards,
    write_shard,
};
use seqcov_windows::{GenomeWindower, SplitSummary, UnmappableMask, WindowSet, assign_splits};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::report::{
    RunReport, Statistics, Status, TrackReport, check_shards, split_sizes, write_json,
};
use crate::state::State;

fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let template = format!(
        "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {} ({{eta}})",
        unit
    );
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}

///
/// Run `attempt`, and run it once more when it fails with a retryable error.
///
pub fn with_retry<T, F>(name: &str, mut attempt: F) -> Result<T, ShardError>
where
    F: FnMut() -> Result<T, ShardError>,
{
    match attempt() {
        Err(e) if e.is_retryable() => {
            log::warn!("{} failed ({}), retrying once", name, e);
            attempt()
        }
        result => result,
    }
}

///
/// Resolve a track file that is relative and not found from the working
/// directory against the directory of the track table.
///
fn resolve_track_files(tracks: &mut [Track], table: &Path) {
    let base = table.parent().unwrap_or(Path::new("."));
    for track in tracks.iter_mut() {
        if track.file.is_relative() && !track.file.exists() {
            track.file = base.join(&track.file);
        }
    }
}

///
/// Window the genome and assign splits.
///
/// # Arguments
/// - config: run configuration
/// - chrom_sizes: ordered chromosome lengths
///
pub fn make_windows(
    config: &PipelineConfig,
    chrom_sizes: &[(String, u32)],
) -> Result<(WindowSet, SplitSummary), ConfigError> {
    let mask = load_mask(config)?;
    let windower = GenomeWindower::new(chrom_sizes, &mask, config.windows.clone())?;
    assign_splits(windower.contigs(), windower.windows(), &config.split)
}

fn load_mask(config: &PipelineConfig) -> Result<UnmappableMask, ConfigError> {
    match &config.mask {
        Some(path) => UnmappableMask::from_bed(path),
        None => Ok(UnmappableMask::empty()),
    }
}

///
/// Delete every `<split>-<index>.shard` file in `dir`.
///
fn remove_stale_shards(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_shard = name
            .strip_suffix(&format!(".{}", SHARD_EXT))
            .and_then(|stem| stem.rsplit_once('-'))
            .is_some_and(|(split, index)| {
                split.parse::<Split>().is_ok() && index.parse::<usize>().is_ok()
            });
        if is_shard && path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

///
/// Orchestrates one data preparation run:
/// `Configured → Windowed → Split → Aggregated → Written → Done`.
///
pub struct Pipeline {
    config: PipelineConfig,
    state: State,
}

impl Pipeline {
    /// Validate the configuration. Nothing is read or written yet.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Pipeline {
            config,
            state: State::Configured,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            log::debug!("{} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn output_path(&self, name: &str) -> PathBuf {
        self.config.out_dir.join(name)
    }

    ///
    /// Run every stage, reading sequence from the configured FASTA. The FASTA
    /// index is loaded once and shared by every shard worker.
    ///
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        let fasta = self.config.fasta.clone();
        let index = FastaSequence::load_index(&fasta)?;
        self.run_with(|| FastaSequence::with_index(&fasta, index.clone()))
    }

    ///
    /// Run every stage with a custom genome. Every shard worker opens its own
    /// sequence source through `open_sequences`.
    ///
    /// Inputs are read and the windows are laid out before anything is
    /// written to the output directory.
    ///
    pub fn run_with<S, F>(&mut self, open_sequences: F) -> Result<RunReport, PipelineError>
    where
        S: SequenceSource,
        F: Fn() -> Result<S, SequenceError> + Sync,
    {
        let config = self.config.clone();
        let out_dir = &config.out_dir;

        let chrom_sizes = match &config.chrom_sizes {
            Some(path) => read_chrom_sizes(path)?,
            None => open_sequences()?.chrom_sizes(),
        };

        let mut tracks = read_track_table(&config.targets)?;
        resolve_track_files(&mut tracks, &config.targets);

        //
        // WINDOWS AND SPLITS
        //
        let mask = load_mask(&config)?;
        let windower = GenomeWindower::new(&chrom_sizes, &mask, config.windows.clone())?;
        self.advance();

        let (windows, summary) = assign_splits(windower.contigs(), windower.windows(), &config.split)?;
        summary.log();

        std::fs::create_dir_all(out_dir).map_err(|source| PipelineError::Output {
            path: out_dir.display().to_string(),
            source,
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.processes)
            .build()?;

        let windows_path = self.output_path(WINDOWS_FILE);
        windows
            .write_bed(&windows_path)
            .map_err(|source| PipelineError::Output {
                path: windows_path.display().to_string(),
                source,
            })?;
        self.advance();

        //
        // COVERAGE
        //
        log::info!(
            "Aggregating {} tracks over {} windows",
            tracks.len(),
            windows.len()
        );
        let bar = progress_bar(tracks.len(), "tracks");
        let coverage: Vec<Result<TrackCoverage, TrackReadError>> = pool.install(|| {
            tracks
                .par_iter()
                .map(|track| {
                    let result = aggregate_track(
                        track,
                        &windows,
                        config.windows.window_length,
                        config.windows.pool_width,
                        &chrom_sizes,
                        out_dir,
                    );
                    bar.inc(1);
                    result
                })
                .collect()
        });
        bar.finish_and_clear();

        let mut track_reports = Vec::with_capacity(tracks.len());
        let mut targets = Vec::new();
        for (track, result) in tracks.iter().zip(coverage) {
            let opened = result.and_then(|c| {
                let matrix = CoverageMatrix::open(&c.path)?;
                Ok((c, matrix))
            });

            match opened {
                Ok((c, matrix)) => {
                    targets.push(TargetMatrix {
                        identifier: track.identifier.clone(),
                        matrix,
                    });
                    track_reports.push(TrackReport {
                        identifier: track.identifier.clone(),
                        file: track.file.clone(),
                        status: Status::Done,
                        error: None,
                        mean: Some(c.mean),
                    });
                }
                Err(e) => {
                    log::warn!("Track {} failed: {}", track.identifier, e);
                    track_reports.push(TrackReport {
                        identifier: track.identifier.clone(),
                        file: track.file.clone(),
                        status: Status::Failed,
                        error: Some(e.to_string()),
                        mean: None,
                    });
                }
            }
        }
        self.advance();

        //
        // SHARDS
        //
        let shard_dir = out_dir.join(SHARD_DIR);
        std::fs::create_dir_all(&shard_dir).map_err(|source| PipelineError::Output {
            path: shard_dir.display().to_string(),
            source,
        })?;
        let removed = remove_stale_shards(&shard_dir).map_err(|source| PipelineError::Output {
            path: shard_dir.display().to_string(),
            source,
        })?;
        if removed > 0 {
            log::info!("Removed {} shards of an earlier run", removed);
        }

        let plans = plan_shards(&windows, config.shard_size);
        let options = config.record_options();
        log::info!(
            "Writing {} shards with {} targets",
            plans.len(),
            targets.len()
        );

        let bar = progress_bar(plans.len(), "shards");
        let outcomes: Vec<(String, Result<u64, ShardError>)> = pool.install(|| {
            plans
                .par_iter()
                .map(|plan| {
                    let name = plan.name();
                    let path = shard_dir.join(&name);
                    let result = with_retry(&name, || {
                        let mut sequences = open_sequences()?;
                        write_shard(&path, plan, &windows, &mut sequences, &targets, &options)
                    });
                    bar.inc(1);
                    (name, result)
                })
                .collect()
        });
        bar.finish_and_clear();
        self.advance();

        //
        // COMPLETION CHECK
        //
        let write_errors: HashMap<String, String> = outcomes
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|e| (name, e.to_string())))
            .collect();
        let shard_reports = check_shards(&shard_dir, &plans, &write_errors);

        let [train_seqs, valid_seqs, test_seqs] = split_sizes(&summary);
        let statistics = Statistics {
            seq_length: options.seq_length,
            seq_depth: options.encoding.depth(),
            encoding: options.encoding,
            pool_width: options.pool_width,
            target_length: options.target_length(),
            num_targets: targets.len(),
            targets: targets.iter().map(|t| t.identifier.clone()).collect(),
            train_seqs,
            valid_seqs,
            test_seqs,
        };
        write_json(&self.output_path(STATISTICS_FILE), &statistics)?;
        self.advance();

        let report = RunReport {
            state: self.state,
            splits: summary,
            tracks: track_reports,
            shards: shard_reports,
        };
        write_json(&self.output_path(REPORT_FILE), &report)?;
        report.log();

        Ok(report)
    }
}
