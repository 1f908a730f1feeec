use thiserror::Error;

use seqcov_core::errors::ConfigError;
use seqcov_records::SequenceError;

/// Failures that stop a run. Per-track and per-shard failures are not among
/// them; they end up in the run report.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Can't parse config file {path}: {reason}")]
    ConfigFile { path: String, reason: String },

    #[error("Can't open the genome: {0}")]
    Genome(#[from] SequenceError),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
