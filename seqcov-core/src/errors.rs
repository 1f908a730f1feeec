use thiserror::Error;

/// Invalid parameters or unusable inputs. Always fatal, raised before any
/// windows, coverage or shards are produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Window length must be greater than zero")]
    ZeroWindowLength,

    #[error("Stride must be greater than zero")]
    ZeroStride,

    #[error("Pool width must be greater than zero")]
    ZeroPoolWidth,

    #[error("Window length {window} is not a multiple of pool width {pool}")]
    IndivisibleWindow { window: u32, pool: u32 },

    #[error("{name} must be within {range}, got {value}")]
    InvalidFraction {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Held-out fractions sum to {0}, nothing is left for training")]
    NoTrainingFraction(f64),

    #[error("Number of processes must be at least 1")]
    ZeroProcesses,

    #[error("Shard size must be at least 1")]
    ZeroShardSize,

    #[error("Unknown summary statistic: {0}")]
    UnknownSumStat(String),

    #[error("Unknown split label: {0}")]
    UnknownSplit(String),

    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Error parsing {path} line {line}: {reason}")]
    ParseError {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Track table is missing the required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Duplicate track identifier: {0}")]
    DuplicateTrack(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
