use thiserror::Error;

/// Failure to read coverage from one track. Isolated to that track, other
/// tracks keep going.
#[derive(Error, Debug)]
pub enum TrackReadError {
    #[error("Can't open track file {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Chromosome {0} is absent from the track")]
    MissingChrom(String),

    #[error("{chrom}:{start}-{end} lies beyond the chromosome length ({length})")]
    OutOfRange {
        chrom: String,
        start: u32,
        end: u32,
        length: u32,
    },

    #[error("Malformed line {line} in {path}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Overlapping runs on {chrom}: {start} starts before the previous run ends at {previous_end}")]
    OverlappingRuns {
        chrom: String,
        start: u32,
        previous_end: u32,
    },

    #[error("Error reading track values: {0}")]
    Read(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
