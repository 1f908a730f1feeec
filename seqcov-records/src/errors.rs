use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("Invalid nucleotide '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("Invalid encoded value at position {position}")]
    InvalidCode { position: usize },

    #[error("Encoded length {length} is not a multiple of depth {depth}")]
    InvalidLength { length: usize, depth: usize },
}

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Can't open FASTA {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Chromosome {0} is absent from the genome")]
    MissingChrom(String),

    #[error("{chrom}:{start}-{end} lies beyond the chromosome length ({length})")]
    OutOfRange {
        chrom: String,
        start: u32,
        end: u32,
        length: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ShardError {
    #[error("Failed to write shard {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read shard {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid shard {path}: {reason}")]
    Format { path: String, reason: String },

    #[error("Can't read targets of {identifier}: {source}")]
    Targets {
        identifier: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl ShardError {
    /// Only I/O failures while writing are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShardError::Write { .. })
    }
}
