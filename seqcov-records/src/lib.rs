//! # Sharded training records.
//!
//! Encodes the genome sequence of every window (one-hot or index encoding)
//! and pairs it with the pooled signal of each target track, writing the
//! records of a contiguous window range into one zlib-compressed shard.
//! Shards are named `<split>-<index>.shard`, can be read back record by
//! record, and are validated by counting their records.
//!
//! Records are always stored forward. The [`augment`] module holds the
//! reverse complement and shift transforms for code that reads shards back.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use seqcov_records::{Encoding, FastaSequence, RecordOptions, plan_shards, shard_path, write_shard};
//! use seqcov_windows::WindowSet;
//!
//! let windows = WindowSet::try_from(Path::new("out/sequences.bed")).unwrap();
//! let mut fasta = FastaSequence::open(Path::new("hg38.fa")).unwrap();
//! let options = RecordOptions {
//!     encoding: Encoding::OneHot,
//!     strict: false,
//!     seq_length: 131_072,
//!     pool_width: 128,
//! };
//!
//! for plan in plan_shards(&windows, 256) {
//!     let path = shard_path(Path::new("out/shards"), plan.split, plan.index);
//!     write_shard(&path, &plan, &windows, &mut fasta, &[], &options).unwrap();
//! }
//! ```
pub mod augment;
pub mod encode;
pub mod errors;
pub mod naming;
pub mod sequence;
pub mod shard;
pub mod writer;

// re-exports
pub use encode::{Encoding, decode_sequence, encode_sequence};
pub use errors::{EncodingError, SequenceError, ShardError};
pub use naming::{ShardPlan, discover_shards, plan_shards, shard_name, shard_path};
pub use sequence::{FastaSequence, InMemoryGenome, SequenceSource};
pub use shard::{ShardHeader, ShardReader, ShardRecord, ShardWriter, count_records};
pub use writer::{RecordOptions, TargetMatrix, write_shard};
