//! # Genome windowing and split assignment.
//!
//! The first two stages of data preparation: the genome is cut into contigs
//! around an unmappable-region mask, each contig is tiled with fixed-length
//! windows, and whole contigs are then assigned to the train, valid or test
//! split.
//!
//! # Example
//!
//! ```no_run
//! use seqcov_core::utils::read_chrom_sizes;
//! use seqcov_windows::{GenomeWindower, SplitParams, UnmappableMask, WindowerParams, assign_splits};
//!
//! let chrom_sizes = read_chrom_sizes("hg38.fa.fai").unwrap();
//! let mask = UnmappableMask::from_bed("umap_k24.bed").unwrap();
//!
//! let windower = GenomeWindower::new(&chrom_sizes, &mask, WindowerParams::default()).unwrap();
//! let (windows, summary) = assign_splits(windower.contigs(), windower.windows(), &SplitParams::default()).unwrap();
//! ```
pub mod bed;
pub mod mask;
pub mod split;
pub mod windower;

// re-exports
pub use bed::WindowSet;
pub use mask::UnmappableMask;
pub use split::{SplitCount, SplitParams, SplitSummary, assign_splits};
pub use windower::{CandidateWindow, GenomeWindower, WindowIter, WindowerParams};
