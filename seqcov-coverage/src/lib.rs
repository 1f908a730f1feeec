//! # Coverage aggregation for signal tracks.
//!
//! Reads per-base coverage from bigWig or bedGraph files, clips each base to
//! the track's threshold, and pools the result into fixed-width bins for
//! every window of a [`WindowSet`](seqcov_windows::WindowSet). The pooled
//! signal of each track is written to its own matrix file, one row per
//! window, so that record writers can read any window range back.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use seqcov_core::models::read_track_table;
//! use seqcov_coverage::aggregate_track;
//! use seqcov_windows::WindowSet;
//!
//! let tracks = read_track_table("targets.txt").unwrap();
//! let windows = WindowSet::try_from(Path::new("out/sequences.bed")).unwrap();
//! let chrom_sizes = vec![("chr1".to_string(), 248_956_422)];
//!
//! for track in &tracks {
//!     match aggregate_track(track, &windows, 131_072, 128, &chrom_sizes, Path::new("out")) {
//!         Ok(coverage) => println!("{} mean {}", coverage.identifier, coverage.mean),
//!         Err(e) => eprintln!("{} failed: {}", track.identifier, e),
//!     }
//! }
//! ```
pub mod aggregate;
pub mod bigwig;
pub mod errors;
pub mod matrix;
pub mod pool;
pub mod source;

// re-exports
pub use aggregate::{TrackCoverage, aggregate_source, aggregate_track, coverage_path};
pub use errors::TrackReadError;
pub use matrix::{CoverageMatrix, MatrixWriter};
pub use source::{BedGraphSource, CoverageSource, open_source};
