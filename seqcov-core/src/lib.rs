//! # Core models and utilities for seqcov.
//!
//! Shared types used by every stage of the data preparation pipeline: genome
//! [`Contig`](models::Contig)s and [`Window`](models::Window)s, the
//! train/valid/test [`Split`](models::Split) label, signal [`Track`](models::Track)
//! configuration, and the [`ConfigError`](errors::ConfigError) raised before any
//! work is started.
//!
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use errors::ConfigError;
pub use models::{Contig, SPLITS, Split, SumStat, Track, Window};
