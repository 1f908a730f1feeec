//! # Data preparation runs.
//!
//! Ties the other crates together: windows the genome, assigns splits,
//! aggregates every track on a worker pool, writes shards in parallel and
//! checks that every planned shard is complete. A run leaves behind
//! `sequences.bed`, `coverage/`, `shards/`, `statistics.json` and
//! `report.json` in its output directory.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use seqcov_pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_toml(Path::new("seqcov.toml")).unwrap();
//! let mut pipeline = Pipeline::new(config).unwrap();
//! let report = pipeline.run().unwrap();
//!
//! assert!(report.is_complete());
//! ```
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod report;
pub mod state;

// re-exports
pub use config::PipelineConfig;
pub use errors::PipelineError;
pub use pipeline::{Pipeline, make_windows, with_retry};
pub use report::{RunReport, ShardReport, Statistics, Status, TrackReport};
pub use state::State;
