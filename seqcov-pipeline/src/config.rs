use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seqcov_core::consts::DEFAULT_SHARD_SIZE;
use seqcov_core::errors::ConfigError;
use seqcov_records::{Encoding, RecordOptions};
use seqcov_windows::{SplitParams, WindowerParams};

use crate::errors::PipelineError;

///
/// Everything a run needs, threaded explicitly through every stage.
///
/// Can be loaded from TOML:
///
/// ```toml
/// fasta = "hg38.fa"
/// targets = "targets.txt"
/// out_dir = "data"
/// mask = "umap_k24.bed"
/// processes = 8
///
/// [windows]
/// window_length = 131072
/// pool_width = 128
/// sample_fraction = 0.5
///
/// [split]
/// valid_fraction = 0.1
/// test_fraction = 0.1
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub fasta: PathBuf,
    /// Track table.
    pub targets: PathBuf,
    pub out_dir: PathBuf,
    /// Unmappable regions (BED).
    pub mask: Option<PathBuf>,
    /// Chromosome lengths; taken from the FASTA index when absent.
    pub chrom_sizes: Option<PathBuf>,
    pub windows: WindowerParams,
    pub split: SplitParams,
    pub encoding: Encoding,
    pub strict: bool,
    /// Windows per shard.
    pub shard_size: usize,
    /// Worker threads for aggregation and writing.
    pub processes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            fasta: PathBuf::new(),
            targets: PathBuf::new(),
            out_dir: PathBuf::from("."),
            mask: None,
            chrom_sizes: None,
            windows: WindowerParams::default(),
            split: SplitParams::default(),
            encoding: Encoding::default(),
            strict: false,
            shard_size: DEFAULT_SHARD_SIZE,
            processes: 1,
        }
    }
}

impl PipelineConfig {
    ///
    /// Read a config from a TOML file. Missing fields take their defaults.
    ///
    pub fn from_toml(path: &Path) -> Result<Self, PipelineError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileReadError(display.clone()))?;

        toml::from_str(&contents).map_err(|e| PipelineError::ConfigFile {
            path: display,
            reason: e.to_string(),
        })
    }

    ///
    /// Check every parameter. Runs before any file is read or written.
    ///
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows.validate()?;
        self.split.validate()?;

        if self.processes == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        if self.shard_size == 0 {
            return Err(ConfigError::ZeroShardSize);
        }
        if self.fasta.as_os_str().is_empty() {
            return Err(ConfigError::FileReadError("no FASTA given".to_string()));
        }
        if self.targets.as_os_str().is_empty() {
            return Err(ConfigError::FileReadError("no track table given".to_string()));
        }
        Ok(())
    }

    pub fn record_options(&self) -> RecordOptions {
        RecordOptions {
            encoding: self.encoding,
            strict: self.strict,
            seq_length: self.windows.window_length,
            pool_width: self.windows.pool_width,
        }
    }
}
