pub const DEFAULT_SEQ_LENGTH: u32 = 131_072;
pub const DEFAULT_POOL_WIDTH: u32 = 128;
pub const DEFAULT_SHARD_SIZE: usize = 256;
pub const DEFAULT_SEED: u64 = 44;
pub const DEFAULT_VALID_FRACTION: f64 = 0.1;
pub const DEFAULT_TEST_FRACTION: f64 = 0.1;

pub const WINDOWS_FILE: &str = "sequences.bed";
pub const COVERAGE_DIR: &str = "coverage";
pub const COVERAGE_EXT: &str = "cov";
pub const SHARD_DIR: &str = "shards";
pub const SHARD_EXT: &str = "shard";
pub const STATISTICS_FILE: &str = "statistics.json";
pub const REPORT_FILE: &str = "report.json";
