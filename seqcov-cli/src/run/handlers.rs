use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use seqcov_pipeline::{Pipeline, PipelineConfig, Status};
use seqcov_records::Encoding;

///
/// Load the `--config` file (or the defaults) and apply the windowing and
/// split flags on top of it.
///
pub fn layout_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => PipelineConfig::from_toml(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => PipelineConfig::default(),
    };

    if let Some(path) = matches.get_one::<String>("chrom-sizes") {
        config.chrom_sizes = Some(PathBuf::from(path));
    }
    if let Some(path) = matches.get_one::<String>("mask") {
        config.mask = Some(PathBuf::from(path));
    }

    let windows = &mut config.windows;
    if let Some(&length) = matches.get_one::<u32>("seq-length") {
        windows.window_length = length;
    }
    if let Some(&stride) = matches.get_one::<u32>("stride") {
        windows.stride = Some(stride);
    }
    if let Some(&width) = matches.get_one::<u32>("pool-width") {
        windows.pool_width = width;
    }
    if let Some(&fraction) = matches.get_one::<f64>("sample") {
        windows.sample_fraction = fraction;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        windows.seed = seed;
    }
    if let Some(&snap) = matches.get_one::<u32>("snap") {
        windows.snap = snap;
    }
    if let Some(&limit) = matches.get_one::<u32>("break") {
        windows.break_length = Some(limit);
    }

    let split = &mut config.split;
    if let Some(&fraction) = matches.get_one::<f64>("valid") {
        split.valid_fraction = fraction;
    }
    if let Some(&fraction) = matches.get_one::<f64>("test") {
        split.test_fraction = fraction;
    }
    if let Some(chroms) = matches.get_many::<String>("valid-chroms") {
        split.valid_chroms = chroms.cloned().collect();
    }
    if let Some(chroms) = matches.get_many::<String>("test-chroms") {
        split.test_chroms = chroms.cloned().collect();
    }

    Ok(config)
}

///
/// Full run configuration from `--config` and the command line.
///
pub fn run_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = layout_config(matches)?;

    if let Some(fasta) = matches.get_one::<String>("fasta") {
        config.fasta = PathBuf::from(fasta);
    }
    if let Some(targets) = matches.get_one::<String>("targets") {
        config.targets = PathBuf::from(targets);
    }
    if let Some(out_dir) = matches.get_one::<String>("out-dir") {
        config.out_dir = PathBuf::from(out_dir);
    }
    if let Some(&processes) = matches.get_one::<usize>("processes") {
        config.processes = processes;
    }
    if let Some(encoding) = matches.get_one::<String>("encoding") {
        config.encoding = encoding.parse::<Encoding>().map_err(anyhow::Error::msg)?;
    }
    if let Some(&shard_size) = matches.get_one::<usize>("shard-size") {
        config.shard_size = shard_size;
    }
    if matches.get_flag("strict") {
        config.strict = true;
    }

    Ok(config)
}

pub fn run_pipeline(matches: &ArgMatches) -> Result<()> {
    let config = run_config(matches)?;
    let out_dir = config.out_dir.clone();

    let mut pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let report = pipeline.run()?;

    if !report.is_complete() {
        anyhow::bail!(
            "Run incomplete: {} failed tracks, {} failed and {} missing shards (see {})",
            report.count_tracks(Status::Failed),
            report.count_shards(Status::Failed),
            report.count_shards(Status::Missing),
            out_dir.display()
        );
    }

    Ok(())
}
