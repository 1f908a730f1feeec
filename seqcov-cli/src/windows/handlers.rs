use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use seqcov_core::consts::WINDOWS_FILE;
use seqcov_core::utils::read_chrom_sizes;
use seqcov_pipeline::make_windows;
use seqcov_records::{FastaSequence, SequenceSource};

use crate::run::handlers::layout_config;

pub fn run_windows(matches: &ArgMatches) -> Result<()> {
    let mut config = layout_config(matches)?;
    if let Some(fasta) = matches.get_one::<String>("fasta") {
        config.fasta = PathBuf::from(fasta);
    }

    let chrom_sizes = match &config.chrom_sizes {
        Some(path) => read_chrom_sizes(path)?,
        None if !config.fasta.as_os_str().is_empty() => FastaSequence::open(&config.fasta)
            .with_context(|| format!("Failed to index {}", config.fasta.display()))?
            .chrom_sizes(),
        None => anyhow::bail!("Provide a FASTA or --chrom-sizes"),
    };

    let (windows, summary) = make_windows(&config, &chrom_sizes)?;
    summary.log();

    let output = match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(path),
        None => config.out_dir.join(WINDOWS_FILE),
    };
    windows
        .write_bed(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!("Wrote {} windows to {}", windows.len(), output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqcov_core::models::Split;
    use seqcov_windows::WindowSet;

    use crate::windows::cli::create_windows_cli;

    #[rstest]
    fn test_windows_from_chrom_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let sizes = dir.path().join("genome.sizes");
        std::fs::write(&sizes, "chr1\t10000\nchr2\t5000\n").unwrap();
        let output = dir.path().join("out").join("windows.bed");

        let matches = create_windows_cli()
            .try_get_matches_from([
                "windows",
                "--chrom-sizes",
                sizes.to_str().unwrap(),
                "-l",
                "1000",
                "-w",
                "10",
                "--test-chroms",
                "chr2",
                "--output",
                output.to_str().unwrap(),
            ])
            .unwrap();
        run_windows(&matches).unwrap();

        let windows = WindowSet::try_from(output.as_path()).unwrap();
        assert_eq!(windows.len(), 15);
        assert_eq!(windows.split(Split::Test).len(), 5);
    }

    #[rstest]
    fn test_windows_without_genome() {
        let matches = create_windows_cli()
            .try_get_matches_from(["windows", "-l", "1000", "-w", "10"])
            .unwrap();
        assert!(run_windows(&matches).is_err());
    }
}
