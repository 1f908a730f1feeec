use std::path::{Path, PathBuf};

use serde::Serialize;

use seqcov_core::consts::{COVERAGE_DIR, COVERAGE_EXT};
use seqcov_core::models::Track;
use seqcov_windows::WindowSet;

use crate::errors::TrackReadError;
use crate::matrix::MatrixWriter;
use crate::pool::pool_window;
use crate::source::{CoverageSource, open_source};

/// Result of aggregating one track over the whole window set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackCoverage {
    pub identifier: String,
    pub path: PathBuf,
    pub rows: usize,
    pub cols: usize,
    /// Mean pooled value over every bin of every window.
    pub mean: f64,
}

/// Location of a track's pooled-signal matrix inside an output directory.
pub fn coverage_path(out_dir: &Path, identifier: &str) -> PathBuf {
    out_dir
        .join(COVERAGE_DIR)
        .join(format!("{}.{}", identifier, COVERAGE_EXT))
}

///
/// Pool the coverage of one source over every window and write the matrix.
///
/// # Arguments
/// - source: coverage of the track
/// - track: clip and summary statistic configuration
/// - windows: labeled windows; one matrix row each, same order
/// - window_length: length of every window
/// - pool_width: bases per bin
/// - out_path: matrix file to write
///
pub fn aggregate_source<S: CoverageSource + ?Sized>(
    source: &mut S,
    track: &Track,
    windows: &WindowSet,
    window_length: u32,
    pool_width: u32,
    out_path: &Path,
) -> Result<TrackCoverage, TrackReadError> {
    let cols = (window_length / pool_width) as usize;
    let mut writer = MatrixWriter::create(out_path, windows.len() as u64, cols as u32)?;

    let mut bases = vec![0f32; window_length as usize];
    let mut total = 0f64;

    for window in windows {
        if window.width() != window_length {
            return Err(TrackReadError::Read(format!(
                "window {}:{}-{} is not {} bp long",
                window.chr, window.start, window.end, window_length
            )));
        }

        source.read(&window.chr, window.start, window.end, &mut bases)?;
        let pooled = pool_window(track, &mut bases, pool_width as usize);
        total += pooled.iter().map(|&v| v as f64).sum::<f64>();
        writer.write_row(&pooled)?;
    }

    writer.finish()?;

    let bins = windows.len() * cols;
    Ok(TrackCoverage {
        identifier: track.identifier.clone(),
        path: out_path.to_path_buf(),
        rows: windows.len(),
        cols,
        mean: match bins {
            0 => 0.0,
            _ => total / bins as f64,
        },
    })
}

///
/// Aggregate one track from its file into `<out_dir>/coverage/<identifier>.cov`.
///
/// A failed track leaves no matrix file behind.
///
pub fn aggregate_track(
    track: &Track,
    windows: &WindowSet,
    window_length: u32,
    pool_width: u32,
    chrom_sizes: &[(String, u32)],
    out_dir: &Path,
) -> Result<TrackCoverage, TrackReadError> {
    let out_path = coverage_path(out_dir, &track.identifier);

    log::debug!(
        "Aggregating track {} from {}",
        track.identifier,
        track.file.display()
    );

    let result = open_source(&track.file, chrom_sizes).and_then(|mut source| {
        aggregate_source(
            source.as_mut(),
            track,
            windows,
            window_length,
            pool_width,
            &out_path,
        )
    });

    if result.is_err() && out_path.exists() {
        let _ = std::fs::remove_file(&out_path);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqcov_core::models::{Split, SumStat, Window};

    use crate::bigwig::tests::write_bigwig;
    use crate::matrix::CoverageMatrix;
    use crate::source::BedGraphSource;

    fn track(identifier: &str, file: PathBuf) -> Track {
        Track {
            index: 0,
            identifier: identifier.to_string(),
            file,
            clip: Some(384.0),
            clip_soft: None,
            scale: 1.0,
            sum_stat: SumStat::Sum,
            description: String::new(),
        }
    }

    fn window(chr: &str, start: u32, split: Split) -> Window {
        Window {
            chr: chr.to_string(),
            start,
            end: start + 256,
            split,
        }
    }

    #[fixture]
    fn chrom_sizes() -> Vec<(String, u32)> {
        vec![("chr1".to_string(), 1024), ("chr2".to_string(), 512)]
    }

    #[fixture]
    fn windows() -> WindowSet {
        WindowSet::new(vec![
            window("chr1", 0, Split::Train),
            window("chr1", 256, Split::Train),
            window("chr2", 0, Split::Valid),
        ])
    }

    #[rstest]
    fn test_every_window_gets_window_over_pool_values(
        chrom_sizes: Vec<(String, u32)>,
        windows: WindowSet,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut source = BedGraphSource::from_runs(
            vec![("chr1", 0, 128, 1.0), ("chr1", 300, 310, 1000.0)],
            &chrom_sizes,
        )
        .unwrap();
        let track = track("t0", PathBuf::from("t0.bedGraph"));
        let out_path = coverage_path(dir.path(), "t0");

        let coverage =
            aggregate_source(&mut source, &track, &windows, 256, 64, &out_path).unwrap();
        assert_eq!((coverage.rows, coverage.cols), (3, 4));

        let matrix = CoverageMatrix::open(&out_path).unwrap();
        assert_eq!(
            matrix.read_rows(0..3).unwrap(),
            vec![
                64.0, 64.0, 0.0, 0.0, //
                10.0 * 384.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0,
            ]
        );
    }

    #[rstest]
    fn test_track_from_file(chrom_sizes: Vec<(String, u32)>, windows: WindowSet) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t1.bedGraph");
        std::fs::write(&file, "chr2\t0\t512\t0.5\n").unwrap();

        let coverage =
            aggregate_track(&track("t1", file), &windows, 256, 128, &chrom_sizes, dir.path())
                .unwrap();

        let matrix = CoverageMatrix::open(&coverage.path).unwrap();
        assert_eq!(matrix.read_rows(2..3).unwrap(), vec![64.0, 64.0]);
        assert!(coverage.path.ends_with("coverage/t1.cov"));
    }

    #[rstest]
    fn test_bigwig_without_a_genome_chrom(chrom_sizes: Vec<(String, u32)>, windows: WindowSet) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t4.bw");
        write_bigwig(&file, &[("chr1", 1024)], &[("chr1", 0, 256, 0.5)]);

        let coverage =
            aggregate_track(&track("t4", file), &windows, 256, 128, &chrom_sizes, dir.path())
                .unwrap();

        let matrix = CoverageMatrix::open(&coverage.path).unwrap();
        assert_eq!(
            matrix.read_rows(0..3).unwrap(),
            vec![64.0, 64.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[rstest]
    fn test_failed_track_leaves_no_matrix(windows: WindowSet) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t2.bedGraph");
        std::fs::write(&file, "chr1\t0\t10\t1\n").unwrap();

        // chr2 is unknown to both the genome and the file
        let chrom_sizes = vec![("chr1".to_string(), 1024)];
        let result = aggregate_track(&track("t2", file), &windows, 256, 128, &chrom_sizes, dir.path());

        assert!(matches!(result, Err(TrackReadError::MissingChrom(_))));
        assert!(!coverage_path(dir.path(), "t2").exists());
    }

    #[rstest]
    fn test_unreadable_track(chrom_sizes: Vec<(String, u32)>, windows: WindowSet) {
        let dir = tempfile::tempdir().unwrap();
        let result = aggregate_track(
            &track("t3", dir.path().join("missing.bw")),
            &windows,
            256,
            128,
            &chrom_sizes,
            dir.path(),
        );
        assert!(matches!(result, Err(TrackReadError::Open { .. })));
    }
}
