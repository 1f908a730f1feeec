use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use seqcov_core::utils::{FileType, get_dynamic_reader, get_file_info, is_bed_header};

use crate::bigwig::BigWigSource;
use crate::errors::TrackReadError;

///
/// Random access to per-base coverage of one signal track.
///
pub trait CoverageSource {
    /// Length of a chromosome, `None` when the track does not know it.
    fn chrom_length(&self, chrom: &str) -> Option<u32>;

    ///
    /// Write per-base values of `[start, end)` into `out`. Bases without data
    /// must be written as zero. `out.len()` is `end - start`.
    ///
    fn fill(
        &mut self,
        chrom: &str,
        start: u32,
        end: u32,
        out: &mut [f32],
    ) -> Result<(), TrackReadError>;

    ///
    /// Read per-base values of `[start, end)` into `out`, checking the
    /// interval against the chromosome length first. NaN values come back
    /// as zero.
    ///
    fn read(
        &mut self,
        chrom: &str,
        start: u32,
        end: u32,
        out: &mut [f32],
    ) -> Result<(), TrackReadError> {
        let length = self
            .chrom_length(chrom)
            .ok_or_else(|| TrackReadError::MissingChrom(chrom.to_string()))?;

        if end > length || start > end {
            return Err(TrackReadError::OutOfRange {
                chrom: chrom.to_string(),
                start,
                end,
                length,
            });
        }

        self.fill(chrom, start, end, out)?;

        for value in out.iter_mut() {
            if value.is_nan() {
                *value = 0.0;
            }
        }

        Ok(())
    }
}

///
/// A bedGraph track held in memory: sorted, non-overlapping `(start, end,
/// value)` runs per chromosome.
///
/// Chromosomes listed in the genome but absent from the file read as zero
/// coverage; their length comes from the genome. Chromosomes unknown to
/// both are missing.
///
#[derive(Debug, Clone, Default)]
pub struct BedGraphSource {
    runs: HashMap<String, Vec<(u32, u32, f32)>>,
    lengths: HashMap<String, u32>,
}

impl BedGraphSource {
    ///
    /// Build a source from raw runs. Runs of one chromosome must not
    /// overlap.
    ///
    /// # Arguments
    /// - runs: `(chrom, start, end, value)` tuples, any order
    /// - chrom_sizes: genome chromosome lengths
    ///
    pub fn from_runs<I, S>(runs: I, chrom_sizes: &[(String, u32)]) -> Result<Self, TrackReadError>
    where
        I: IntoIterator<Item = (S, u32, u32, f32)>,
        S: Into<String>,
    {
        let mut by_chrom: HashMap<String, Vec<(u32, u32, f32)>> = HashMap::new();
        for (chrom, start, end, value) in runs {
            if end > start {
                by_chrom
                    .entry(chrom.into())
                    .or_default()
                    .push((start, end, value));
            }
        }

        let mut lengths: HashMap<String, u32> = chrom_sizes.iter().cloned().collect();
        for (chrom, chrom_runs) in by_chrom.iter_mut() {
            chrom_runs.sort_by_key(|r| r.0);
            if let Some(pair) = chrom_runs.windows(2).find(|pair| pair[1].0 < pair[0].1) {
                return Err(TrackReadError::OverlappingRuns {
                    chrom: chrom.clone(),
                    start: pair[1].0,
                    previous_end: pair[0].1,
                });
            }
            let max_end = chrom_runs.iter().map(|r| r.1).max().unwrap_or(0);
            lengths.entry(chrom.clone()).or_insert(max_end);
        }

        Ok(BedGraphSource {
            runs: by_chrom,
            lengths,
        })
    }

    ///
    /// Read a bedGraph file (plain or gzipped).
    ///
    /// # Arguments
    /// - path: path to the bedGraph file
    /// - chrom_sizes: genome chromosome lengths
    ///
    pub fn from_path(path: &Path, chrom_sizes: &[(String, u32)]) -> Result<Self, TrackReadError> {
        let display = path.display().to_string();
        let reader = get_dynamic_reader(path).map_err(|e| TrackReadError::Open {
            path: display.clone(),
            reason: format!("{:#}", e),
        })?;

        let mut runs = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if is_bed_header(&line) {
                continue;
            }

            let malformed = |reason: &str| TrackReadError::Malformed {
                path: display.clone(),
                line: i + 1,
                reason: reason.to_string(),
            };

            let mut parts = line.split_whitespace();
            let chrom = parts.next().ok_or_else(|| malformed("missing chrom"))?;
            let start = parts
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(|| malformed("invalid start"))?;
            let end = parts
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(|| malformed("invalid end"))?;
            let value = parts
                .next()
                .and_then(|s| s.parse::<f32>().ok())
                .ok_or_else(|| malformed("invalid value"))?;

            runs.push((chrom.to_string(), start, end, value));
        }

        BedGraphSource::from_runs(runs, chrom_sizes)
    }
}

impl CoverageSource for BedGraphSource {
    fn chrom_length(&self, chrom: &str) -> Option<u32> {
        self.lengths.get(chrom).copied()
    }

    fn fill(
        &mut self,
        chrom: &str,
        start: u32,
        end: u32,
        out: &mut [f32],
    ) -> Result<(), TrackReadError> {
        out.fill(0.0);

        let Some(runs) = self.runs.get(chrom) else {
            return Ok(());
        };

        // runs are sorted by start; skip those ending before the window
        let first = runs.partition_point(|r| r.0 < start);
        let first = first.saturating_sub(1);

        for &(run_start, run_end, value) in &runs[first..] {
            if run_start >= end {
                break;
            }
            let lo = run_start.max(start);
            let hi = run_end.min(end);
            if lo < hi {
                out[(lo - start) as usize..(hi - start) as usize].fill(value);
            }
        }

        Ok(())
    }
}

///
/// Open the coverage source of a track file, choosing the reader from the
/// file extension.
///
/// # Arguments
/// - path: bigWig (`.bw`, `.bigwig`) or bedGraph (`.bedgraph`, `.bg`, optionally gzipped)
/// - chrom_sizes: genome chromosome lengths
///
pub fn open_source(
    path: &Path,
    chrom_sizes: &[(String, u32)],
) -> Result<Box<dyn CoverageSource>, TrackReadError> {
    let info = get_file_info(path);

    match info.file_type {
        FileType::BIGWIG => Ok(Box::new(BigWigSource::open(path, chrom_sizes)?)),
        FileType::BEDGRAPH => Ok(Box::new(BedGraphSource::from_path(path, chrom_sizes)?)),
        _ => Err(TrackReadError::Open {
            path: path.display().to_string(),
            reason: "unsupported track format, expected bigWig or bedGraph".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn chrom_sizes() -> Vec<(String, u32)> {
        vec![("chr1".to_string(), 100), ("chr2".to_string(), 50)]
    }

    #[fixture]
    fn source(chrom_sizes: Vec<(String, u32)>) -> BedGraphSource {
        BedGraphSource::from_runs(
            vec![
                ("chr1", 10, 20, 2.0),
                ("chr1", 0, 5, 1.0),
                ("chr1", 20, 22, f32::NAN),
                ("chrX", 0, 10, 3.0),
            ],
            &chrom_sizes,
        )
        .unwrap()
    }

    #[rstest]
    fn test_fill_with_gaps(mut source: BedGraphSource) {
        let mut out = vec![9.0; 20];
        source.read("chr1", 3, 23, &mut out).unwrap();

        let mut expected = vec![0.0; 20];
        expected[0..2].fill(1.0);
        expected[7..17].fill(2.0);
        assert_eq!(out, expected);
    }

    #[rstest]
    fn test_run_starting_before_window(mut source: BedGraphSource) {
        let mut out = vec![0.0; 4];
        source.read("chr1", 12, 16, &mut out).unwrap();
        assert_eq!(out, vec![2.0; 4]);
    }

    #[rstest]
    fn test_genome_chrom_without_data_is_zero(mut source: BedGraphSource) {
        let mut out = vec![1.0; 10];
        source.read("chr2", 40, 50, &mut out).unwrap();
        assert_eq!(out, vec![0.0; 10]);
    }

    #[rstest]
    fn test_chrom_only_in_file_uses_max_end(source: BedGraphSource) {
        assert_eq!(source.chrom_length("chrX"), Some(10));
    }

    #[rstest]
    fn test_missing_chrom(mut source: BedGraphSource) {
        let mut out = vec![0.0; 10];
        assert!(matches!(
            source.read("chr7", 0, 10, &mut out),
            Err(TrackReadError::MissingChrom(_))
        ));
    }

    #[rstest]
    fn test_out_of_range(mut source: BedGraphSource) {
        let mut out = vec![0.0; 10];
        assert!(matches!(
            source.read("chr2", 45, 55, &mut out),
            Err(TrackReadError::OutOfRange { length: 50, .. })
        ));
    }

    #[rstest]
    fn test_from_path(chrom_sizes: Vec<(String, u32)>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.bedGraph");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "track type=bedGraph").unwrap();
        writeln!(file, "chr1\t0\t4\t1.5").unwrap();
        writeln!(file, "chr1\t4\t8\t0.5").unwrap();

        let mut source = open_source(&path, &chrom_sizes).unwrap();
        let mut out = vec![0.0; 8];
        source.read("chr1", 0, 8, &mut out).unwrap();
        assert_eq!(out, vec![1.5, 1.5, 1.5, 1.5, 0.5, 0.5, 0.5, 0.5]);
    }

    #[rstest]
    fn test_from_path_malformed(chrom_sizes: Vec<(String, u32)>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.bg");
        std::fs::write(&path, "chr1\t0\t4\n").unwrap();

        assert!(matches!(
            BedGraphSource::from_path(&path, &chrom_sizes),
            Err(TrackReadError::Malformed { line: 1, .. })
        ));
    }

    #[rstest]
    #[case(vec![("chr1", 0, 10, 1.0), ("chr1", 5, 15, 2.0)], 5, 10)]
    #[case(vec![("chr1", 20, 30, 1.0), ("chr1", 0, 40, 2.0)], 20, 40)]
    fn test_overlapping_runs_rejected(
        chrom_sizes: Vec<(String, u32)>,
        #[case] runs: Vec<(&str, u32, u32, f32)>,
        #[case] start: u32,
        #[case] previous_end: u32,
    ) {
        let result = BedGraphSource::from_runs(runs, &chrom_sizes);
        match result {
            Err(TrackReadError::OverlappingRuns {
                chrom,
                start: s,
                previous_end: e,
            }) => assert_eq!((chrom.as_str(), s, e), ("chr1", start, previous_end)),
            other => panic!("expected overlapping runs, got {:?}", other.map(|_| ())),
        }
    }

    #[rstest]
    fn test_adjacent_runs_accepted(chrom_sizes: Vec<(String, u32)>) {
        let mut source = BedGraphSource::from_runs(
            vec![("chr1", 0, 4, 1.0), ("chr1", 4, 8, 2.0), ("chr2", 2, 6, 3.0)],
            &chrom_sizes,
        )
        .unwrap();

        let mut out = vec![0.0; 8];
        source.read("chr1", 0, 8, &mut out).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[rstest]
    fn test_from_path_overlapping(chrom_sizes: Vec<(String, u32)>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.bedGraph");
        std::fs::write(&path, "chr1\t0\t10\t1\nchr1\t5\t15\t2\n").unwrap();

        assert!(matches!(
            open_source(&path, &chrom_sizes),
            Err(TrackReadError::OverlappingRuns { .. })
        ));
    }

    #[rstest]
    fn test_open_unsupported(chrom_sizes: Vec<(String, u32)>) {
        assert!(matches!(
            open_source(Path::new("signal.txt"), &chrom_sizes),
            Err(TrackReadError::Open { .. })
        ));
    }

    #[rstest]
    fn test_open_missing_file(chrom_sizes: Vec<(String, u32)>) {
        assert!(matches!(
            open_source(Path::new("/does/not/exist.bedGraph"), &chrom_sizes),
            Err(TrackReadError::Open { .. })
        ));
    }
}
