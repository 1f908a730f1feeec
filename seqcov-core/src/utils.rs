use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    BIGWIG,
    BEDGRAPH,
    BED,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bw" | "bigwig" => Ok(FileType::BIGWIG),
            "bedgraph" | "bg" => Ok(FileType::BEDGRAPH),
            "bed" => Ok(FileType::BED),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

///
/// Determine the type of a file from its extension, looking through a
/// trailing `.gz`.
///
pub fn get_file_info(path: &Path) -> FileInfo {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let inner = if is_gzipped {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };

    let file_type = inner
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| FileType::from_str(ext).unwrap_or(FileType::UNKNOWN))
        .unwrap_or(FileType::UNKNOWN);

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Parses a bed-like line into a contig (chromosome), start and end.
/// Columns beyond the third are ignored.
pub fn parse_bedlike_line(line: &str) -> Option<(String, u32, u32)> {
    let mut fields = line.split('\t');
    let ctg = fields.next()?;
    let st = fields.next()?.trim().parse::<u32>().ok()?;
    let en = fields.next()?.trim().parse::<u32>().ok()?;

    Some((ctg.to_string(), st, en))
}

/// Whether a bed-like line carries no data (blank, comment or track header).
pub fn is_bed_header(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

///
/// Read chromosome lengths from a chrom sizes file or a FASTA index (`.fai`).
///
/// Only the first two whitespace separated columns are used. File order is
/// preserved since it determines contig order downstream.
///
/// # Arguments
/// - path: path to the chrom sizes or `.fai` file
///
pub fn read_chrom_sizes<P: AsRef<Path>>(path: P) -> Result<Vec<(String, u32)>, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let reader =
        get_dynamic_reader(path).map_err(|_| ConfigError::FileReadError(display.clone()))?;

    let mut chrom_sizes = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let chrom = parts.next();
        let size = parts.next().and_then(|s| s.parse::<u32>().ok());

        match (chrom, size) {
            (Some(chrom), Some(size)) => chrom_sizes.push((chrom.to_string(), size)),
            _ => {
                return Err(ConfigError::ParseError {
                    path: display,
                    line: i + 1,
                    reason: format!("expected '<chrom> <length>', found '{}'", line),
                });
            }
        }
    }

    Ok(chrom_sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::path::PathBuf;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("signal.bw", FileType::BIGWIG, false)]
    #[case("signal.bigWig", FileType::BIGWIG, false)]
    #[case("signal.bedGraph.gz", FileType::BEDGRAPH, true)]
    #[case("mask.bed", FileType::BED, false)]
    #[case("notes.txt", FileType::UNKNOWN, false)]
    fn test_get_file_info(#[case] name: &str, #[case] file_type: FileType, #[case] gz: bool) {
        let info = get_file_info(&PathBuf::from(name));
        assert_eq!(info.file_type, file_type);
        assert_eq!(info.is_gzipped, gz);
    }

    #[rstest]
    fn test_parse_bedlike_line() {
        assert_eq!(
            parse_bedlike_line("chr1\t10\t20\textra"),
            Some(("chr1".to_string(), 10, 20))
        );
        assert_eq!(parse_bedlike_line("chr1\tten\t20"), None);
        assert_eq!(parse_bedlike_line("chr1"), None);
    }

    #[rstest]
    fn test_read_chrom_sizes_keeps_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chr2\t500\t6\t60\t61").unwrap();
        writeln!(file, "chr1\t1000\t520\t60\t61").unwrap();
        writeln!(file).unwrap();

        let sizes = read_chrom_sizes(file.path()).unwrap();
        assert_eq!(
            sizes,
            vec![("chr2".to_string(), 500), ("chr1".to_string(), 1000)]
        );
    }

    #[rstest]
    fn test_read_chrom_sizes_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.sizes.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(encoder, "chrX 42").unwrap();
        encoder.finish().unwrap();

        let sizes = read_chrom_sizes(&path).unwrap();
        assert_eq!(sizes, vec![("chrX".to_string(), 42)]);
    }

    #[rstest]
    fn test_read_chrom_sizes_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chr1").unwrap();
        assert!(matches!(
            read_chrom_sizes(file.path()),
            Err(ConfigError::ParseError { line: 1, .. })
        ));
    }
}
