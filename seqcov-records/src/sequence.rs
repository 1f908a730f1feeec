use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use noodles::core::{Position, Region};
use noodles::fasta::fai::Index as FaiIndex;
use noodles::fasta::fai::io::Reader as FaiReader;
use noodles::fasta::fs::index as index_fasta;
use noodles::fasta::io::indexed_reader::{
    Builder as FastaBuilder, IndexedReader as FastaIndexedReader,
};

use crate::errors::SequenceError;

///
/// Random access to genome sequence.
///
pub trait SequenceSource {
    /// Chromosome lengths in genome order.
    fn chrom_sizes(&self) -> Vec<(String, u32)>;

    /// Nucleotides of `[start, end)`, 0-based half-open.
    fn fetch(&mut self, chrom: &str, start: u32, end: u32) -> Result<Vec<u8>, SequenceError>;
}

fn check_range(
    lengths: &HashMap<String, u64>,
    chrom: &str,
    start: u32,
    end: u32,
) -> Result<(), SequenceError> {
    let length = *lengths
        .get(chrom)
        .ok_or_else(|| SequenceError::MissingChrom(chrom.to_string()))?;

    if end as u64 > length || start >= end {
        return Err(SequenceError::OutOfRange {
            chrom: chrom.to_string(),
            start,
            end,
            length,
        });
    }
    Ok(())
}

///
/// An indexed FASTA file. The `.fai` next to the FASTA is used when present,
/// otherwise the index is built on open.
///
pub struct FastaSequence {
    reader: FastaIndexedReader<BufReader<File>>,
    order: Vec<(String, u32)>,
    lengths: HashMap<String, u64>,
}

fn open_error(path: &Path) -> impl Fn(std::io::Error) -> SequenceError + '_ {
    move |e| SequenceError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl FastaSequence {
    pub fn open(path: &Path) -> Result<Self, SequenceError> {
        let index = FastaSequence::load_index(path)?;
        FastaSequence::with_index(path, index)
    }

    ///
    /// Read `<path>.fai`, or index the FASTA when there is none. Load it once
    /// and hand clones to [`FastaSequence::with_index`] to open many readers.
    ///
    pub fn load_index(path: &Path) -> Result<FaiIndex, SequenceError> {
        let mut fai_path = path.as_os_str().to_owned();
        fai_path.push(".fai");
        let fai_path = PathBuf::from(fai_path);

        if fai_path.exists() {
            FaiReader::new(BufReader::new(
                File::open(&fai_path).map_err(open_error(path))?,
            ))
            .read_index()
            .map_err(open_error(path))
        } else {
            log::debug!("No index found for {}, indexing", path.display());
            index_fasta(path).map_err(open_error(path))
        }
    }

    /// Open the FASTA with an index that is already loaded.
    pub fn with_index(path: &Path, index: FaiIndex) -> Result<Self, SequenceError> {
        let order: Vec<(String, u32)> = index
            .as_ref()
            .iter()
            .map(|record| {
                (
                    String::from_utf8_lossy(record.name()).into_owned(),
                    record.length() as u32,
                )
            })
            .collect();
        let lengths = order
            .iter()
            .map(|(chrom, length)| (chrom.clone(), *length as u64))
            .collect();

        let reader = FastaBuilder::default()
            .set_index(index)
            .build_from_reader(BufReader::new(
                File::open(path).map_err(open_error(path))?,
            ))
            .map_err(open_error(path))?;

        Ok(FastaSequence {
            reader,
            order,
            lengths,
        })
    }

    /// Chromosome lengths in the index.
    pub fn lengths(&self) -> &HashMap<String, u64> {
        &self.lengths
    }
}

impl SequenceSource for FastaSequence {
    fn chrom_sizes(&self) -> Vec<(String, u32)> {
        self.order.clone()
    }

    fn fetch(&mut self, chrom: &str, start: u32, end: u32) -> Result<Vec<u8>, SequenceError> {
        check_range(&self.lengths, chrom, start, end)?;

        let to_position = |p: u32| {
            Position::try_from(p as usize).map_err(|e| {
                SequenceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
            })
        };
        // noodles regions are 1-based and closed
        let region = Region::new(chrom, to_position(start + 1)?..=to_position(end)?);
        let record = self.reader.query(&region)?;

        Ok(record.sequence().as_ref().to_vec())
    }
}

///
/// A genome held in memory, keyed by chromosome name.
///
#[derive(Debug, Clone, Default)]
pub struct InMemoryGenome {
    sequences: HashMap<String, Vec<u8>>,
    lengths: HashMap<String, u64>,
}

impl InMemoryGenome {
    pub fn new<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: Into<String>,
    {
        let sequences: HashMap<String, Vec<u8>> = sequences
            .into_iter()
            .map(|(chrom, seq)| (chrom.into(), seq))
            .collect();
        let lengths = sequences
            .iter()
            .map(|(chrom, seq)| (chrom.clone(), seq.len() as u64))
            .collect();

        InMemoryGenome { sequences, lengths }
    }
}

impl SequenceSource for InMemoryGenome {
    /// Sorted by name.
    fn chrom_sizes(&self) -> Vec<(String, u32)> {
        let mut sizes: Vec<(String, u32)> = self
            .lengths
            .iter()
            .map(|(chrom, &length)| (chrom.clone(), length as u32))
            .collect();
        sizes.sort();
        sizes
    }

    fn fetch(&mut self, chrom: &str, start: u32, end: u32) -> Result<Vec<u8>, SequenceError> {
        check_range(&self.lengths, chrom, start, end)?;
        Ok(self.sequences[chrom][start as usize..end as usize].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn genome() -> InMemoryGenome {
        InMemoryGenome::new(vec![
            ("chr1", b"ACGTACGTNN".to_vec()),
            ("chr2", b"ttttcccc".to_vec()),
        ])
    }

    #[rstest]
    fn test_in_memory_fetch(mut genome: InMemoryGenome) {
        assert_eq!(genome.fetch("chr1", 2, 6).unwrap(), b"GTAC".to_vec());
        assert_eq!(genome.fetch("chr2", 0, 8).unwrap(), b"ttttcccc".to_vec());
        assert_eq!(
            genome.chrom_sizes(),
            vec![("chr1".to_string(), 10), ("chr2".to_string(), 8)]
        );
    }

    #[rstest]
    fn test_in_memory_errors(mut genome: InMemoryGenome) {
        assert!(matches!(
            genome.fetch("chrM", 0, 4),
            Err(SequenceError::MissingChrom(_))
        ));
        assert!(matches!(
            genome.fetch("chr2", 4, 12),
            Err(SequenceError::OutOfRange { length: 8, .. })
        ));
    }

    #[rstest]
    fn test_fasta_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        let mut file = File::create(&path).unwrap();
        writeln!(file, ">chr1 test").unwrap();
        writeln!(file, "ACGTACGT").unwrap();
        writeln!(file, "GGGGCCCC").unwrap();
        writeln!(file, ">chr2").unwrap();
        writeln!(file, "NNNNtttt").unwrap();
        drop(file);

        let mut fasta = FastaSequence::open(&path).unwrap();
        assert_eq!(fasta.lengths()["chr1"], 16);
        assert_eq!(
            fasta.chrom_sizes(),
            vec![("chr1".to_string(), 16), ("chr2".to_string(), 8)]
        );
        assert_eq!(fasta.fetch("chr1", 6, 10).unwrap(), b"GTGG".to_vec());
        assert_eq!(fasta.fetch("chr2", 0, 8).unwrap(), b"NNNNtttt".to_vec());
        assert!(fasta.fetch("chr2", 4, 9).is_err());
    }

    #[rstest]
    fn test_fasta_with_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        std::fs::write(&path, ">chr1\nACGT\nTTAA\n").unwrap();
        std::fs::write(dir.path().join("genome.fa.fai"), "chr1\t8\t6\t4\t5\n").unwrap();

        let mut fasta = FastaSequence::open(&path).unwrap();
        assert_eq!(fasta.fetch("chr1", 2, 7).unwrap(), b"GTTTA".to_vec());
    }

    #[rstest]
    fn test_readers_share_one_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        std::fs::write(&path, ">chr1\nACGT\nTTAA\n>chr2\nGGCC\n").unwrap();

        let index = FastaSequence::load_index(&path).unwrap();

        // readers built from the loaded index never look at the .fai again
        std::fs::write(dir.path().join("genome.fa.fai"), "not an index\n").unwrap();

        let mut first = FastaSequence::with_index(&path, index.clone()).unwrap();
        let mut second = FastaSequence::with_index(&path, index).unwrap();
        assert_eq!(first.fetch("chr1", 2, 7).unwrap(), b"GTTTA".to_vec());
        assert_eq!(second.fetch("chr2", 1, 3).unwrap(), b"GC".to_vec());
        assert_eq!(first.chrom_sizes(), second.chrom_sizes());
        assert!(FastaSequence::open(&path).is_err());
    }
}
