use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use seqcov_core::errors::ConfigError;
use seqcov_core::models::Contig;
use seqcov_core::utils::{get_dynamic_reader, is_bed_header, parse_bedlike_line};

///
/// Unmappable regions of a genome (assembly gaps, low mappability).
///
/// Intervals are kept per chromosome, sorted and merged, so that they can be
/// cut out of chromosomes to produce contigs.
///
#[derive(Debug, Clone, Default)]
pub struct UnmappableMask {
    intervals: HashMap<String, Vec<(u32, u32)>>,
}

impl UnmappableMask {
    /// An empty mask: every base is mappable.
    pub fn empty() -> Self {
        UnmappableMask::default()
    }

    ///
    /// Build a mask from raw (possibly overlapping, unsorted) intervals.
    ///
    pub fn from_intervals<I, S>(intervals: I) -> Self
    where
        I: IntoIterator<Item = (S, u32, u32)>,
        S: Into<String>,
    {
        let mut by_chrom: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
        for (chr, start, end) in intervals {
            if end > start {
                by_chrom.entry(chr.into()).or_default().push((start, end));
            }
        }

        for spans in by_chrom.values_mut() {
            spans.sort_unstable();
            let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
            for &(start, end) in spans.iter() {
                match merged.last_mut() {
                    Some(last) if start <= last.1 => last.1 = last.1.max(end),
                    _ => merged.push((start, end)),
                }
            }
            *spans = merged;
        }

        UnmappableMask {
            intervals: by_chrom,
        }
    }

    ///
    /// Read a mask from a BED file (plain or gzipped).
    ///
    /// # Arguments
    /// - path: path to the bed file
    ///
    pub fn from_bed<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let reader =
            get_dynamic_reader(path).map_err(|_| ConfigError::FileReadError(display.clone()))?;

        let mut intervals = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if is_bed_header(&line) {
                continue;
            }
            match parse_bedlike_line(&line) {
                Some(interval) => intervals.push(interval),
                None => {
                    return Err(ConfigError::ParseError {
                        path: display,
                        line: i + 1,
                        reason: format!("not a bed interval: '{}'", line),
                    });
                }
            }
        }

        Ok(UnmappableMask::from_intervals(intervals))
    }

    /// Merged masked intervals of one chromosome.
    pub fn intervals(&self, chr: &str) -> &[(u32, u32)] {
        self.intervals.get(chr).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether any base of `[start, end)` on `chr` is masked.
    pub fn overlaps(&self, chr: &str, start: u32, end: u32) -> bool {
        let spans = self.intervals(chr);
        // first span ending after `start`
        let idx = spans.partition_point(|&(_, e)| e <= start);
        spans.get(idx).is_some_and(|&(s, _)| s < end)
    }

    /// Total number of masked bases.
    pub fn masked_bases(&self) -> u64 {
        self.intervals
            .values()
            .flat_map(|spans| spans.iter())
            .map(|&(s, e)| (e - s) as u64)
            .sum()
    }

    ///
    /// Cut the masked intervals out of a chromosome, returning the remaining
    /// mappable contigs in coordinate order.
    ///
    /// # Arguments
    /// - chr: chromosome name
    /// - length: chromosome length
    ///
    pub fn contigs(&self, chr: &str, length: u32) -> Vec<Contig> {
        let mut contigs = Vec::new();
        let mut cursor = 0;

        for &(start, end) in self.intervals(chr) {
            if start >= length {
                break;
            }
            if start > cursor {
                contigs.push(Contig::new(chr, cursor, start));
            }
            cursor = cursor.max(end.min(length));
        }

        if cursor < length {
            contigs.push(Contig::new(chr, cursor, length));
        }

        contigs
    }
}
