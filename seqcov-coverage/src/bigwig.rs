use std::collections::{HashMap, HashSet};
use std::path::Path;

use bigtools::BigWigRead;
use bigtools::utils::reopen::ReopenableFile;

use crate::errors::TrackReadError;
use crate::source::CoverageSource;

///
/// Coverage from an indexed bigWig file. Bases the file has no value for
/// come back as zero.
///
/// Chromosomes listed in the genome but absent from the file read as zero
/// coverage, the same as for bedGraph tracks.
///
pub struct BigWigSource {
    reader: BigWigRead<ReopenableFile>,
    lengths: HashMap<String, u32>,
    in_file: HashSet<String>,
}

impl BigWigSource {
    ///
    /// Open a bigWig file.
    ///
    /// # Arguments
    /// - path: path to the bigWig file
    /// - chrom_sizes: genome chromosome lengths
    ///
    pub fn open(path: &Path, chrom_sizes: &[(String, u32)]) -> Result<Self, TrackReadError> {
        let display = path.display().to_string();
        let reader = BigWigRead::open_file(&display).map_err(|e| TrackReadError::Open {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let mut lengths: HashMap<String, u32> = chrom_sizes.iter().cloned().collect();
        let mut in_file = HashSet::new();
        for chrom in reader.chroms() {
            lengths.entry(chrom.name.clone()).or_insert(chrom.length);
            in_file.insert(chrom.name.clone());
        }

        Ok(BigWigSource {
            reader,
            lengths,
            in_file,
        })
    }
}

impl CoverageSource for BigWigSource {
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
        if !self.in_file.contains(chrom) {
            out.fill(0.0);
            return Ok(());
        }

        let values = self
            .reader
            .values(chrom, start, end)
            .map_err(|e| TrackReadError::Read(format!("{}:{}-{}: {}", chrom, start, end, e)))?;

        if values.len() != out.len() {
            return Err(TrackReadError::Read(format!(
                "{}:{}-{}: expected {} values, got {}",
                chrom,
                start,
                end,
                out.len(),
                values.len()
            )));
        }

        // missing bases are NaN, zeroed by `read`
        out.copy_from_slice(&values);
        Ok(())
    }
}
