use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use seqcov_core::consts::{DEFAULT_POOL_WIDTH, DEFAULT_SEED, DEFAULT_SEQ_LENGTH};
use seqcov_core::errors::ConfigError;
use seqcov_core::models::Contig;

use crate::mask::UnmappableMask;

///
/// Parameters of the genome windower.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowerParams {
    /// Length of every window in bp.
    pub window_length: u32,
    /// Distance between consecutive window starts. `None` means non-overlapping
    /// windows (stride equal to the window length).
    pub stride: Option<u32>,
    /// Width of pooling bins; the window length must be a multiple of it.
    pub pool_width: u32,
    /// Fraction of candidate windows to keep, in `(0, 1]`.
    pub sample_fraction: f64,
    pub seed: u64,
    /// Window starts are rounded up to a multiple of this value.
    pub snap: u32,
    /// Contigs longer than this are halved until they are not.
    pub break_length: Option<u32>,
}

impl Default for WindowerParams {
    fn default() -> Self {
        WindowerParams {
            window_length: DEFAULT_SEQ_LENGTH,
            stride: None,
            pool_width: DEFAULT_POOL_WIDTH,
            sample_fraction: 1.0,
            seed: DEFAULT_SEED,
            snap: 1,
            break_length: None,
        }
    }
}

impl WindowerParams {
    pub fn stride(&self) -> u32 {
        self.stride.unwrap_or(self.window_length)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_length == 0 {
            return Err(ConfigError::ZeroWindowLength);
        }
        if self.stride() == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if self.pool_width == 0 {
            return Err(ConfigError::ZeroPoolWidth);
        }
        if self.window_length % self.pool_width != 0 {
            return Err(ConfigError::IndivisibleWindow {
                window: self.window_length,
                pool: self.pool_width,
            });
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(ConfigError::InvalidFraction {
                name: "sample fraction",
                value: self.sample_fraction,
                range: "(0, 1]",
            });
        }
        if self.snap == 0 {
            return Err(ConfigError::InvalidFraction {
                name: "snap",
                value: 0.0,
                range: "[1, inf)",
            });
        }
        if self.break_length == Some(0) {
            return Err(ConfigError::InvalidFraction {
                name: "break length",
                value: 0.0,
                range: "[1, inf)",
            });
        }
        Ok(())
    }
}

///
/// A window before split assignment, pointing back at its source contig.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateWindow {
    /// Index into [GenomeWindower::contigs].
    pub contig: usize,
    pub start: u32,
    pub end: u32,
}

///
/// Split contigs larger than `break_length` in half, repeatedly, keeping
/// coordinate order.
///
fn break_contig(contig: Contig, break_length: u32, out: &mut Vec<Contig>) {
    if contig.width() <= break_length {
        out.push(contig);
        return;
    }
    let mid = contig.start + contig.width() / 2;
    break_contig(Contig::new(&contig.chr, contig.start, mid), break_length, out);
    break_contig(Contig::new(&contig.chr, mid, contig.end), break_length, out);
}

///
/// Partitions the mappable part of a genome into fixed-length windows.
///
pub struct GenomeWindower {
    contigs: Vec<Contig>,
    params: WindowerParams,
}

impl GenomeWindower {
    ///
    /// Derive contigs from chromosome lengths and an unmappable mask.
    ///
    /// # Arguments
    /// - chrom_sizes: ordered chromosome lengths
    /// - mask: regions to exclude
    /// - params: windowing parameters, validated here
    ///
    pub fn new(
        chrom_sizes: &[(String, u32)],
        mask: &UnmappableMask,
        params: WindowerParams,
    ) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut contigs = Vec::new();
        for (chr, length) in chrom_sizes {
            for contig in mask.contigs(chr, *length) {
                match params.break_length {
                    Some(limit) => break_contig(contig, limit, &mut contigs),
                    None => contigs.push(contig),
                }
            }
        }

        log::debug!(
            "{} contigs from {} chromosomes ({} masked bases)",
            contigs.len(),
            chrom_sizes.len(),
            mask.masked_bases()
        );

        Ok(GenomeWindower { contigs, params })
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn params(&self) -> &WindowerParams {
        &self.params
    }

    ///
    /// Lazily produce the (down-sampled) windows of every contig, in contig
    /// order.
    ///
    pub fn windows(&self) -> WindowIter<'_> {
        WindowIter::new(&self.contigs, &self.params)
    }
}

///
/// Iterator over candidate windows of a contig list.
///
pub struct WindowIter<'a> {
    contigs: &'a [Contig],
    window_length: u32,
    stride: u32,
    snap: u32,
    sample_fraction: f64,
    rng: StdRng,
    contig: usize,
    next_start: u64,
}

impl<'a> WindowIter<'a> {
    fn new(contigs: &'a [Contig], params: &WindowerParams) -> Self {
        let mut iter = WindowIter {
            contigs,
            window_length: params.window_length,
            stride: params.stride(),
            snap: params.snap,
            sample_fraction: params.sample_fraction,
            rng: StdRng::seed_from_u64(params.seed),
            contig: 0,
            next_start: 0,
        };
        iter.next_start = iter.first_start(0);
        iter
    }

    fn first_start(&self, contig: usize) -> u64 {
        match self.contigs.get(contig) {
            Some(c) => (c.start as u64).div_ceil(self.snap as u64) * self.snap as u64,
            None => 0,
        }
    }

    fn keep(&mut self) -> bool {
        self.sample_fraction >= 1.0 || self.rng.random::<f64>() < self.sample_fraction
    }
}

impl Iterator for WindowIter<'_> {
    type Item = CandidateWindow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let contig = self.contigs.get(self.contig)?;
            let end = self.next_start + self.window_length as u64;

            if end <= contig.end as u64 {
                let window = CandidateWindow {
                    contig: self.contig,
                    start: self.next_start as u32,
                    end: end as u32,
                };
                self.next_start += self.stride as u64;
                if self.keep() {
                    return Some(window);
                }
            } else {
                self.contig += 1;
                self.next_start = self.first_start(self.contig);
            }
        }
    }
}
