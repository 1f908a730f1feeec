use std::collections::HashSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use seqcov_core::consts::{DEFAULT_TEST_FRACTION, DEFAULT_VALID_FRACTION};
use seqcov_core::errors::ConfigError;
use seqcov_core::models::{Contig, SPLITS, Split, Window};

use crate::bed::WindowSet;
use crate::windower::CandidateWindow;

///
/// Requested held-out fractions, plus optional chromosomes forced into the
/// valid or test split.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    pub valid_fraction: f64,
    pub test_fraction: f64,
    pub valid_chroms: Vec<String>,
    pub test_chroms: Vec<String>,
}

impl Default for SplitParams {
    fn default() -> Self {
        SplitParams {
            valid_fraction: DEFAULT_VALID_FRACTION,
            test_fraction: DEFAULT_TEST_FRACTION,
            valid_chroms: vec![],
            test_chroms: vec![],
        }
    }
}

impl SplitParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("valid fraction", self.valid_fraction),
            ("test fraction", self.test_fraction),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidFraction {
                    name,
                    value,
                    range: "[0, 1)",
                });
            }
        }
        let held_out = self.valid_fraction + self.test_fraction;
        if held_out >= 1.0 {
            return Err(ConfigError::NoTrainingFraction(held_out));
        }
        Ok(())
    }

    /// Target fraction of every split, in [SPLITS] order.
    pub fn targets(&self) -> [f64; 3] {
        [
            1.0 - self.valid_fraction - self.test_fraction,
            self.valid_fraction,
            self.test_fraction,
        ]
    }
}

/// Realized size of one split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitCount {
    pub split: Split,
    pub contigs: usize,
    pub windows: usize,
    pub fraction: f64,
}

/// Realized sizes of all splits, in [SPLITS] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub splits: Vec<SplitCount>,
}

impl SplitSummary {
    pub fn get(&self, split: Split) -> &SplitCount {
        &self.splits[split.index()]
    }

    pub fn total_windows(&self) -> usize {
        self.splits.iter().map(|s| s.windows).sum()
    }

    /// Log one line per split for operator verification.
    pub fn log(&self) {
        for count in &self.splits {
            log::info!("{}", count);
        }
    }
}

impl Display for SplitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<5} {:>7} contigs {:>9} windows ({:.2}%)",
            self.split.as_str(),
            self.contigs,
            self.windows,
            100.0 * self.fraction
        )
    }
}

///
/// Pick the split currently furthest below its target fraction. Ties go to
/// the earliest split in [SPLITS] order.
///
fn furthest_below_target(targets: &[f64; 3], assigned: &[usize; 3], total: usize) -> Split {
    let mut best = Split::Train;
    let mut best_gap = f64::NEG_INFINITY;

    for split in SPLITS {
        let realized = match total {
            0 => 0.0,
            _ => assigned[split.index()] as f64 / total as f64,
        };
        let gap = targets[split.index()] - realized;
        if gap > best_gap {
            best = split;
            best_gap = gap;
        }
    }

    best
}

///
/// Assign whole contigs to splits.
///
/// Contigs are visited in order and weighted by their number of windows;
/// contigs without windows are skipped. A contig on a chromosome listed in
/// `test_chroms` / `valid_chroms` goes to that split, any other contig goes to
/// the split currently furthest below its target fraction. The procedure has
/// no randomness, so identical inputs always give identical labels.
///
/// # Arguments
/// - contigs: contigs the candidates point into
/// - candidates: windows grouped by contig, in contig order
/// - params: requested fractions
///
/// # Returns
/// - windows ordered train, valid, test (contig order kept within a split)
/// - realized counts and fractions per split
///
pub fn assign_splits<I>(
    contigs: &[Contig],
    candidates: I,
    params: &SplitParams,
) -> Result<(WindowSet, SplitSummary), ConfigError>
where
    I: IntoIterator<Item = CandidateWindow>,
{
    params.validate()?;

    let targets = params.targets();
    let valid_chroms: HashSet<&str> = params.valid_chroms.iter().map(|s| s.as_str()).collect();
    let test_chroms: HashSet<&str> = params.test_chroms.iter().map(|s| s.as_str()).collect();

    let mut by_split: [Vec<Window>; 3] = [vec![], vec![], vec![]];
    let mut assigned = [0usize; 3];
    let mut contig_counts = [0usize; 3];
    let mut total = 0usize;

    let mut flush = |contig: usize, group: &mut Vec<CandidateWindow>| {
        if group.is_empty() {
            return;
        }
        let chr = contigs[contig].chr.as_str();
        let split = if test_chroms.contains(chr) {
            Split::Test
        } else if valid_chroms.contains(chr) {
            Split::Valid
        } else {
            furthest_below_target(&targets, &assigned, total)
        };

        assigned[split.index()] += group.len();
        contig_counts[split.index()] += 1;
        total += group.len();

        by_split[split.index()].extend(group.drain(..).map(|w| Window {
            chr: chr.to_string(),
            start: w.start,
            end: w.end,
            split,
        }));
    };

    let mut current: Option<usize> = None;
    let mut group: Vec<CandidateWindow> = Vec::new();
    for candidate in candidates {
        if current != Some(candidate.contig) {
            if let Some(contig) = current {
                flush(contig, &mut group);
            }
            current = Some(candidate.contig);
        }
        group.push(candidate);
    }
    if let Some(contig) = current {
        flush(contig, &mut group);
    }

    let summary = SplitSummary {
        splits: SPLITS
            .iter()
            .map(|split| SplitCount {
                split: *split,
                contigs: contig_counts[split.index()],
                windows: assigned[split.index()],
                fraction: match total {
                    0 => 0.0,
                    _ => assigned[split.index()] as f64 / total as f64,
                },
            })
            .collect(),
    };

    let [train, valid, test] = by_split;
    let windows: Vec<Window> = train.into_iter().chain(valid).chain(test).collect();

    Ok((WindowSet::new(windows), summary))
}
