use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;

use seqcov_core::consts::SHARD_EXT;
use seqcov_core::models::{SPLITS, Split};
use seqcov_windows::WindowSet;

/// File name of shard `index` of a split, e.g. `train-0.shard`.
pub fn shard_name(split: Split, index: usize) -> String {
    format!("{}-{}.{}", split, index, SHARD_EXT)
}

pub fn shard_path(dir: &Path, split: Split, index: usize) -> PathBuf {
    dir.join(shard_name(split, index))
}

///
/// Find the shards of a split in index order: `split-0`, `split-1`, ...
/// stopping at the first index that has no file.
///
pub fn discover_shards(dir: &Path, split: Split) -> Vec<PathBuf> {
    (0..)
        .map(|index| shard_path(dir, split, index))
        .take_while(|path| path.is_file())
        .collect()
}

///
/// One unit of writing work: a contiguous window range of a single split.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardPlan {
    pub split: Split,
    /// Index of the shard within its split.
    pub index: usize,
    /// Window indices covered, in [WindowSet] order.
    pub range: Range<usize>,
}

impl ShardPlan {
    pub fn name(&self) -> String {
        shard_name(self.split, self.index)
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

///
/// Cut every split into consecutive shards of at most `shard_size` windows.
/// The ranges are disjoint and together cover every window exactly once.
///
pub fn plan_shards(windows: &WindowSet, shard_size: usize) -> Vec<ShardPlan> {
    let shard_size = shard_size.max(1);
    let mut plans = Vec::new();

    for split in SPLITS {
        let range = windows.split_range(split);
        let mut start = range.start;
        let mut index = 0;
        while start < range.end {
            let end = (start + shard_size).min(range.end);
            plans.push(ShardPlan {
                split,
                index,
                range: start..end,
            });
            start = end;
            index += 1;
        }
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqcov_core::models::Window;

    fn windows(train: usize, valid: usize, test: usize) -> WindowSet {
        let mut all = Vec::new();
        for (split, n) in [(Split::Train, train), (Split::Valid, valid), (Split::Test, test)] {
            for i in 0..n as u32 {
                all.push(Window {
                    chr: "chr1".to_string(),
                    start: i * 10,
                    end: i * 10 + 10,
                    split,
                });
            }
        }
        WindowSet::new(all)
    }

    #[rstest]
    fn test_shard_name() {
        assert_eq!(shard_name(Split::Valid, 3), "valid-3.shard");
    }

    #[rstest]
    fn test_plan_shards() {
        let plans = plan_shards(&windows(600, 10, 0), 256);
        let summary: Vec<(Split, usize, Range<usize>)> = plans
            .iter()
            .map(|p| (p.split, p.index, p.range.clone()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (Split::Train, 0, 0..256),
                (Split::Train, 1, 256..512),
                (Split::Train, 2, 512..600),
                (Split::Valid, 0, 600..610),
            ]
        );
        assert_eq!(plans.iter().map(|p| p.len()).sum::<usize>(), 610);
    }

    #[rstest]
    fn test_discovery_stops_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        for index in [0, 1, 2, 4] {
            std::fs::write(shard_path(dir.path(), Split::Train, index), b"").unwrap();
        }
        std::fs::write(shard_path(dir.path(), Split::Test, 1), b"").unwrap();

        let names: Vec<String> = discover_shards(dir.path(), Split::Train)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["train-0.shard", "train-1.shard", "train-2.shard"]);
        assert!(discover_shards(dir.path(), Split::Test).is_empty());
    }
}
