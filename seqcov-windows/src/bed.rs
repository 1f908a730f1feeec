use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use seqcov_core::errors::ConfigError;
use seqcov_core::models::{Split, Window};
use seqcov_core::utils::{get_dynamic_reader, is_bed_header};

///
/// WindowSet struct, every labeled window of a run.
///
/// Windows are kept grouped by split (train, valid, test) so that each split
/// occupies one contiguous index range; shard ranges and coverage rows are
/// addressed by these indices.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowSet {
    pub windows: Vec<Window>,
}

impl WindowSet {
    /// Group windows by split, keeping their relative order within a split.
    pub fn new(mut windows: Vec<Window>) -> Self {
        windows.sort_by_key(|w| w.split);
        WindowSet { windows }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Window> {
        self.windows.iter()
    }

    /// Index range holding the windows of one split.
    pub fn split_range(&self, split: Split) -> Range<usize> {
        let start = self.windows.partition_point(|w| w.split < split);
        let end = self.windows.partition_point(|w| w.split <= split);
        start..end
    }

    /// Windows of one split.
    pub fn split(&self, split: Split) -> &[Window] {
        &self.windows[self.split_range(split)]
    }

    ///
    /// Write the windows as a 4-column BED file: `chrom start end split`.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    ///
    pub fn write_bed<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        for window in &self.windows {
            writeln!(writer, "{}", window.as_string())?;
        }
        writer.flush()
    }
}

impl TryFrom<&Path> for WindowSet {
    type Error = ConfigError;

    ///
    /// Read a windows BED file written by [WindowSet::write_bed].
    ///
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let display = value.display().to_string();
        let reader =
            get_dynamic_reader(value).map_err(|_| ConfigError::FileReadError(display.clone()))?;

        let mut windows = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if is_bed_header(&line) {
                continue;
            }

            let parse_error = |reason: String| ConfigError::ParseError {
                path: display.clone(),
                line: i + 1,
                reason,
            };

            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 4 {
                return Err(parse_error(format!(
                    "expected 4 columns, found {}",
                    parts.len()
                )));
            }

            let start = parts[1]
                .parse::<u32>()
                .map_err(|_| parse_error(format!("invalid start '{}'", parts[1])))?;
            let end = parts[2]
                .parse::<u32>()
                .map_err(|_| parse_error(format!("invalid end '{}'", parts[2])))?;
            if end <= start {
                return Err(parse_error(format!("empty window {}-{}", start, end)));
            }

            windows.push(Window {
                chr: parts[0].to_string(),
                start,
                end,
                split: parts[3].trim().parse()?,
            });
        }

        Ok(WindowSet::new(windows))
    }
}

impl TryFrom<PathBuf> for WindowSet {
    type Error = ConfigError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        WindowSet::try_from(value.as_path())
    }
}

impl<'a> IntoIterator for &'a WindowSet {
    type Item = &'a Window;
    type IntoIter = std::slice::Iter<'a, Window>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn window(chr: &str, start: u32, split: Split) -> Window {
        Window {
            chr: chr.to_string(),
            start,
            end: start + 100,
            split,
        }
    }

    #[fixture]
    fn window_set() -> WindowSet {
        WindowSet::new(vec![
            window("chr1", 0, Split::Test),
            window("chr1", 100, Split::Train),
            window("chr2", 0, Split::Valid),
            window("chr2", 100, Split::Train),
        ])
    }

    #[rstest]
    fn test_grouped_by_split(window_set: WindowSet) {
        assert_eq!(window_set.split_range(Split::Train), 0..2);
        assert_eq!(window_set.split_range(Split::Valid), 2..3);
        assert_eq!(window_set.split_range(Split::Test), 3..4);

        // relative order within a split is kept
        assert_eq!(window_set.split(Split::Train)[0].chr, "chr1");
        assert_eq!(window_set.split(Split::Train)[1].chr, "chr2");
    }

    #[rstest]
    fn test_empty_split_range() {
        let set = WindowSet::new(vec![window("chr1", 0, Split::Train)]);
        assert!(set.split_range(Split::Valid).is_empty());
        assert!(set.split(Split::Test).is_empty());
    }

    #[rstest]
    fn test_bed_roundtrip(window_set: WindowSet) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sequences.bed");

        window_set.write_bed(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("chr1\t100\t200\ttrain\n"));

        let reread = WindowSet::try_from(path.as_path()).unwrap();
        assert_eq!(reread, window_set);
    }

    #[rstest]
    fn test_read_bad_split_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.bed");
        std::fs::write(&path, "chr1\t0\t100\tholdout\n").unwrap();

        assert!(matches!(
            WindowSet::try_from(path.as_path()),
            Err(ConfigError::UnknownSplit(_))
        ));
    }
}
