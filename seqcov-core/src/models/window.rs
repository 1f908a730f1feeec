use std::fmt::{self, Display};

use crate::models::split::Split;

///
/// Contig struct, a maximal mappable span of one chromosome.
///
/// Coordinates are 0-based and half-open.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Contig {
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl Contig {
    pub fn new(chr: &str, start: u32, end: u32) -> Self {
        Contig {
            chr: chr.to_string(),
            start,
            end,
        }
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }
}

impl Display for Contig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}

///
/// Window struct, one fixed-length training example.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Window {
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub split: Split,
}

impl Window {
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    ///
    /// Get the windows-file line of the Window
    ///
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.chr, self.start, self.end, self.split)
    }

    /// Whether the window lies inside the given contig.
    pub fn within(&self, contig: &Contig) -> bool {
        self.chr == contig.chr && self.start >= contig.start && self.end <= contig.end
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_window_as_string() {
        let window = Window {
            chr: "chr1".to_string(),
            start: 100,
            end: 228,
            split: Split::Valid,
        };
        assert_eq!(window.as_string(), "chr1\t100\t228\tvalid");
        assert_eq!(window.width(), 128);
    }

    #[rstest]
    fn test_window_within_contig() {
        let contig = Contig::new("chr2", 1_000, 5_000);
        let inside = Window {
            chr: "chr2".to_string(),
            start: 1_000,
            end: 5_000,
            split: Split::Train,
        };
        let other_chrom = Window {
            chr: "chr3".to_string(),
            ..inside.clone()
        };
        let overhanging = Window {
            end: 5_001,
            ..inside.clone()
        };

        assert!(inside.within(&contig));
        assert!(!other_chrom.within(&contig));
        assert!(!overhanging.within(&contig));
        assert_eq!(contig.to_string(), "chr2:1000-5000");
    }
}
