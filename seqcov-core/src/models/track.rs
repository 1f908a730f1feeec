use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::utils::get_dynamic_reader;

///
/// Statistic used to summarise the per-base values of one pooling bin.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SumStat {
    Sum,
    Mean,
    Max,
    Min,
    Median,
    /// `sqrt(1 + sum) - 1`, compresses high-count bins.
    SumSqrt,
}

impl FromStr for SumStat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(SumStat::Sum),
            "mean" => Ok(SumStat::Mean),
            "max" => Ok(SumStat::Max),
            "min" => Ok(SumStat::Min),
            "median" => Ok(SumStat::Median),
            "sum_sqrt" => Ok(SumStat::SumSqrt),
            _ => Err(ConfigError::UnknownSumStat(s.to_string())),
        }
    }
}

impl Display for SumStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SumStat::Sum => "sum",
            SumStat::Mean => "mean",
            SumStat::Max => "max",
            SumStat::Min => "min",
            SumStat::Median => "median",
            SumStat::SumSqrt => "sum_sqrt",
        };
        write!(f, "{}", name)
    }
}

///
/// Track struct, one signal source row of the track table.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub index: usize,
    pub identifier: String,
    pub file: PathBuf,
    /// Per-base ceiling. `None` disables clipping.
    pub clip: Option<f32>,
    /// Values above this threshold are compressed to `s + sqrt(x - s)`.
    pub clip_soft: Option<f32>,
    pub scale: f32,
    pub sum_stat: SumStat,
    pub description: String,
}

fn parse_threshold(raw: &str) -> Result<Option<f32>, String> {
    match raw.trim().to_lowercase().as_str() {
        "" | "." | "none" | "nan" => Ok(None),
        value => value
            .parse::<f32>()
            .map(Some)
            .map_err(|_| format!("invalid threshold '{}'", raw)),
    }
}

///
/// Read a tab-separated track table.
///
/// The first line is a header naming the columns. `identifier`, `file`,
/// `clip` and `sum_stat` are required; `index`, `clip_soft`, `scale` and
/// `description` are optional. An unnamed first column is treated as `index`.
///
/// # Arguments
/// - path: path to the table, optionally gzipped
///
pub fn read_track_table<P: AsRef<Path>>(path: P) -> Result<Vec<Track>, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let reader =
        get_dynamic_reader(path).map_err(|_| ConfigError::FileReadError(display.clone()))?;

    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(ConfigError::FileReadError(display)),
    };

    let columns: HashMap<String, usize> = header
        .split('\t')
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().to_lowercase();
            if i == 0 && name.is_empty() {
                ("index".to_string(), i)
            } else {
                (name, i)
            }
        })
        .collect();

    let column = |name: &'static str| columns.get(name).copied();
    let required = |name: &'static str| column(name).ok_or(ConfigError::MissingColumn(name));

    let identifier_col = required("identifier")?;
    let file_col = required("file")?;
    let clip_col = required("clip")?;
    let sum_stat_col = required("sum_stat")?;
    let index_col = column("index");
    let clip_soft_col = column("clip_soft");
    let scale_col = column("scale");
    let description_col = column("description");

    let mut tracks = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (offset, line) in lines.enumerate() {
        let line = line?;
        let line_number = offset + 2;
        if line.trim().is_empty() {
            continue;
        }

        let parse_error = |reason: String| ConfigError::ParseError {
            path: display.clone(),
            line: line_number,
            reason,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        let field = |col: usize| fields.get(col).map(|s| s.trim());
        let required_field = |col: usize, name: &str| {
            field(col).ok_or_else(|| parse_error(format!("missing {} field", name)))
        };

        let index = match index_col.and_then(field) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| parse_error(format!("invalid index '{}'", raw)))?,
            None => tracks.len(),
        };

        let identifier = required_field(identifier_col, "identifier")?.to_string();
        if !seen.insert(identifier.clone()) {
            return Err(ConfigError::DuplicateTrack(identifier));
        }

        let file = PathBuf::from(required_field(file_col, "file")?);
        let clip = parse_threshold(required_field(clip_col, "clip")?).map_err(parse_error)?;
        let clip_soft = match clip_soft_col.and_then(field) {
            Some(raw) => parse_threshold(raw).map_err(parse_error)?,
            None => None,
        };
        let scale = match scale_col.and_then(field) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<f32>()
                .map_err(|_| parse_error(format!("invalid scale '{}'", raw)))?,
            _ => 1.0,
        };
        let sum_stat = required_field(sum_stat_col, "sum_stat")?.parse::<SumStat>()?;
        let description = description_col
            .and_then(field)
            .unwrap_or_default()
            .to_string();

        tracks.push(Track {
            index,
            identifier,
            file,
            clip,
            clip_soft,
            scale,
            sum_stat,
            description,
        });
    }

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn write_table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[rstest]
    fn test_read_track_table() {
        let table = write_table(
            "\tidentifier\tfile\tclip\tsum_stat\tdescription\n\
             0\tCNhs11760\tdata/CNhs11760.bw\t384\tsum\taorta\n\
             1\tENCFF833POA\tdata/ENCFF833POA.bw\t32\tmean\tDNASE:cerebellum\n",
        );

        let tracks = read_track_table(table.path()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].identifier, "CNhs11760");
        assert_eq!(tracks[0].clip, Some(384.0));
        assert_eq!(tracks[0].sum_stat, SumStat::Sum);
        assert_eq!(tracks[0].scale, 1.0);
        assert_eq!(tracks[1].index, 1);
        assert_eq!(tracks[1].file, PathBuf::from("data/ENCFF833POA.bw"));
        assert_eq!(tracks[1].sum_stat, SumStat::Mean);
        assert_eq!(tracks[1].description, "DNASE:cerebellum");
    }

    #[rstest]
    fn test_read_track_table_optional_columns() {
        let table = write_table(
            "identifier\tfile\tclip\tclip_soft\tscale\tsum_stat\n\
             a\ta.bedGraph\t.\t16\t0.5\tsum_sqrt\n",
        );

        let tracks = read_track_table(table.path()).unwrap();
        assert_eq!(tracks[0].index, 0);
        assert_eq!(tracks[0].clip, None);
        assert_eq!(tracks[0].clip_soft, Some(16.0));
        assert_eq!(tracks[0].scale, 0.5);
        assert_eq!(tracks[0].sum_stat, SumStat::SumSqrt);
        assert_eq!(tracks[0].description, "");
    }

    #[rstest]
    fn test_read_track_table_missing_column() {
        let table = write_table("identifier\tfile\tsum_stat\na\ta.bw\tsum\n");
        assert!(matches!(
            read_track_table(table.path()),
            Err(ConfigError::MissingColumn("clip"))
        ));
    }

    #[rstest]
    fn test_read_track_table_bad_sum_stat() {
        let table = write_table("identifier\tfile\tclip\tsum_stat\na\ta.bw\t10\tmode\n");
        assert!(matches!(
            read_track_table(table.path()),
            Err(ConfigError::UnknownSumStat(_))
        ));
    }

    #[rstest]
    fn test_read_track_table_duplicate_identifier() {
        let table = write_table("identifier\tfile\tclip\tsum_stat\na\ta.bw\t10\tsum\na\tb.bw\t10\tsum\n");
        assert!(matches!(
            read_track_table(table.path()),
            Err(ConfigError::DuplicateTrack(_))
        ));
    }
}
