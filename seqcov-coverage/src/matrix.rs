use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Magic bytes at the start of every pooled-signal matrix file.
pub const MATRIX_HEADER: &[u8; 4] = b"SQCM";
pub const MATRIX_VERSION: u8 = 1;
/// magic + version + rows (u64) + cols (u32)
const HEADER_LEN: u64 = 4 + 1 + 8 + 4;

fn invalid_data(msg: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg)
}

///
/// Writes the pooled signal of one track, one row per window in window set
/// order.
///
pub struct MatrixWriter {
    writer: BufWriter<File>,
    rows: u64,
    cols: u32,
    written: u64,
}

impl MatrixWriter {
    ///
    /// Create the file and write its header.
    ///
    /// # Arguments
    /// - path: file to create, parent directories included
    /// - rows: number of windows
    /// - cols: bins per window
    ///
    pub fn create(path: &Path, rows: u64, cols: u32) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(MATRIX_HEADER)?;
        writer.write_u8(MATRIX_VERSION)?;
        writer.write_u64::<LittleEndian>(rows)?;
        writer.write_u32::<LittleEndian>(cols)?;

        Ok(MatrixWriter {
            writer,
            rows,
            cols,
            written: 0,
        })
    }

    pub fn write_row(&mut self, row: &[f32]) -> std::io::Result<()> {
        if row.len() != self.cols as usize {
            return Err(invalid_data(format!(
                "row has {} values, matrix has {} columns",
                row.len(),
                self.cols
            )));
        }
        for &value in row {
            self.writer.write_f32::<LittleEndian>(value)?;
        }
        self.written += 1;
        Ok(())
    }

    /// Flush the file, failing if fewer rows were written than announced.
    pub fn finish(mut self) -> std::io::Result<()> {
        if self.written != self.rows {
            return Err(invalid_data(format!(
                "wrote {} rows, expected {}",
                self.written, self.rows
            )));
        }
        self.writer.flush()
    }
}

///
/// Read access to a pooled-signal matrix file.
///
#[derive(Debug, Clone)]
pub struct CoverageMatrix {
    pub path: PathBuf,
    pub rows: u64,
    pub cols: u32,
}

impl CoverageMatrix {
    ///
    /// Open a matrix file and check its header.
    ///
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);

        let mut header = [0; 4];
        reader.read_exact(&mut header)?;
        if &header != MATRIX_HEADER {
            return Err(invalid_data(format!(
                "{} doesn't appear to be a coverage matrix file",
                path.display()
            )));
        }

        let version = reader.read_u8()?;
        if version != MATRIX_VERSION {
            return Err(invalid_data(format!(
                "unsupported coverage matrix version {}",
                version
            )));
        }

        let rows = reader.read_u64::<LittleEndian>()?;
        let cols = reader.read_u32::<LittleEndian>()?;

        Ok(CoverageMatrix {
            path: path.to_path_buf(),
            rows,
            cols,
        })
    }

    ///
    /// Read the rows of a window range, row-major.
    ///
    /// # Returns
    /// - `(range.end - range.start) * cols` values
    ///
    pub fn read_rows(&self, range: Range<usize>) -> std::io::Result<Vec<f32>> {
        if range.start > range.end || range.end as u64 > self.rows {
            return Err(invalid_data(format!(
                "rows {:?} outside matrix of {} rows",
                range, self.rows
            )));
        }

        let mut reader = BufReader::new(File::open(&self.path)?);
        let offset = HEADER_LEN + range.start as u64 * self.cols as u64 * 4;
        reader.seek(SeekFrom::Start(offset))?;

        let mut values = vec![0f32; range.len() * self.cols as usize];
        reader.read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }
}
