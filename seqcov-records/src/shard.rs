use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::Serialize;

use seqcov_core::models::{SPLITS, Split};

use crate::encode::Encoding;
use crate::errors::ShardError;

/// Magic bytes at the start of every (decompressed) shard.
pub const SHARD_HEADER: &[u8; 4] = b"SQSH";
pub const SHARD_VERSION: u8 = 1;

///
/// Fixed layout of every record in a shard.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShardHeader {
    pub encoding: Encoding,
    /// Bases per record.
    pub seq_length: u32,
    /// Pooled bins per record.
    pub target_length: u32,
    pub num_targets: u32,
    pub num_records: u64,
}

impl ShardHeader {
    pub fn depth(&self) -> usize {
        self.encoding.depth()
    }

    /// Encoded sequence bytes per record.
    pub fn sequence_bytes(&self) -> usize {
        self.seq_length as usize * self.depth()
    }

    /// Target values per record.
    pub fn target_values(&self) -> usize {
        self.target_length as usize * self.num_targets as usize
    }
}

///
/// One training example: an encoded window sequence and its targets.
///
/// `targets` is position-major: the value of target `t` at bin `p` sits at
/// `p * num_targets + t`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ShardRecord {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub split: Split,
    pub sequence: Vec<u8>,
    pub targets: Vec<f32>,
}

///
/// Streams records into a zlib-compressed shard file.
///
pub struct ShardWriter {
    encoder: ZlibEncoder<BufWriter<File>>,
    header: ShardHeader,
    path: PathBuf,
    written: u64,
}

impl ShardWriter {
    ///
    /// Create the shard file and write its header.
    ///
    pub fn create(path: &Path, header: ShardHeader) -> Result<Self, ShardError> {
        let write_error = |source| ShardError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let file = File::create(path).map_err(write_error)?;
        let mut encoder = ZlibEncoder::new(BufWriter::new(file), Compression::default());

        (|| -> std::io::Result<()> {
            encoder.write_all(SHARD_HEADER)?;
            encoder.write_u8(SHARD_VERSION)?;
            encoder.write_u8(header.encoding.code())?;
            encoder.write_u32::<LittleEndian>(header.seq_length)?;
            encoder.write_u32::<LittleEndian>(header.depth() as u32)?;
            encoder.write_u32::<LittleEndian>(header.target_length)?;
            encoder.write_u32::<LittleEndian>(header.num_targets)?;
            encoder.write_u64::<LittleEndian>(header.num_records)
        })()
        .map_err(write_error)?;

        Ok(ShardWriter {
            encoder,
            header,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    fn format_error(&self, reason: String) -> ShardError {
        ShardError::Format {
            path: self.path.display().to_string(),
            reason,
        }
    }

    pub fn write_record(&mut self, record: &ShardRecord) -> Result<(), ShardError> {
        if record.sequence.len() != self.header.sequence_bytes() {
            return Err(self.format_error(format!(
                "sequence of {}:{}-{} has {} bytes, expected {}",
                record.chrom,
                record.start,
                record.end,
                record.sequence.len(),
                self.header.sequence_bytes()
            )));
        }
        if record.targets.len() != self.header.target_values() {
            return Err(self.format_error(format!(
                "targets of {}:{}-{} have {} values, expected {}",
                record.chrom,
                record.start,
                record.end,
                record.targets.len(),
                self.header.target_values()
            )));
        }
        if record.chrom.len() > u16::MAX as usize {
            return Err(self.format_error(format!("chromosome name too long: {}", record.chrom)));
        }

        let encoder = &mut self.encoder;
        (|| -> std::io::Result<()> {
            encoder.write_u16::<LittleEndian>(record.chrom.len() as u16)?;
            encoder.write_all(record.chrom.as_bytes())?;
            encoder.write_u32::<LittleEndian>(record.start)?;
            encoder.write_u32::<LittleEndian>(record.end)?;
            encoder.write_u8(record.split.index() as u8)?;
            encoder.write_all(&record.sequence)?;
            for &value in &record.targets {
                encoder.write_f32::<LittleEndian>(value)?;
            }
            Ok(())
        })()
        .map_err(|source| ShardError::Write {
            path: self.path.display().to_string(),
            source,
        })?;

        self.written += 1;
        Ok(())
    }

    /// Finish the compressed stream. Fails if the record count does not
    /// match the header.
    pub fn finish(self) -> Result<u64, ShardError> {
        if self.written != self.header.num_records {
            return Err(self.format_error(format!(
                "wrote {} records, header announces {}",
                self.written, self.header.num_records
            )));
        }

        let path = self.path.display().to_string();
        self.encoder
            .finish()
            .and_then(|mut writer| writer.flush())
            .map_err(|source| ShardError::Write { path, source })?;

        Ok(self.written)
    }
}

///
/// Reads records back from a shard file.
///
pub struct ShardReader {
    decoder: ZlibDecoder<BufReader<File>>,
    header: ShardHeader,
    path: PathBuf,
    read: u64,
}

impl ShardReader {
    pub fn open(path: &Path) -> Result<Self, ShardError> {
        let display = path.display().to_string();
        let read_error = |source| ShardError::Read {
            path: display.clone(),
            source,
        };
        let format_error = |reason: String| ShardError::Format {
            path: display.clone(),
            reason,
        };

        let file = File::open(path).map_err(read_error)?;
        let mut decoder = ZlibDecoder::new(BufReader::new(file));

        let mut magic = [0; 4];
        decoder.read_exact(&mut magic).map_err(read_error)?;
        if &magic != SHARD_HEADER {
            return Err(format_error("not a shard file".to_string()));
        }

        let version = decoder.read_u8().map_err(read_error)?;
        if version != SHARD_VERSION {
            return Err(format_error(format!("unsupported version {}", version)));
        }

        let code = decoder.read_u8().map_err(read_error)?;
        let encoding = Encoding::from_code(code)
            .ok_or_else(|| format_error(format!("unknown encoding code {}", code)))?;
        let seq_length = decoder.read_u32::<LittleEndian>().map_err(read_error)?;
        let depth = decoder.read_u32::<LittleEndian>().map_err(read_error)?;
        if depth as usize != encoding.depth() {
            return Err(format_error(format!(
                "depth {} does not match {} encoding",
                depth, encoding
            )));
        }
        let target_length = decoder.read_u32::<LittleEndian>().map_err(read_error)?;
        let num_targets = decoder.read_u32::<LittleEndian>().map_err(read_error)?;
        let num_records = decoder.read_u64::<LittleEndian>().map_err(read_error)?;

        Ok(ShardReader {
            decoder,
            header: ShardHeader {
                encoding,
                seq_length,
                target_length,
                num_targets,
                num_records,
            },
            path: path.to_path_buf(),
            read: 0,
        })
    }

    pub fn header(&self) -> &ShardHeader {
        &self.header
    }

    fn read_record(&mut self) -> Result<ShardRecord, ShardError> {
        let display = self.path.display().to_string();
        let header = self.header;
        let decoder = &mut self.decoder;

        let record = (|| -> std::io::Result<(String, u32, u32, u8, Vec<u8>, Vec<f32>)> {
            let name_len = decoder.read_u16::<LittleEndian>()? as usize;
            let mut name = vec![0u8; name_len];
            decoder.read_exact(&mut name)?;
            let start = decoder.read_u32::<LittleEndian>()?;
            let end = decoder.read_u32::<LittleEndian>()?;
            let split = decoder.read_u8()?;
            let mut sequence = vec![0u8; header.sequence_bytes()];
            decoder.read_exact(&mut sequence)?;
            let mut targets = vec![0f32; header.target_values()];
            decoder.read_f32_into::<LittleEndian>(&mut targets)?;
            Ok((
                String::from_utf8_lossy(&name).into_owned(),
                start,
                end,
                split,
                sequence,
                targets,
            ))
        })()
        .map_err(|source| ShardError::Read {
            path: display.clone(),
            source,
        })?;

        let (chrom, start, end, split, sequence, targets) = record;
        let split = *SPLITS
            .get(split as usize)
            .ok_or_else(|| ShardError::Format {
                path: display,
                reason: format!("unknown split code {}", split),
            })?;

        Ok(ShardRecord {
            chrom,
            start,
            end,
            split,
            sequence,
            targets,
        })
    }
}

impl Iterator for ShardReader {
    type Item = Result<ShardRecord, ShardError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.read >= self.header.num_records {
            return None;
        }
        self.read += 1;
        Some(self.read_record())
    }
}

///
/// Count the records of a shard by decoding all of them. A truncated or
/// corrupt shard is an error.
///
pub fn count_records(path: &Path) -> Result<u64, ShardError> {
    let mut reader = ShardReader::open(path)?;
    let mut count = 0;
    for record in reader.by_ref() {
        record?;
        count += 1;
    }

    // nothing may follow the last record
    let mut trailing = [0u8; 1];
    match reader.decoder.read(&mut trailing) {
        Ok(0) => Ok(count),
        Ok(_) => Err(ShardError::Format {
            path: path.display().to_string(),
            reason: "trailing data after the last record".to_string(),
        }),
        Err(source) => Err(ShardError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}
