use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use seqcov_core::models::SPLITS;
use seqcov_records::augment::reverse_complement_record;
use seqcov_records::{
    ShardHeader, ShardReader, ShardRecord, count_records, decode_sequence, discover_shards,
};

const PREVIEW: usize = 16;

fn preview<T: std::fmt::Display>(
    values: impl Iterator<Item = T>,
    total: usize,
    separator: &str,
) -> String {
    let shown: Vec<String> = values.take(PREVIEW).map(|v| v.to_string()).collect();
    if total > PREVIEW {
        format!("{}...", shown.join(separator))
    } else {
        shown.join(separator)
    }
}

///
/// One line per record: coordinates, split, strand, then the first bases and
/// target values.
///
fn format_record(mut record: ShardRecord, header: &ShardHeader, rc: bool) -> Result<String> {
    if rc {
        reverse_complement_record(&mut record, header.encoding, header.num_targets as usize);
    }
    let sequence = decode_sequence(&record.sequence, header.encoding)?;
    let bases = preview(sequence.iter().map(|&b| b as char), sequence.len(), "");

    Ok(format!(
        "{}:{}-{}\t{}\t{}\t{}\t{}",
        record.chrom,
        record.start,
        record.end,
        record.split,
        if rc { '-' } else { '+' },
        bases,
        preview(record.targets.iter(), record.targets.len(), ",")
    ))
}

fn describe_shard(path: &Path, records: usize, rc: bool) -> Result<()> {
    let reader =
        ShardReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let header = *reader.header();

    println!("{}", path.display());
    println!("  encoding:      {}", header.encoding);
    println!("  seq length:    {}", header.seq_length);
    println!("  target length: {}", header.target_length);
    println!("  targets:       {}", header.num_targets);
    println!("  records:       {}", header.num_records);

    for record in reader.take(records) {
        println!("  {}", format_record(record?, &header, rc)?);
    }

    let found = count_records(path)?;
    if found != header.num_records {
        anyhow::bail!(
            "{} holds {} records, header announces {}",
            path.display(),
            found,
            header.num_records
        );
    }
    Ok(())
}

fn describe_dir(dir: &Path) -> Result<()> {
    for split in SPLITS {
        let shards = discover_shards(dir, split);
        let mut total = 0;
        for shard in &shards {
            total += count_records(shard)
                .with_context(|| format!("Failed to read {}", shard.display()))?;
        }
        println!("{}\t{} shards\t{} records", split, shards.len(), total);
    }
    Ok(())
}

pub fn run_inspect(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .context("A shard path is required")?;
    let records = matches.get_one::<usize>("records").copied().unwrap_or(0);
    let rc = matches.get_flag("rc");

    let path = Path::new(path);
    if path.is_dir() {
        describe_dir(path)
    } else {
        describe_shard(path, records, rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqcov_core::models::Split;
    use seqcov_records::{Encoding, ShardWriter, shard_path};

    use crate::inspect::cli::create_inspect_cli;

    fn write_shard(dir: &Path, index: usize, records: u32) {
        let header = ShardHeader {
            encoding: Encoding::Index,
            seq_length: 4,
            target_length: 1,
            num_targets: 1,
            num_records: records as u64,
        };
        let mut writer =
            ShardWriter::create(&shard_path(dir, Split::Valid, index), header).unwrap();
        for i in 0..records {
            writer
                .write_record(&ShardRecord {
                    chrom: "chr2".to_string(),
                    start: i * 4,
                    end: i * 4 + 4,
                    split: Split::Valid,
                    sequence: vec![0, 1, 2, 3],
                    targets: vec![i as f32],
                })
                .unwrap();
        }
        writer.finish().unwrap();
    }

    #[rstest]
    fn test_inspect_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_shard(dir.path(), 0, 3);
        write_shard(dir.path(), 1, 2);

        let file = shard_path(dir.path(), Split::Valid, 0);
        let matches = create_inspect_cli()
            .try_get_matches_from(["inspect", file.to_str().unwrap(), "--records", "2"])
            .unwrap();
        assert!(run_inspect(&matches).is_ok());

        let matches = create_inspect_cli()
            .try_get_matches_from(["inspect", dir.path().to_str().unwrap()])
            .unwrap();
        assert!(run_inspect(&matches).is_ok());
    }

    #[rstest]
    fn test_inspect_reverse_complement() {
        let dir = tempfile::tempdir().unwrap();
        write_shard(dir.path(), 0, 1);

        let file = shard_path(dir.path(), Split::Valid, 0);
        let matches = create_inspect_cli()
            .try_get_matches_from(["inspect", file.to_str().unwrap(), "--records", "1", "--rc"])
            .unwrap();
        assert!(run_inspect(&matches).is_ok());
    }

    #[rstest]
    #[case(false, "chr1:8-12\tvalid\t+\tACGN\t1,2")]
    #[case(true, "chr1:8-12\tvalid\t-\tNCGT\t2,1")]
    fn test_format_record(#[case] rc: bool, #[case] expected: &str) {
        let header = ShardHeader {
            encoding: Encoding::Index,
            seq_length: 4,
            target_length: 2,
            num_targets: 1,
            num_records: 1,
        };
        let record = ShardRecord {
            chrom: "chr1".to_string(),
            start: 8,
            end: 12,
            split: Split::Valid,
            sequence: vec![0, 1, 2, 4],
            targets: vec![1.0, 2.0],
        };

        assert_eq!(format_record(record, &header, rc).unwrap(), expected);
    }

    #[rstest]
    fn test_format_record_truncates_long_records() {
        let header = ShardHeader {
            encoding: Encoding::Index,
            seq_length: 20,
            target_length: 20,
            num_targets: 1,
            num_records: 1,
        };
        let record = ShardRecord {
            chrom: "chr1".to_string(),
            start: 0,
            end: 20,
            split: Split::Train,
            sequence: vec![0; 20],
            targets: vec![0.5; 20],
        };

        let line = format_record(record, &header, false).unwrap();
        assert!(line.contains(&format!("\t{}...\t", "A".repeat(PREVIEW))));
        assert!(line.ends_with("0.5..."));
    }

    #[rstest]
    fn test_inspect_corrupt_shard() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("train-0.shard");
        std::fs::write(&file, b"not a shard").unwrap();

        let matches = create_inspect_cli()
            .try_get_matches_from(["inspect", file.to_str().unwrap()])
            .unwrap();
        assert!(run_inspect(&matches).is_err());
    }
}
