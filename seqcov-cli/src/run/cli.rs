use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const RUN_CMD: &str = "run";

///
/// Windowing and split arguments, shared by `run` and `windows`.
///
pub fn with_layout_args(command: Command) -> Command {
    command
        .arg(arg!(--config <config>).help("TOML config; flags given here override it"))
        .arg(
            arg!(--"chrom-sizes" <chrom_sizes>)
                .help("Chromosome lengths (.fai or chrom sizes); read from the FASTA index when absent"),
        )
        .arg(arg!(-m --mask <mask>).help("BED of unmappable regions to exclude"))
        .arg(
            arg!(-l --"seq-length" <seq_length>)
                .value_parser(value_parser!(u32))
                .help("Window length in bp"),
        )
        .arg(
            arg!(--stride <stride>)
                .value_parser(value_parser!(u32))
                .help("Distance between window starts; defaults to the window length"),
        )
        .arg(
            arg!(-w --"pool-width" <pool_width>)
                .value_parser(value_parser!(u32))
                .help("Width of pooling bins; must divide the window length"),
        )
        .arg(
            arg!(-s --sample <sample>)
                .value_parser(value_parser!(f64))
                .help("Fraction of windows to keep"),
        )
        .arg(arg!(--seed <seed>).value_parser(value_parser!(u64)))
        .arg(
            arg!(--snap <snap>)
                .value_parser(value_parser!(u32))
                .help("Round window starts up to a multiple of this value"),
        )
        .arg(
            arg!(--"break" <break_length>)
                .value_parser(value_parser!(u32))
                .help("Halve contigs longer than this"),
        )
        .arg(
            arg!(--valid <valid>)
                .value_parser(value_parser!(f64))
                .help("Fraction of windows for the validation split"),
        )
        .arg(
            arg!(--test <test>)
                .value_parser(value_parser!(f64))
                .help("Fraction of windows for the test split"),
        )
        .arg(
            arg!(--"valid-chroms" <valid_chroms>)
                .value_delimiter(',')
                .help("Chromosomes always assigned to the validation split"),
        )
        .arg(
            arg!(--"test-chroms" <test_chroms>)
                .value_delimiter(',')
                .help("Chromosomes always assigned to the test split"),
        )
}

pub fn create_run_cli() -> Command {
    let command = Command::new(RUN_CMD)
        .about("Window the genome, aggregate every track and write sharded training records.")
        .arg(Arg::new("fasta").help("Genome FASTA"))
        .arg(Arg::new("targets").help("Track table (TSV)"))
        .arg(arg!(-o --"out-dir" <out_dir>).help("Output directory"))
        .arg(
            arg!(-p --processes <processes>)
                .value_parser(value_parser!(usize))
                .help("Worker threads"),
        )
        .arg(
            arg!(--encoding <encoding>)
                .value_parser(["one_hot", "index"])
                .help("Sequence encoding"),
        )
        .arg(
            arg!(--"shard-size" <shard_size>)
                .value_parser(value_parser!(usize))
                .help("Windows per shard"),
        )
        .arg(
            arg!(--strict)
                .action(ArgAction::SetTrue)
                .help("Fail a shard on unknown nucleotides instead of encoding them as N"),
        );

    with_layout_args(command)
}
