use clap::{Arg, Command, arg};

use crate::run::cli::with_layout_args;

pub const WINDOWS_CMD: &str = "windows";

pub fn create_windows_cli() -> Command {
    let command = Command::new(WINDOWS_CMD)
        .about("Window the genome and assign splits, writing only the windows BED.")
        .arg(Arg::new("fasta").help("Genome FASTA; not needed with --chrom-sizes"))
        .arg(arg!(--output <output>).help("Windows BED to write"));

    with_layout_args(command)
}
