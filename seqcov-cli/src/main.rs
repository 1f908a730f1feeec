mod inspect;
mod run;
mod windows;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "seqcov";
    pub const BIN_NAME: &str = "seqcov";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Prepare genome windows, pooled signal targets and sharded training records for sequence-to-signal models.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides."),
        )
        .subcommand(run::cli::create_run_cli())
        .subcommand(windows::cli::create_windows_cli())
        .subcommand(inspect::cli::create_inspect_cli())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        //
        // FULL RUN
        //
        Some((run::cli::RUN_CMD, matches)) => {
            run::handlers::run_pipeline(matches)?;
        }

        //
        // WINDOWS ONLY
        //
        Some((windows::cli::WINDOWS_CMD, matches)) => {
            windows::handlers::run_windows(matches)?;
        }

        //
        // SHARD INSPECTION
        //
        Some((inspect::cli::INSPECT_CMD, matches)) => {
            inspect::handlers::run_inspect(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_verbosity_is_global() {
        let matches = build_parser()
            .try_get_matches_from(["seqcov", "inspect", "shards", "-vv"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
