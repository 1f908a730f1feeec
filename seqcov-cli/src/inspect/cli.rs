use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const INSPECT_CMD: &str = "inspect";

pub fn create_inspect_cli() -> Command {
    Command::new(INSPECT_CMD)
        .about("Describe a shard file, or every shard of a shard directory.")
        .arg(Arg::new("path").required(true).help("Shard file or shard directory"))
        .arg(
            arg!(--records <records>)
                .value_parser(value_parser!(usize))
                .help("Also print the first N records of a shard file"),
        )
        .arg(
            arg!(--rc)
                .action(ArgAction::SetTrue)
                .help("Print records reverse complemented, as augmentation would feed them"),
        )
}
