//! Command-line driver over the `sqlsight-engine` pipeline.

use clap::Parser as _;

use crate::commands::{Cli, Commands};

pub mod commands;
mod commands_complete;
mod commands_parse;
mod commands_stats;
mod input;
mod logger;

pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let _ = logger::init(cli.verbose);

    match &cli.command {
        Commands::Parse(args) => commands_parse::run(args),
        Commands::Stats(args) => commands_stats::run(args),
        Commands::Complete(args) => commands_complete::run(args),
    }
}
