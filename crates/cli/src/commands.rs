use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sqlsight")]
#[command(about = "Interactive SQL analysis: scan, parse, analyze and complete", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Raise the log level to debug, overriding `SQLSIGHT_LOG`.
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Parse a script and print its statement/node counts")]
    Parse(ParseArgs),
    #[command(about = "Print pipeline stage statistics for a script")]
    Stats(StatsArgs),
    #[command(about = "Print ranked completion candidates at a byte offset")]
    Complete(CompleteArgs),
}

#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// Path to a SQL script. Use `-` to read from stdin.
    pub path: PathBuf,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Path to a SQL script. Use `-` to read from stdin.
    pub path: PathBuf,
}

#[derive(Debug, Parser)]
pub struct CompleteArgs {
    /// Path to a SQL script. Use `-` to read from stdin.
    pub path: PathBuf,
    /// Byte offset of the cursor.
    #[arg(long)]
    pub offset: u32,
    /// Maximum number of candidates to print.
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}
