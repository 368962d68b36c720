use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wfd", about = "Structural diff for workflows", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two workflow snapshots
    Compare(CompareArgs),
    /// Show the node sequences of every nesting level
    Sequences(SequencesArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    /// TOML file with alignment settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Hide nodes without real differences
    #[arg(long)]
    pub changes_only: bool,
}

#[derive(Args)]
pub struct SequencesArgs {
    pub file: PathBuf,
}
