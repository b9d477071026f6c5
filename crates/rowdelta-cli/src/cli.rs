use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rowdelta",
    about = "rowdelta: diff and verify table snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Harness config (TOML) naming where failed checks are logged
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show rows removed and added between two snapshots
    Diff(DiffArgs),
    /// Check that two snapshots differ by exactly the claimed rows
    Verify(VerifyArgs),
    /// List the distinct rows of a snapshot with their multiplicity
    Show(ShowArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Snapshot before the change
    pub old: PathBuf,
    /// Snapshot after the change
    pub new: PathBuf,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Snapshot before the change
    pub old: PathBuf,
    /// Snapshot after the change
    pub new: PathBuf,
    /// Snapshot holding the rows claimed as removed
    #[arg(long)]
    pub removed: Option<PathBuf>,
    /// Snapshot holding the rows claimed as added
    #[arg(long)]
    pub added: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
}
