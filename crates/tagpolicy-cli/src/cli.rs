use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tagpolicy",
    about = "Select the latest image tag by policy and reflect its digest",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the latest tag for an image policy
    Evaluate(EvaluateArgs),
    /// Validate an image policy without evaluating it
    Check(CheckArgs),
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// Image policy (TOML)
    #[arg(long)]
    pub policy: PathBuf,
    /// Observed tags and digests (JSON)
    #[arg(long)]
    pub tags: PathBuf,
    /// Status persisted by the previous evaluation (JSON)
    #[arg(long)]
    pub status: Option<PathBuf>,
    /// Write the new status back to the --status file
    #[arg(long, requires = "status")]
    pub write_status: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Image policy (TOML)
    #[arg(long)]
    pub policy: PathBuf,
}
