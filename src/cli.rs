//! Command-line surface: a thin `analyze` subcommand over the pipeline.
//!
//! This is the crate's own demonstration harness, not the "command-line
//! invocation and plugin registration with a host optimizer pipeline"
//! that stays out of scope — a real deployment drives `analyze_module`
//! directly from its own pipeline.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// irtrace - data-dependency and provenance-path analyzer for typed SSA IR.
#[derive(Parser, Debug)]
#[command(name = "irtrace")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the full pipeline over one IR source file.
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to a textual IR source file.
    pub input: PathBuf,

    /// Deployment config (JSON) overlaying the default relevant-function
    /// table and path limits.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the config's process name.
    #[arg(long)]
    pub process_name: Option<String>,

    /// Directory `ddgedges.txt`/`prov_edges.txt` are written into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
