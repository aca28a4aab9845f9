//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use drydock::builder::BackendId;

/// Drydock - reproducible builds from a package descriptor
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: resolve, verify, compile, assemble
    Build(BuildArgs),

    /// Validate the descriptor and lock without building
    Check(CheckArgs),

    /// Enter a development shell with the declared toolchain
    Shell(ShellArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to Drydock.toml (defaults to searching parent directories)
    #[arg(long)]
    pub descriptor: Option<PathBuf>,

    /// Build backend (defaults to the descriptor's choice)
    #[arg(long, value_enum)]
    pub backend: Option<BackendId>,

    /// Output directory for the installed package
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Path to Drydock.toml (defaults to searching parent directories)
    #[arg(long)]
    pub descriptor: Option<PathBuf>,

    /// Also fetch git-pinned dependencies and verify their content hashes
    #[arg(long)]
    pub fetch: bool,
}

#[derive(Args)]
pub struct ShellArgs {
    /// Path to Drydock.toml (defaults to searching parent directories)
    #[arg(long)]
    pub descriptor: Option<PathBuf>,

    /// Print the environment instead of spawning a shell
    #[arg(long)]
    pub print_env: bool,
}
