//! Drydock CLI - reproducible builds from a package descriptor.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drydock::builder::BuildError;
use drydock::resolver::ResolveError;
use drydock::util::diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        report_error(&e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("drydock=debug")
    } else {
        EnvFilter::new("drydock=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Shell(args) => commands::shell::execute(args),
    }
}

/// Render pipeline errors as diagnostics with suggestions; everything
/// else gets the plain anyhow chain.
fn report_error(e: &anyhow::Error) {
    if let Some(err) = e.downcast_ref::<ResolveError>() {
        diagnostic::emit(&err.to_diagnostic());
    } else if let Some(err) = e.downcast_ref::<BuildError>() {
        diagnostic::emit(&err.to_diagnostic());
    } else {
        eprintln!("error: {:#}", e);
    }
}
