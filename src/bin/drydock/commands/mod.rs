//! Command implementations.

pub mod build;
pub mod check;
pub mod shell;

use std::path::PathBuf;

use anyhow::Result;

use drydock::PackageDescriptor;

/// Load the descriptor from an explicit path or by searching upward
/// from the current directory.
pub fn load_descriptor(explicit: Option<&PathBuf>) -> Result<PackageDescriptor> {
    let path = match explicit {
        Some(p) => p.clone(),
        None => {
            let cwd = std::env::current_dir()?;
            PackageDescriptor::find(&cwd)?
        }
    };
    PackageDescriptor::load(&path)
}
