//! Output assembly - from build tree to installable package.
//!
//! The installed layout is `bin/<name>` plus, when the backend produced
//! one, a `share/` directory copied verbatim. Older backend variants emit
//! no `share`; its absence is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::backend::BuildTree;
use crate::builder::errors::BuildError;
use crate::util::fs::{copy_dir_all, ensure_dir};

/// The assembled, installable output.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// The installed binary at `bin/<name>`
    pub binary_path: PathBuf,

    /// The installed `share/` directory, if the backend produced one
    pub share_dir: Option<PathBuf>,
}

/// Assemble the final output from a completed build tree.
pub fn assemble(tree: &BuildTree, package_name: &str, out_dir: &Path) -> Result<OutputArtifact> {
    let built = find_binary(&tree.release_dir, package_name)?;

    let bin_dir = out_dir.join("bin");
    ensure_dir(&bin_dir)?;
    let binary_path = bin_dir.join(package_name);
    std::fs::copy(&built, &binary_path).with_context(|| {
        format!(
            "failed to install {} to {}",
            built.display(),
            binary_path.display()
        )
    })?;
    make_executable(&binary_path)?;

    let share_dir = match find_share_dir(tree) {
        Some(src) => {
            let dst = out_dir.join("share");
            copy_dir_all(&src, &dst)?;
            tracing::info!("installed share data from {}", src.display());
            Some(dst)
        }
        None => {
            tracing::debug!("no share directory produced; skipping");
            None
        }
    };

    tracing::info!("installed {}", binary_path.display());
    Ok(OutputArtifact {
        binary_path,
        share_dir,
    })
}

/// Locate the compiled binary in the release directory.
fn find_binary(release_dir: &Path, package_name: &str) -> Result<PathBuf> {
    let candidates = [
        release_dir.join(package_name),
        release_dir.join(format!("{}.exe", package_name)),
    ];
    for candidate in &candidates {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }
    Err(BuildError::AssemblyPathNotFound {
        path: release_dir.join(package_name),
    }
    .into())
}

/// Probe for the auxiliary `share` directory. Backend versions differ in
/// where (and whether) they emit it.
fn find_share_dir(tree: &BuildTree) -> Option<PathBuf> {
    for candidate in [tree.release_dir.join("share"), tree.root.join("share")] {
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    None
}

fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
