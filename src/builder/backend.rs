//! Build backend dispatch.
//!
//! The two backends are a small closed set of tagged variants behind one
//! `build(ctx) -> BuildTree` capability. Each variant owns its own
//! release-path-discovery rule, isolating backend-version drift in the
//! release path shape to one function.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::errors::BuildError;
use crate::builder::registry::RegistryBackend;
use crate::builder::tools::Toolchain;
use crate::builder::wrapper::WrapperBackend;
use crate::core::descriptor::PackageDescriptor;
use crate::core::lock::LockManifest;

/// Identifies a build backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Registry-integrated backend: consumes the lock manifest and the
    /// override table directly, re-resolving before it compiles.
    Registry,

    /// Generic Cargo-wrapper backend: receives only a build-scope
    /// restriction (the package name) and a fixed release path.
    Wrapper,
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendId::Registry => write!(f, "registry"),
            BackendId::Wrapper => write!(f, "wrapper"),
        }
    }
}

/// Invocation context passed to a backend. All capabilities (tool paths,
/// lock, overrides) are injected explicitly; backends perform no ambient
/// lookups.
pub struct BuildContext<'a> {
    /// The package descriptor under build
    pub descriptor: &'a PackageDescriptor,

    /// The parsed lock manifest
    pub lock: &'a LockManifest,

    /// Resolved tool paths
    pub toolchain: &'a Toolchain,
}

impl<'a> BuildContext<'a> {
    /// The workspace root.
    pub fn workspace_root(&self) -> &Path {
        self.descriptor.root()
    }

    /// The toolchain output directory.
    pub fn target_dir(&self) -> PathBuf {
        self.descriptor.root().join("target")
    }
}

/// A completed backend build: the build tree root and the discovered
/// release directory holding compiled artifacts.
#[derive(Debug, Clone)]
pub struct BuildTree {
    /// Build tree root (the workspace root)
    pub root: PathBuf,

    /// Release directory containing the compiled binary
    pub release_dir: PathBuf,
}

/// A pluggable strategy turning a package descriptor into a compiled
/// build tree.
pub trait BuildBackend {
    /// This backend's identity.
    fn id(&self) -> BackendId;

    /// Run the build. Invocation failures are fatal and non-retried.
    fn build(&self, ctx: &BuildContext<'_>) -> Result<BuildTree>;
}

/// Select the backend implementation for an identifier.
pub fn backend_for(id: BackendId) -> Box<dyn BuildBackend> {
    match id {
        BackendId::Registry => Box::new(RegistryBackend),
        BackendId::Wrapper => Box::new(WrapperBackend),
    }
}

/// Discover the release directory under a target dir.
///
/// Toolchain versions differ in release path shape: some emit straight to
/// `target/release`, others under `target/<triple>/release`. Probe the
/// fixed candidate first, then search one level of subdirectories, taking
/// the lexicographically first match for determinism.
pub fn discover_release_dir(target_dir: &Path) -> Result<PathBuf> {
    let fixed = target_dir.join("release");
    if fixed.is_dir() {
        return Ok(fixed);
    }

    let mut candidates = Vec::new();
    if target_dir.is_dir() {
        for entry in std::fs::read_dir(target_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let candidate = entry.path().join("release");
                if candidate.is_dir() {
                    candidates.push(candidate);
                }
            }
        }
    }
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| BuildError::AssemblyPathNotFound { path: fixed }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_fixed_release_dir() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir_all(target.join("release")).unwrap();

        let found = discover_release_dir(&target).unwrap();
        assert_eq!(found, target.join("release"));
    }

    #[test]
    fn test_discover_triple_release_dir() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir_all(target.join("x86_64-unknown-linux-gnu/release")).unwrap();

        let found = discover_release_dir(&target).unwrap();
        assert_eq!(found, target.join("x86_64-unknown-linux-gnu/release"));
    }

    #[test]
    fn test_fixed_release_dir_wins_over_triple() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir_all(target.join("release")).unwrap();
        std::fs::create_dir_all(target.join("x86_64-unknown-linux-gnu/release")).unwrap();

        let found = discover_release_dir(&target).unwrap();
        assert_eq!(found, target.join("release"));
    }

    #[test]
    fn test_missing_release_dir_is_assembly_error() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir_all(&target).unwrap();

        let err = discover_release_dir(&target).unwrap_err();
        let build_err = err.downcast::<BuildError>().unwrap();
        assert!(matches!(build_err, BuildError::AssemblyPathNotFound { .. }));
    }

    #[test]
    fn test_backend_id_display_roundtrip() {
        assert_eq!(BackendId::Registry.to_string(), "registry");
        assert_eq!(BackendId::Wrapper.to_string(), "wrapper");
    }
}
