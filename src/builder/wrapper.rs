//! Generic Cargo-wrapper backend.
//!
//! Does not consume the lock file; it receives only an explicit
//! build-scope restriction (the target package name within the workspace)
//! and emits artifacts under a fixed `release` path with no profile-name
//! variability.

use anyhow::Result;

use crate::builder::backend::{BackendId, BuildBackend, BuildContext, BuildTree};
use crate::builder::errors::BuildError;
use crate::builder::invoke::toolchain_build;

/// The generic wrapper backend.
pub struct WrapperBackend;

impl BuildBackend for WrapperBackend {
    fn id(&self) -> BackendId {
        BackendId::Wrapper
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<BuildTree> {
        toolchain_build(
            ctx,
            self.id(),
            &["build", "--release", "--package", &ctx.descriptor.name],
        )?;

        let release_dir = ctx.target_dir().join("release");
        if !release_dir.is_dir() {
            return Err(BuildError::AssemblyPathNotFound { path: release_dir }.into());
        }

        Ok(BuildTree {
            root: ctx.workspace_root().to_path_buf(),
            release_dir,
        })
    }
}
