//! Registry-integrated backend.
//!
//! Consumes the lock manifest plus the override table directly: resolution
//! runs again immediately before compiling, so a descriptor edit between
//! pipeline stages can never slip an unpinned source past the build. The
//! toolchain is invoked lock-aware (`--locked`) and the release path is
//! discovered, not hard-coded, because toolchain versions differ in
//! profile directory shape.

use anyhow::Result;

use crate::builder::backend::{
    discover_release_dir, BackendId, BuildBackend, BuildContext, BuildTree,
};
use crate::builder::invoke::toolchain_build;
use crate::resolver;

/// The registry-integrated backend.
pub struct RegistryBackend;

impl BuildBackend for RegistryBackend {
    fn id(&self) -> BackendId {
        BackendId::Registry
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<BuildTree> {
        let resolve = resolver::resolve(ctx.lock, &ctx.descriptor.overrides)?;
        tracing::debug!(
            "registry backend: {} locked packages, {} git-pinned",
            resolve.len(),
            resolve.git_dependencies().count()
        );

        toolchain_build(ctx, self.id(), &["build", "--release", "--locked"])?;

        let release_dir = discover_release_dir(&ctx.target_dir())?;
        Ok(BuildTree {
            root: ctx.workspace_root().to_path_buf(),
            release_dir,
        })
    }
}
