//! Shared toolchain invocation for backends.

use anyhow::Result;

use crate::builder::backend::{BackendId, BuildContext};
use crate::builder::errors::BuildError;
use crate::builder::tools::tool_env_var;
use crate::util::process::ProcessBuilder;

/// Invoke the language toolchain with the declared tool environment.
///
/// Diagnostics stream straight through to the user; a non-zero exit is a
/// fatal [`BuildError::CompileFailure`] with no retry.
pub(crate) fn toolchain_build(
    ctx: &BuildContext<'_>,
    backend: BackendId,
    args: &[&str],
) -> Result<()> {
    let cargo = ctx.toolchain.require("cargo")?;

    let mut cmd = ProcessBuilder::new(cargo)
        .args(args)
        .cwd(ctx.workspace_root())
        .env("PATH", ctx.toolchain.path_env().to_string_lossy());

    // Point each tool's conventional env var at the resolved path so
    // transitive native build steps find the same binaries we probed.
    for (tool, path) in ctx.toolchain.iter() {
        cmd = cmd.env(tool_env_var(tool), path.to_string_lossy());
    }

    tracing::info!("running {}", cmd.display_command());
    let status = cmd.status_streaming()?;

    if !status.success() {
        return Err(BuildError::CompileFailure {
            backend,
            code: status.code(),
            command: cmd.display_command(),
        }
        .into());
    }

    Ok(())
}
