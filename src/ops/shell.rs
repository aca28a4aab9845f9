//! Development environment provisioner.
//!
//! Builds an interactive shell whose PATH fronts the same tools the build
//! uses: the declared build tools, the (empty) runtime set, and any
//! baseline utility extras from the descriptor. Purely a convenience for
//! invoking the toolchain manually; no build or resolution logic lives
//! here and nothing from it reaches the install path.

use std::ffi::OsString;
use std::io::Write;

use anyhow::{Context, Result};

use crate::builder::tools::{tool_env_var, ToolProvider, Toolchain};
use crate::core::descriptor::PackageDescriptor;
use crate::util::process::ProcessBuilder;

/// A provisioned shell environment.
pub struct ShellEnvironment {
    /// Resolved tools, in declared order
    pub toolchain: Toolchain,

    /// PATH with the tool directories prefixed
    pub path: OsString,
}

/// Construct the environment: the union of build tools, runtime
/// dependencies, and shell extras, as an ordered set.
pub fn environment(
    descriptor: &PackageDescriptor,
    provider: &dyn ToolProvider,
) -> Result<ShellEnvironment> {
    let mut names = descriptor.tools.build.clone();
    for extra in descriptor
        .tools
        .runtime
        .iter()
        .chain(descriptor.shell_extra.iter())
    {
        if !names.contains(extra) {
            names.push(extra.clone());
        }
    }

    let toolchain = Toolchain::resolve(provider, &names)?;
    let path = toolchain.path_env();

    Ok(ShellEnvironment { toolchain, path })
}

impl ShellEnvironment {
    /// Write the environment as shell-style assignments.
    pub fn print(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "PATH={}", self.path.to_string_lossy())?;
        for (tool, path) in self.toolchain.iter() {
            writeln!(out, "{}={}", tool_env_var(tool), path.display())?;
        }
        Ok(())
    }

    /// Spawn an interactive shell with the provisioned environment.
    /// Returns the shell's exit code.
    pub fn enter(&self) -> Result<i32> {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        tracing::info!("entering development shell ({})", shell);

        let mut cmd =
            ProcessBuilder::new(&shell).env("PATH", self.path.to_string_lossy());
        for (tool, path) in self.toolchain.iter() {
            cmd = cmd.env(tool_env_var(tool), path.to_string_lossy());
        }

        let status = cmd
            .status_streaming()
            .with_context(|| format!("failed to spawn shell `{}`", shell))?;
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tools::mock::MockTools;
    use crate::core::descriptor::DESCRIPTOR_FILE_NAME;
    use std::path::Path;
    use tempfile::TempDir;

    fn descriptor(dir: &Path, contents: &str) -> PackageDescriptor {
        let path = dir.join(DESCRIPTOR_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        PackageDescriptor::load(&path).unwrap()
    }

    #[test]
    fn test_environment_unions_tools_and_extras() {
        let tmp = TempDir::new().unwrap();
        let desc = descriptor(
            tmp.path(),
            r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["cmake", "pkg-config", "cargo"]

[shell]
extra = ["git", "cargo"]
"#,
        );

        let provider = MockTools::new()
            .with("cmake", "/usr/bin/cmake")
            .with("pkg-config", "/usr/bin/pkg-config")
            .with("cargo", "/opt/rust/bin/cargo")
            .with("git", "/usr/bin/git");

        let env = environment(&desc, &provider).unwrap();

        // cargo appears once despite being listed in both sets
        let names: Vec<_> = env.toolchain.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["cmake", "pkg-config", "cargo", "git"]);
    }

    #[test]
    fn test_environment_fails_on_missing_extra() {
        let tmp = TempDir::new().unwrap();
        let desc = descriptor(
            tmp.path(),
            r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["cargo"]

[shell]
extra = ["git"]
"#,
        );

        let provider = MockTools::new().with("cargo", "/opt/rust/bin/cargo");
        assert!(environment(&desc, &provider).is_err());
    }

    #[test]
    fn test_print_env_format() {
        let tmp = TempDir::new().unwrap();
        let desc = descriptor(
            tmp.path(),
            r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["cargo"]
"#,
        );

        let provider = MockTools::new().with("cargo", "/opt/rust/bin/cargo");
        let env = environment(&desc, &provider).unwrap();

        let mut buf = Vec::new();
        env.print(&mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.starts_with("PATH="));
        assert!(output.contains("/opt/rust/bin"));
        assert!(output.contains("CARGO=/opt/rust/bin/cargo"));
    }
}
