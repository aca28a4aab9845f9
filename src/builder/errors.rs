//! Build and assembly error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::builder::backend::BackendId;
use crate::util::diagnostic::Diagnostic;

/// Error during build execution or output assembly.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A declared tool dependency is unavailable in the host environment.
    /// Fatal, pre-build.
    #[error("required tool `{tool}` not found")]
    ToolMissing { tool: String },

    /// The backend invocation returned non-zero. Fatal and non-retried;
    /// the backend's own diagnostics have already been streamed.
    #[error("{backend} backend failed with exit code {code:?}")]
    CompileFailure {
        backend: BackendId,
        code: Option<i32>,
        command: String,
    },

    /// The expected release path is absent after a nominally successful
    /// build. Indicates a backend-version mismatch assumption.
    #[error("release path not found: {path}")]
    AssemblyPathNotFound { path: PathBuf },
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::ToolMissing { tool } => {
                Diagnostic::error(format!("required tool `{}` not found", tool))
                    .with_context("all declared build tools must be on PATH before the build starts")
                    .with_suggestion(format!("Install `{}` or adjust [tools] in Drydock.toml", tool))
            }

            BuildError::CompileFailure {
                backend,
                code,
                command,
            } => Diagnostic::error(format!(
                "{} backend failed with exit code {:?}",
                backend, code
            ))
            .with_context(format!("command: {}", command))
            .with_suggestion("Inspect the compiler diagnostics above; the build is not retried"),

            BuildError::AssemblyPathNotFound { path } => {
                Diagnostic::error(format!("release path not found: {}", path.display()))
                    .with_context("the backend reported success but produced no release directory")
                    .with_suggestion("Check that the selected backend matches the workspace layout")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_missing_diagnostic() {
        let err = BuildError::ToolMissing {
            tool: "pkg-config".to_string(),
        };
        let output = err.to_diagnostic().format();
        assert!(output.contains("pkg-config"));
        assert!(output.contains("[tools]"));
    }

    #[test]
    fn test_compile_failure_display() {
        let err = BuildError::CompileFailure {
            backend: BackendId::Registry,
            code: Some(101),
            command: "cargo build --release --locked".to_string(),
        };
        assert!(err.to_string().contains("registry backend failed"));
        assert!(err.to_diagnostic().format().contains("cargo build"));
    }
}
