//! Tool dependency resolution.
//!
//! Tools are host-supplied external programs (build-system generator,
//! package-config resolver, language toolchain). They are injected
//! capabilities: the pipeline looks them up once through a [`ToolProvider`]
//! and passes the resolved [`Toolchain`] into the backend, never reaching
//! for ambient lookups mid-build. That keeps the pipeline testable with
//! mock providers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;

/// Capability for locating an external tool on the host.
pub trait ToolProvider {
    /// Locate a tool by name, returning its absolute path if present.
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// The real host environment, backed by PATH lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTools;

impl ToolProvider for SystemTools {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// The resolved set of tool paths, in declared order.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    resolved: Vec<(String, PathBuf)>,
}

impl Toolchain {
    /// Resolve every declared tool through the provider.
    ///
    /// Fails with [`BuildError::ToolMissing`] on the first absent tool;
    /// a missing tool is fatal before any build work begins.
    pub fn resolve(provider: &dyn ToolProvider, tools: &[String]) -> Result<Self, BuildError> {
        let mut resolved = Vec::with_capacity(tools.len());
        for tool in tools {
            match provider.locate(tool) {
                Some(path) => {
                    tracing::debug!("tool {} -> {}", tool, path.display());
                    resolved.push((tool.clone(), path));
                }
                None => {
                    return Err(BuildError::ToolMissing { tool: tool.clone() });
                }
            }
        }
        Ok(Toolchain { resolved })
    }

    /// Path of a resolved tool, if declared.
    pub fn path_of(&self, tool: &str) -> Option<&Path> {
        self.resolved
            .iter()
            .find(|(name, _)| name == tool)
            .map(|(_, path)| path.as_path())
    }

    /// Path of a resolved tool, or an error naming it.
    pub fn require(&self, tool: &str) -> Result<&Path, BuildError> {
        self.path_of(tool).ok_or_else(|| BuildError::ToolMissing {
            tool: tool.to_string(),
        })
    }

    /// All resolved tools in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.resolved
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Parent directories of the resolved tools, deduplicated in declared
    /// order. Used to prefix PATH for backend invocations and the dev
    /// shell.
    pub fn bin_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for (_, path) in &self.resolved {
            if let Some(parent) = path.parent() {
                if !dirs.iter().any(|d| d == parent) {
                    dirs.push(parent.to_path_buf());
                }
            }
        }
        dirs
    }

    /// Build a PATH value with the tool directories prefixed onto the
    /// current environment's PATH.
    pub fn path_env(&self) -> OsString {
        let mut paths: Vec<PathBuf> = self.bin_dirs();
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths).unwrap_or_else(|_| OsString::from(""))
    }

    /// Number of resolved tools.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Whether no tools were declared.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Environment variable name conventionally used to point at a tool
/// (e.g. `pkg-config` -> `PKG_CONFIG`).
pub fn tool_env_var(tool: &str) -> String {
    tool.to_ascii_uppercase().replace('-', "_")
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Mock tool provider for pipeline tests.
    #[derive(Debug, Clone, Default)]
    pub struct MockTools {
        tools: HashMap<String, PathBuf>,
    }

    impl MockTools {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, tool: &str, path: impl Into<PathBuf>) -> Self {
            self.tools.insert(tool.to_string(), path.into());
            self
        }
    }

    impl ToolProvider for MockTools {
        fn locate(&self, tool: &str) -> Option<PathBuf> {
            self.tools.get(tool).cloned()
        }
    }
}
