//! The package descriptor - `Drydock.toml`.
//!
//! Constructed once at evaluation time and immutable thereafter. The
//! descriptor names the package under build, the lock manifest, the build
//! backend, the build-time tool dependencies, and the override table for
//! git-pinned sources.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::builder::BackendId;
use crate::resolver::overrides::HashOverrides;
use crate::util::fs::read_to_string;

/// File name of the package descriptor.
pub const DESCRIPTOR_FILE_NAME: &str = "Drydock.toml";

/// Default build-time tool dependencies: a build-system generator, a
/// package-config resolver, and the language toolchain. The package under
/// build depends transitively on a native build step, so both backends get
/// all three.
pub const DEFAULT_BUILD_TOOLS: &[&str] = &["cmake", "pkg-config", "cargo"];

/// Build-time and runtime tool dependencies.
#[derive(Debug, Clone)]
pub struct ToolDependencies {
    /// Ordered set of build-time tools
    pub build: Vec<String>,

    /// Runtime library dependencies (empty in this system)
    pub runtime: Vec<String>,
}

/// The package descriptor, loaded from `Drydock.toml`.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    /// Workspace root (directory containing the descriptor)
    root: PathBuf,

    /// Target package name within the workspace
    pub name: String,

    /// Package version
    pub version: Version,

    /// Lock manifest path, relative to the root
    pub lockfile: PathBuf,

    /// Selected build backend
    pub backend: BackendId,

    /// Tool dependencies
    pub tools: ToolDependencies,

    /// Baseline utility extras for the development shell
    pub shell_extra: Vec<String>,

    /// Content hash overrides for git-pinned sources
    pub overrides: HashOverrides,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    package: RawPackage,
    #[serde(default)]
    tools: RawTools,
    #[serde(default)]
    shell: RawShell,
    #[serde(default)]
    overrides: HashOverrides,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default)]
    lockfile: Option<PathBuf>,
    #[serde(default)]
    backend: Option<BackendId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTools {
    #[serde(default)]
    build: Option<Vec<String>>,
    #[serde(default)]
    runtime: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawShell {
    #[serde(default)]
    extra: Vec<String>,
}

impl PackageDescriptor {
    /// Load a descriptor from the given `Drydock.toml` path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let raw: RawDescriptor = toml::from_str(&contents)
            .with_context(|| format!("failed to parse descriptor: {}", path.display()))?;

        let root = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("descriptor has no parent directory"))?
            .to_path_buf();

        let version: Version = raw.package.version.parse().with_context(|| {
            format!("invalid package version `{}`", raw.package.version)
        })?;

        let build = dedup_ordered(
            raw.tools
                .build
                .unwrap_or_else(|| DEFAULT_BUILD_TOOLS.iter().map(|s| s.to_string()).collect()),
        );
        if build.is_empty() {
            bail!("descriptor declares no build tools");
        }

        Ok(PackageDescriptor {
            root,
            name: raw.package.name,
            version,
            lockfile: raw
                .package
                .lockfile
                .unwrap_or_else(|| PathBuf::from("Cargo.lock")),
            backend: raw.package.backend.unwrap_or(BackendId::Registry),
            tools: ToolDependencies {
                build,
                runtime: dedup_ordered(raw.tools.runtime),
            },
            shell_extra: dedup_ordered(raw.shell.extra),
            overrides: raw.overrides,
        })
    }

    /// Find a descriptor by walking up from the given directory.
    pub fn find(start: &Path) -> Result<PathBuf> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(DESCRIPTOR_FILE_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            dir = d.parent();
        }
        bail!(
            "could not find `{}` in `{}` or any parent directory",
            DESCRIPTOR_FILE_NAME,
            start.display()
        );
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path to the lock manifest.
    pub fn lockfile_path(&self) -> PathBuf {
        self.root.join(&self.lockfile)
    }
}

/// Deduplicate preserving first-seen order; the tool list is an ordered set.
fn dedup_ordered(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_descriptor(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(DESCRIPTOR_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_descriptor() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(
            tmp.path(),
            r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
"#,
        );

        let desc = PackageDescriptor::load(&path).unwrap();
        assert_eq!(desc.name, "matlab-beautifier");
        assert_eq!(desc.version, Version::new(1, 1, 0));
        assert_eq!(desc.backend, BackendId::Registry);
        assert_eq!(desc.lockfile, PathBuf::from("Cargo.lock"));
        assert_eq!(desc.tools.build, vec!["cmake", "pkg-config", "cargo"]);
        assert!(desc.tools.runtime.is_empty());
        assert!(desc.overrides.is_empty());
    }

    #[test]
    fn test_load_full_descriptor() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(
            tmp.path(),
            r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
backend = "wrapper"
lockfile = "Cargo.lock"

[tools]
build = ["cmake", "pkg-config", "cargo", "cmake"]

[shell]
extra = ["git"]

[overrides]
"tree-sitter-matlab-1.0.7" = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
"#,
        );

        let desc = PackageDescriptor::load(&path).unwrap();
        assert_eq!(desc.backend, BackendId::Wrapper);
        // Ordered set: duplicate cmake dropped
        assert_eq!(desc.tools.build, vec!["cmake", "pkg-config", "cargo"]);
        assert_eq!(desc.shell_extra, vec!["git"]);
        assert!(desc.overrides.get("tree-sitter-matlab-1.0.7").is_some());
    }

    #[test]
    fn test_reject_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(
            tmp.path(),
            r#"
[package]
name = "x"
version = "1.0.0"
typo_field = true
"#,
        );
        assert!(PackageDescriptor::load(&path).is_err());
    }

    #[test]
    fn test_find_walks_up() {
        let tmp = TempDir::new().unwrap();
        write_descriptor(
            tmp.path(),
            r#"
[package]
name = "x"
version = "1.0.0"
"#,
        );
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let found = PackageDescriptor::find(&nested).unwrap();
        assert_eq!(found, tmp.path().join(DESCRIPTOR_FILE_NAME));
    }

    #[test]
    fn test_find_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(PackageDescriptor::find(tmp.path()).is_err());
    }
}
