//! Lock manifest parsing - the exhaustive record of resolved dependencies.
//!
//! The lock manifest is the host ecosystem's standard Cargo.lock format,
//! treated as a versioned, append-only record keyed by `(name, version)`.

use std::fmt;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;
use url::Url;

/// Git reference specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    /// Default branch (usually main/master)
    DefaultBranch,
    /// Specific branch
    Branch(String),
    /// Specific tag
    Tag(String),
    /// Specific revision (commit hash)
    Rev(String),
}

/// A fully pinned git source: URL, the declared reference, and the exact
/// revision the lock resolved it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitPin {
    /// Remote repository URL
    pub url: Url,

    /// Declared reference (tag, branch, rev)
    pub reference: GitReference,

    /// Resolved commit hash
    pub rev: String,
}

/// Where a locked dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockSource {
    /// A member of the workspace itself (no source field in the lock)
    Workspace,
    /// The ecosystem registry; content is vouched for by the registry's
    /// signed index checksum
    Registry { index: Url },
    /// A git repository pinned to an exact revision; content must be
    /// vouched for by a hash override
    Git(GitPin),
}

/// A single entry in the lock manifest. Identity is `(name, version)`.
#[derive(Debug, Clone)]
pub struct LockEntry {
    /// Package name
    pub name: String,

    /// Exact resolved version
    pub version: Version,

    /// Source kind
    pub source: LockSource,

    /// Registry checksum, if the source provides one
    pub checksum: Option<String>,
}

impl LockEntry {
    /// The override-table key for this entry.
    ///
    /// Plain concatenation with `-`; a name containing a hyphen followed
    /// by a version-like suffix is not disambiguable.
    pub fn override_key(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Check if this entry is git-sourced.
    pub fn is_git(&self) -> bool {
        matches!(self.source, LockSource::Git(_))
    }
}

impl fmt::Display for LockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// The parsed lock manifest.
#[derive(Debug, Clone)]
pub struct LockManifest {
    /// Lock format version
    pub version: u32,

    entries: Vec<LockEntry>,
}

#[derive(Debug, Deserialize)]
struct RawLock {
    #[serde(default)]
    version: Option<u32>,

    #[serde(rename = "package", default)]
    packages: Vec<RawPackage>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
}

impl LockManifest {
    /// Parse a lock manifest from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawLock = toml::from_str(contents).context("invalid lock manifest TOML")?;

        let mut entries = Vec::with_capacity(raw.packages.len());
        for pkg in raw.packages {
            let version: Version = pkg
                .version
                .parse()
                .with_context(|| format!("invalid version for `{}`: {}", pkg.name, pkg.version))?;

            let source = match pkg.source.as_deref() {
                None => LockSource::Workspace,
                Some(s) => parse_source(s)
                    .with_context(|| format!("invalid source for `{} {}`", pkg.name, version))?,
            };

            entries.push(LockEntry {
                name: pkg.name,
                version,
                source,
                checksum: pkg.checksum,
            });
        }

        // Exactly one entry per (name, version)
        let mut seen = std::collections::BTreeSet::new();
        for entry in &entries {
            if !seen.insert((entry.name.clone(), entry.version.clone())) {
                bail!("duplicate lock entry for `{}`", entry);
            }
        }

        Ok(LockManifest {
            version: raw.version.unwrap_or(1),
            entries,
        })
    }

    /// All lock entries.
    pub fn entries(&self) -> &[LockEntry] {
        &self.entries
    }

    /// Entries with a git source.
    pub fn git_entries(&self) -> impl Iterator<Item = &LockEntry> {
        self.entries.iter().filter(|e| e.is_git())
    }

    /// Look up an entry by name and version.
    pub fn get(&self, name: &str, version: &Version) -> Option<&LockEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name && &e.version == version)
    }

    /// Number of locked packages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a lock source string: `registry+URL` or `git+URL?ref#rev`.
fn parse_source(s: &str) -> Result<LockSource> {
    let (kind, rest) = s
        .split_once('+')
        .ok_or_else(|| anyhow::anyhow!("missing source kind prefix in `{}`", s))?;

    match kind {
        "registry" => {
            let index = Url::parse(rest).context("invalid registry URL")?;
            Ok(LockSource::Registry { index })
        }
        "git" => {
            let (url_str, rev) = match rest.rsplit_once('#') {
                Some((u, r)) if !r.is_empty() => (u, r.to_string()),
                // An unpinned git dependency is a reproducibility defect,
                // not something to fall back from.
                _ => bail!("git source `{}` has no pinned revision", s),
            };
            if !rev.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!("git source `{}` has a malformed revision `{}`", s, rev);
            }

            let mut url = Url::parse(url_str).context("invalid git URL")?;
            let reference = match url.query() {
                Some(query) => parse_git_reference(query),
                None => GitReference::DefaultBranch,
            };
            url.set_query(None);

            Ok(LockSource::Git(GitPin {
                url,
                reference,
                rev,
            }))
        }
        other => bail!("unknown source kind `{}`", other),
    }
}

fn parse_git_reference(query: &str) -> GitReference {
    for param in query.split('&') {
        if let Some((key, value)) = param.split_once('=') {
            match key {
                "branch" => return GitReference::Branch(value.to_string()),
                "tag" => return GitReference::Tag(value.to_string()),
                "rev" => return GitReference::Rev(value.to_string()),
                _ => {}
            }
        }
    }
    GitReference::DefaultBranch
}
