//! Git source - fetching pinned dependency trees.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Oid, Repository, ResetType};
use url::Url;

use crate::core::lock::GitPin;

/// Location of cached git checkouts.
#[derive(Debug, Clone)]
pub struct SourceCache {
    root: PathBuf,
}

impl SourceCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceCache { root: root.into() }
    }

    /// The user-wide default cache location.
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "drydock")
            .ok_or_else(|| anyhow::anyhow!("could not determine a cache directory"))?;
        Ok(SourceCache::new(dirs.cache_dir()))
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A source for a git dependency pinned to an exact revision.
pub struct GitSource {
    pin: GitPin,
    checkout_path: PathBuf,
}

impl GitSource {
    /// Create a new git source backed by the given cache.
    pub fn new(pin: &GitPin, cache: &SourceCache) -> Self {
        // One checkout per repo + revision; the revision participates in
        // the directory name so a rev bump never reuses an old tree.
        let rev_prefix = pin.rev.get(..12).unwrap_or(&pin.rev);
        let dir_name = format!("{}-{}", sanitize_url_for_path(&pin.url), rev_prefix);

        GitSource {
            pin: pin.clone(),
            checkout_path: cache.root().join("git").join(dir_name),
        }
    }

    /// Where the checkout lives.
    pub fn checkout_path(&self) -> &Path {
        &self.checkout_path
    }

    /// Clone or update the repository and hard-reset to the pinned
    /// revision. Returns the checkout path, ready for verification.
    pub fn fetch(&self) -> Result<&Path> {
        let oid = Oid::from_str(&self.pin.rev)
            .with_context(|| format!("invalid revision `{}`", self.pin.rev))?;

        let repo = if self.checkout_path.exists() {
            Repository::open(&self.checkout_path).with_context(|| {
                format!(
                    "failed to open cached checkout: {}",
                    self.checkout_path.display()
                )
            })?
        } else {
            tracing::info!("cloning {}", self.pin.url);
            if let Some(parent) = self.checkout_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Repository::clone(self.pin.url.as_str(), &self.checkout_path)
                .with_context(|| format!("failed to clone {}", self.pin.url))?
        };

        let commit = match repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(_) => {
                tracing::info!("fetching {} from {}", self.pin.rev, self.pin.url);
                let mut remote = repo
                    .find_remote("origin")
                    .context("cached checkout has no origin remote")?;
                remote
                    .fetch(
                        &["refs/heads/*:refs/heads/*", "refs/tags/*:refs/tags/*"],
                        None,
                        None,
                    )
                    .with_context(|| format!("failed to fetch from {}", self.pin.url))?;
                repo.find_commit(oid).with_context(|| {
                    format!(
                        "revision `{}` not found in {} after fetch",
                        self.pin.rev, self.pin.url
                    )
                })?
            }
        };

        repo.reset(commit.as_object(), ResetType::Hard, None)
            .with_context(|| format!("failed to check out `{}`", self.pin.rev))?;

        Ok(&self.checkout_path)
    }
}

/// Turn a URL into a filesystem-safe directory component.
fn sanitize_url_for_path(url: &Url) -> String {
    let mut name = String::new();
    if let Some(host) = url.host_str() {
        name.push_str(host);
    }
    for c in url.path().chars() {
        name.push(if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c
        } else {
            '_'
        });
    }
    name.trim_matches('_').to_string()
}
