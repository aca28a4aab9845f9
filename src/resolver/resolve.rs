//! Dependency resolution and content verification.
//!
//! Resolution attaches a trusted content hash to every lock entry that
//! needs one. Registry entries get theirs from the registry's signed
//! index via the lock; git entries must have a declared override, or the
//! resolve fails fast before any network or build work begins.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::lock::{LockEntry, LockManifest, LockSource};
use crate::resolver::errors::ResolveError;
use crate::resolver::overrides::{ContentHash, HashOverrides};
use crate::util::hash::hash_tree;

/// A lock entry with its trusted content hash attached.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    /// The underlying lock entry
    pub entry: LockEntry,

    /// Declared content hash for git sources; `None` for registry and
    /// workspace entries, whose trust comes from elsewhere
    pub trusted_hash: Option<ContentHash>,
}

impl ResolvedDependency {
    /// Check if this dependency requires tree verification after fetch.
    pub fn needs_verification(&self) -> bool {
        self.trusted_hash.is_some()
    }
}

/// A validated dependency graph.
#[derive(Debug, Clone, Default)]
pub struct Resolve {
    deps: Vec<ResolvedDependency>,
}

impl Resolve {
    /// All resolved dependencies.
    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.deps
    }

    /// Git-sourced dependencies with their trusted hashes.
    pub fn git_dependencies(&self) -> impl Iterator<Item = (&LockEntry, &ContentHash)> {
        self.deps.iter().filter_map(|d| {
            d.trusted_hash.as_ref().map(|h| (&d.entry, h))
        })
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

/// Resolve the lock manifest against the override table.
///
/// For every git entry, `"{name}-{version}"` must exist in the override
/// table; the declared hash becomes that entry's trusted content hash.
/// A missing override is a [`ResolveError::MissingOverride`].
pub fn resolve(lock: &LockManifest, overrides: &HashOverrides) -> Result<Resolve, ResolveError> {
    let mut deps = Vec::with_capacity(lock.len());

    for entry in lock.entries() {
        let trusted_hash = match entry.source {
            LockSource::Git(_) => {
                let key = entry.override_key();
                match overrides.get(&key) {
                    Some(hash) => {
                        tracing::debug!("pinned {} to {}", entry, hash);
                        Some(hash.clone())
                    }
                    None => {
                        return Err(ResolveError::MissingOverride {
                            name: entry.name.clone(),
                            version: entry.version.to_string(),
                            key,
                        });
                    }
                }
            }
            // Registry entries are vouched for by the registry's own
            // signed index; workspace members are local.
            LockSource::Registry { .. } | LockSource::Workspace => None,
        };

        deps.push(ResolvedDependency {
            entry: entry.clone(),
            trusted_hash,
        });
    }

    Ok(Resolve { deps })
}

/// Verify a fetched tree against the declared content hash.
///
/// Fails with [`ResolveError::HashMismatch`] if the computed tree hash
/// differs from the declared one.
pub fn verify_tree(entry: &LockEntry, trusted: &ContentHash, tree: &Path) -> Result<()> {
    let computed = hash_tree(tree)
        .with_context(|| format!("failed to hash fetched tree for `{}`", entry))?;

    if !trusted.matches(&computed) {
        return Err(ResolveError::HashMismatch {
            package: entry.to_string(),
            expected: trusted.clone(),
            computed: ContentHash::from_digest(computed),
        }
        .into());
    }

    tracing::debug!("verified {} ({})", entry, trusted);
    Ok(())
}
