//! Build fingerprinting.
//!
//! The fingerprint captures every input the descriptor contributes to a
//! build: package identity, backend choice, lock contents, and the
//! override table. Any change - including bumping a single override hash
//! to track an upstream revision - invalidates the cached build tree.
//! Stale or partial trees are discarded, never reused.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::backend::BackendId;
use crate::core::descriptor::PackageDescriptor;
use crate::resolver::overrides::HashOverrides;
use crate::util::hash::{sha256_hex, Fingerprint};

/// File recording the inputs of the last completed build, relative to the
/// target directory.
const FINGERPRINT_FILE: &str = ".drydock-fingerprint.toml";

/// Fingerprint of all descriptor-level build inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFingerprint {
    /// Package name
    pub package: String,

    /// Package version
    pub version: String,

    /// Selected backend
    pub backend: BackendId,

    /// Hash of the lock manifest contents
    pub lock_hash: String,

    /// Hash of the override table
    pub overrides_hash: String,
}

impl BuildFingerprint {
    /// Compute the fingerprint for a descriptor, the effective backend,
    /// and the lock contents.
    pub fn compute(
        descriptor: &PackageDescriptor,
        backend: BackendId,
        lock_contents: &str,
    ) -> Self {
        BuildFingerprint {
            package: descriptor.name.clone(),
            version: descriptor.version.to_string(),
            backend,
            lock_hash: sha256_hex(lock_contents),
            overrides_hash: hash_overrides(&descriptor.overrides),
        }
    }

    /// Where the fingerprint is stored for a given target directory.
    pub fn path_for(target_dir: &Path) -> PathBuf {
        target_dir.join(FINGERPRINT_FILE)
    }

    /// Load the stored fingerprint, if any. A missing or unreadable file
    /// counts as no fingerprint (the tree will be treated as stale).
    pub fn load(target_dir: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(Self::path_for(target_dir)).ok()?;
        toml::from_str(&contents).ok()
    }

    /// Record this fingerprint alongside the build tree.
    pub fn store(&self, target_dir: &Path) -> Result<()> {
        let contents = toml::to_string(self).context("failed to serialize build fingerprint")?;
        std::fs::create_dir_all(target_dir)?;
        std::fs::write(Self::path_for(target_dir), contents)
            .context("failed to write build fingerprint")?;
        Ok(())
    }

    /// Whether a build tree recorded with `stored` must be discarded.
    pub fn is_stale(&self, stored: Option<&BuildFingerprint>) -> bool {
        stored != Some(self)
    }
}

fn hash_overrides(overrides: &HashOverrides) -> String {
    let mut fp = Fingerprint::new();
    for (key, hash) in overrides.iter() {
        fp.update_str(key);
        fp.update_bytes(hash.digest());
    }
    fp.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::PackageDescriptor;
    use crate::resolver::overrides::ContentHash;
    use crate::util::hash::sha256_bytes;
    use tempfile::TempDir;

    fn descriptor_with_override(dir: &Path, hash: &ContentHash) -> PackageDescriptor {
        let path = dir.join("Drydock.toml");
        std::fs::write(
            &path,
            format!(
                r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[overrides]
"tree-sitter-matlab-1.0.7" = "{}"
"#,
                hash
            ),
        )
        .unwrap();
        PackageDescriptor::load(&path).unwrap()
    }

    #[test]
    fn test_fingerprint_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let hash = ContentHash::from_digest(sha256_bytes(b"tree"));
        let desc = descriptor_with_override(tmp.path(), &hash);

        let fp = BuildFingerprint::compute(&desc, desc.backend, "lock contents");
        let target = tmp.path().join("target");
        fp.store(&target).unwrap();

        let loaded = BuildFingerprint::load(&target).unwrap();
        assert_eq!(fp, loaded);
        assert!(!fp.is_stale(Some(&loaded)));
    }

    #[test]
    fn test_override_hash_bump_invalidates() {
        let tmp = TempDir::new().unwrap();

        let before = descriptor_with_override(
            tmp.path(),
            &ContentHash::from_digest(sha256_bytes(b"old upstream")),
        );
        let fp_before = BuildFingerprint::compute(&before, before.backend, "lock contents");

        // Simulate an upstream revision bump: only the declared hash moves
        let after = descriptor_with_override(
            tmp.path(),
            &ContentHash::from_digest(sha256_bytes(b"new upstream")),
        );
        let fp_after = BuildFingerprint::compute(&after, after.backend, "lock contents");

        assert_ne!(fp_before, fp_after);
        assert!(fp_after.is_stale(Some(&fp_before)));
    }

    #[test]
    fn test_lock_change_invalidates() {
        let tmp = TempDir::new().unwrap();
        let hash = ContentHash::from_digest(sha256_bytes(b"tree"));
        let desc = descriptor_with_override(tmp.path(), &hash);

        let fp1 = BuildFingerprint::compute(&desc, desc.backend, "lock v1");
        let fp2 = BuildFingerprint::compute(&desc, desc.backend, "lock v2");
        assert!(fp2.is_stale(Some(&fp1)));
    }

    #[test]
    fn test_missing_fingerprint_is_stale() {
        let tmp = TempDir::new().unwrap();
        let hash = ContentHash::from_digest(sha256_bytes(b"tree"));
        let desc = descriptor_with_override(tmp.path(), &hash);

        let fp = BuildFingerprint::compute(&desc, desc.backend, "lock contents");
        assert!(fp.is_stale(BuildFingerprint::load(&tmp.path().join("target")).as_ref()));
    }
}
