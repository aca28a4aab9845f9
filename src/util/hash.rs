//! Hashing utilities for content verification and build fingerprints.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Compute the SHA256 digest of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute the SHA256 digest of a string, hex-encoded.
pub fn sha256_hex(s: &str) -> String {
    hex::encode(sha256_bytes(s.as_bytes()))
}

/// Compute a stable content hash of a directory tree.
///
/// Files are visited in sorted relative-path order. Each file contributes
/// its relative path, its executable bit, and its contents. Symlinks
/// contribute their target. The `.git` directory is excluded so that a
/// checkout hashes identically to an export of the same tree.
pub fn hash_tree(root: &Path) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();

    let entries: Vec<_> = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to walk directory: {}", root.display()))?;

    for entry in entries {
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        if rel.as_os_str().is_empty() {
            continue;
        }

        let ty = entry.file_type();
        if ty.is_dir() {
            continue;
        }

        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(b"\0");

        if ty.is_symlink() {
            let target = std::fs::read_link(path)
                .with_context(|| format!("failed to read symlink: {}", path.display()))?;
            hasher.update(b"link\0");
            hasher.update(target.to_string_lossy().as_bytes());
            hasher.update(b"\0");
        } else {
            hasher.update(if is_executable(path) {
                b"exec\0".as_slice()
            } else {
                b"file\0".as_slice()
            });
            let contents = std::fs::read(path)
                .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
            hasher.update((contents.len() as u64).to_le_bytes());
            hasher.update(&contents);
        }
    }

    Ok(hasher.finalize().into())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Add a raw byte component.
    pub fn update_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
