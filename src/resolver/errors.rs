//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::resolver::overrides::ContentHash;
use crate::util::diagnostic::Diagnostic;

/// Error during dependency resolution or verification.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A git-sourced dependency has no entry in the override table. Such
    /// sources carry no registry checksum, so an unpinned one makes the
    /// build unreproducible. Raised before any network or build work.
    #[error("missing hash override for `{name} {version}`")]
    MissingOverride {
        name: String,
        version: String,
        key: String,
    },

    /// The fetched tree's computed hash does not equal the declared hash.
    /// Signals tampering or an upstream revision change.
    #[error("hash mismatch for `{package}`")]
    HashMismatch {
        package: String,
        expected: ContentHash,
        computed: ContentHash,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::MissingOverride { name, version, key } => {
                Diagnostic::error(format!("missing hash override for `{} {}`", name, version))
                    .with_context(
                        "git-sourced dependencies carry no registry checksum and must be pinned",
                    )
                    .with_suggestion(format!(
                        "Add `\"{}\" = \"sha256-...\"` to [overrides] in Drydock.toml",
                        key
                    ))
            }

            ResolveError::HashMismatch {
                package,
                expected,
                computed,
            } => Diagnostic::error(format!("hash mismatch for `{}`", package))
                .with_context(format!("declared: {}", expected))
                .with_context(format!("computed: {}", computed))
                .with_suggestion(
                    "Verify the upstream source; if the revision legitimately changed, \
                     update the declared hash",
                ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hash::sha256_bytes;

    #[test]
    fn test_missing_override_diagnostic() {
        let err = ResolveError::MissingOverride {
            name: "tree-sitter-matlab".to_string(),
            version: "1.0.7".to_string(),
            key: "tree-sitter-matlab-1.0.7".to_string(),
        };

        let output = err.to_diagnostic().format();
        assert!(output.contains("missing hash override"));
        assert!(output.contains("tree-sitter-matlab-1.0.7"));
        assert!(output.contains("[overrides]"));
    }

    #[test]
    fn test_hash_mismatch_diagnostic() {
        let err = ResolveError::HashMismatch {
            package: "tree-sitter-matlab 1.0.7".to_string(),
            expected: ContentHash::from_digest(sha256_bytes(b"expected")),
            computed: ContentHash::from_digest(sha256_bytes(b"computed")),
        };

        let output = err.to_diagnostic().format();
        assert!(output.contains("hash mismatch"));
        assert!(output.contains("declared: sha256-"));
        assert!(output.contains("computed: sha256-"));
    }
}
