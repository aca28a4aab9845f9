//! The hash override table - declared content hashes for sources the
//! registry cannot vouch for.
//!
//! A git-pinned dependency carries no registry-issued checksum, so the
//! descriptor must pin its content hash explicitly. The table is keyed by
//! `"{name}-{version}"`. That concatenation cannot disambiguate a package
//! name ending in a hyphen followed by a version-like suffix; this is a
//! known limitation of the key format and is not handled.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A declared content hash for a fetched dependency tree.
///
/// Accepted input forms: SRI-style `sha256-<base64>` or bare 64-character
/// hex. The canonical display form is SRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    digest: [u8; 32],
}

impl ContentHash {
    /// Create from a raw SHA256 digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        ContentHash { digest }
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Check whether a computed digest matches this declared hash.
    pub fn matches(&self, computed: &[u8; 32]) -> bool {
        &self.digest == computed
    }
}

impl FromStr for ContentHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(b64) = s.strip_prefix("sha256-") {
            let bytes = BASE64
                .decode(b64)
                .map_err(|e| anyhow::anyhow!("invalid base64 in content hash `{}`: {}", s, e))?;
            let digest: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("content hash `{}` is not a SHA256 digest", s))?;
            return Ok(ContentHash { digest });
        }

        if let Some((algo, _)) = s.split_once('-') {
            if algo.chars().all(|c| c.is_ascii_alphanumeric()) && algo.starts_with("sha") {
                bail!("unsupported hash algorithm `{}` (only sha256 is supported)", algo);
            }
        }

        let bytes = hex::decode(s)
            .map_err(|_| anyhow::anyhow!("content hash `{}` is neither SRI nor hex", s))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("content hash `{}` is not a SHA256 digest", s))?;
        Ok(ContentHash { digest })
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256-{}", BASE64.encode(self.digest))
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The override table: `"{name}-{version}"` to declared content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashOverrides {
    entries: BTreeMap<String, ContentHash>,
}

impl HashOverrides {
    /// Create an empty override table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an override for the given key.
    pub fn insert(&mut self, key: impl Into<String>, hash: ContentHash) {
        self.entries.insert(key.into(), hash);
    }

    /// Look up the declared hash for an override key.
    pub fn get(&self, key: &str) -> Option<&ContentHash> {
        self.entries.get(key)
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentHash)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared overrides.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
