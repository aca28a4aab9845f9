//! Dependency sources.
//!
//! Only git sources need explicit handling here: registry content is
//! fetched and checksum-verified by the language toolchain itself, while
//! git-pinned trees must be fetched and verified against the override
//! table before the build starts.

pub mod git;

pub use git::{GitSource, SourceCache};
