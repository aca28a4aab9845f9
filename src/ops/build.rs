//! The build pipeline: resolve, fetch/verify, compile, assemble.
//!
//! A single, non-concurrent, blocking pipeline per invocation. Every error
//! aborts the whole run; builds are deterministic, so retrying unchanged
//! inputs would reproduce the same failure. One build occupies a given
//! output location at a time, enforced by whoever invokes us.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::backend::{backend_for, BackendId, BuildContext};
use crate::builder::fingerprint::BuildFingerprint;
use crate::builder::tools::{ToolProvider, Toolchain};
use crate::core::descriptor::PackageDescriptor;
use crate::core::lock::{LockManifest, LockSource};
use crate::ops::assemble::{assemble, OutputArtifact};
use crate::resolver::{self, Resolve};
use crate::sources::{GitSource, SourceCache};
use crate::util::fs::{read_to_string, remove_dir_all_if_exists};

/// Options for the build pipeline.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Backend override (defaults to the descriptor's choice)
    pub backend: Option<BackendId>,

    /// Output directory (defaults to `<root>/out`)
    pub out_dir: Option<PathBuf>,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    /// The assembled output
    pub artifact: OutputArtifact,

    /// The backend that produced it
    pub backend: BackendId,
}

/// The pre-build validation state: lock contents, parsed manifest, and
/// the validated dependency graph.
#[derive(Debug)]
pub struct Preflight {
    /// Raw lock manifest text (fingerprint input)
    pub lock_contents: String,

    /// Parsed lock manifest
    pub lock: LockManifest,

    /// Validated dependency graph
    pub resolve: Resolve,
}

/// Run resolution and, optionally, fetch-and-verify of git-pinned trees.
///
/// This is everything that must succeed before any compile work starts:
/// a missing override or a hash mismatch aborts here.
pub fn preflight(
    descriptor: &PackageDescriptor,
    cache: &SourceCache,
    fetch: bool,
) -> Result<Preflight> {
    let lockfile_path = descriptor.lockfile_path();
    let lock_contents = read_to_string(&lockfile_path)?;
    let lock = LockManifest::parse(&lock_contents)
        .with_context(|| format!("failed to parse lock manifest: {}", lockfile_path.display()))?;

    let resolve = resolver::resolve(&lock, &descriptor.overrides)?;
    tracing::info!(
        "resolved {} locked packages ({} git-pinned)",
        resolve.len(),
        resolve.git_dependencies().count()
    );

    if fetch {
        for (entry, trusted) in resolve.git_dependencies() {
            let LockSource::Git(ref pin) = entry.source else {
                continue;
            };
            let source = GitSource::new(pin, cache);
            let checkout = source.fetch()?;
            resolver::verify_tree(entry, trusted, checkout)?;
            tracing::info!("verified {}", entry);
        }
    }

    Ok(Preflight {
        lock_contents,
        lock,
        resolve,
    })
}

/// Run the full pipeline: resolve, fetch/verify, compile, assemble.
pub fn build(
    descriptor: &PackageDescriptor,
    provider: &dyn ToolProvider,
    cache: &SourceCache,
    opts: &BuildOptions,
) -> Result<BuildReport> {
    // Resolution and content verification happen before any build work.
    let pre = preflight(descriptor, cache, true)?;

    // All declared tools must be present up front.
    let toolchain = Toolchain::resolve(provider, &descriptor.tools.build)?;

    let backend_id = opts.backend.unwrap_or(descriptor.backend);
    let target_dir = descriptor.root().join("target");

    // A changed input (lock, override hash, backend) invalidates the
    // cached tree entirely; stale trees are discarded, never reused.
    let fingerprint = BuildFingerprint::compute(descriptor, backend_id, &pre.lock_contents);
    if fingerprint.is_stale(BuildFingerprint::load(&target_dir).as_ref()) {
        tracing::info!("build inputs changed; discarding cached build tree");
        remove_dir_all_if_exists(&target_dir)?;
    }

    let backend = backend_for(backend_id);
    let ctx = BuildContext {
        descriptor,
        lock: &pre.lock,
        toolchain: &toolchain,
    };
    let tree = backend.build(&ctx)?;

    let out_dir = opts
        .out_dir
        .clone()
        .unwrap_or_else(|| descriptor.root().join("out"));
    let artifact = assemble(&tree, &descriptor.name, &out_dir)?;

    fingerprint.store(&target_dir)?;

    Ok(BuildReport {
        artifact,
        backend: backend_id,
    })
}
