//! `drydock check` - validate descriptor, lock, and overrides.

use anyhow::Result;

use drydock::ops;
use drydock::sources::SourceCache;
use drydock::util::diagnostic::{self, Diagnostic};

use crate::cli::CheckArgs;
use crate::commands::load_descriptor;

pub fn execute(args: CheckArgs) -> Result<()> {
    let descriptor = load_descriptor(args.descriptor.as_ref())?;
    tracing::info!("checking {} {}", descriptor.name, descriptor.version);

    let cache = SourceCache::default_location()?;
    let pre = ops::preflight(&descriptor, &cache, args.fetch)?;

    let git_count = pre.resolve.git_dependencies().count();
    println!(
        "ok: {} locked packages, {} git-pinned with hash overrides",
        pre.resolve.len(),
        git_count
    );
    if git_count > 0 {
        if args.fetch {
            println!("ok: all git-pinned trees match their declared hashes");
        } else {
            diagnostic::emit(
                &Diagnostic::warning("git-pinned trees were not fetched or verified")
                    .with_suggestion("Run `drydock check --fetch` to verify declared hashes"),
            );
        }
    }
    Ok(())
}
