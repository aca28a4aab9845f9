//! `drydock build` - run the full pipeline.

use anyhow::Result;

use drydock::builder::SystemTools;
use drydock::ops::{self, BuildOptions};
use drydock::sources::SourceCache;

use crate::cli::BuildArgs;
use crate::commands::load_descriptor;

pub fn execute(args: BuildArgs) -> Result<()> {
    let descriptor = load_descriptor(args.descriptor.as_ref())?;
    tracing::info!("building {} {}", descriptor.name, descriptor.version);

    let cache = SourceCache::default_location()?;
    let opts = BuildOptions {
        backend: args.backend,
        out_dir: args.out,
    };

    let report = ops::build(&descriptor, &SystemTools, &cache, &opts)?;

    println!(
        "built {} {} with the {} backend",
        descriptor.name, descriptor.version, report.backend
    );
    println!("  binary: {}", report.artifact.binary_path.display());
    if let Some(share) = &report.artifact.share_dir {
        println!("  share:  {}", share.display());
    }
    Ok(())
}
