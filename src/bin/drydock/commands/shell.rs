//! `drydock shell` - enter a provisioned development shell.

use anyhow::Result;

use drydock::builder::SystemTools;
use drydock::ops;

use crate::cli::ShellArgs;
use crate::commands::load_descriptor;

pub fn execute(args: ShellArgs) -> Result<()> {
    let descriptor = load_descriptor(args.descriptor.as_ref())?;
    let env = ops::environment(&descriptor, &SystemTools)?;

    if args.print_env {
        let mut stdout = std::io::stdout().lock();
        env.print(&mut stdout)?;
        return Ok(());
    }

    let code = env.enter()?;
    std::process::exit(code);
}
