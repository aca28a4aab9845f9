//! High-level operations behind the CLI commands.

pub mod assemble;
pub mod build;
pub mod shell;

pub use assemble::{assemble, OutputArtifact};
pub use build::{build, preflight, BuildOptions, BuildReport, Preflight};
pub use shell::{environment, ShellEnvironment};
