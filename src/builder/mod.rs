//! Build backends and their shared plumbing.

pub mod backend;
pub mod errors;
pub mod fingerprint;
mod invoke;
pub mod registry;
pub mod tools;
pub mod wrapper;

pub use backend::{backend_for, discover_release_dir, BackendId, BuildBackend, BuildContext, BuildTree};
pub use errors::BuildError;
pub use fingerprint::BuildFingerprint;
pub use tools::{SystemTools, ToolProvider, Toolchain};
