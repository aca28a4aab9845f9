//! Drydock - a reproducible build-descriptor driver.
//!
//! Drydock takes a dependency-locked Cargo workspace, a table of content
//! hashes pinning any git-sourced dependencies, and a choice of build
//! backend, and turns them into a deterministic installed output: a binary
//! at `bin/<name>` plus an optional `share/` data directory.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

pub use core::{descriptor::PackageDescriptor, lock::LockManifest};
pub use resolver::{overrides::HashOverrides, Resolve};
