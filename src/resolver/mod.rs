//! Dependency resolution: lock manifest plus override table in, validated
//! dependency graph out.

pub mod errors;
pub mod overrides;
pub mod resolve;

pub use errors::ResolveError;
pub use resolve::{resolve, verify_tree, Resolve, ResolvedDependency};
