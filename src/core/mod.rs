//! Core data model: the package descriptor and the lock manifest.

pub mod descriptor;
pub mod lock;
