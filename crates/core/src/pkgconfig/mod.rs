//! Dependency metadata discovery via pkg-config.

pub mod resolve;
pub mod tool;

pub use resolve::PkgConfigResolver;
pub use tool::{MetadataTool, PkgConfig, parse_assignments};
