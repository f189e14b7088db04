//! rockhook-core: build-hook orchestration for Lua-configured packages
//!
//! This crate provides the engine that wraps a package's standard build step
//! with optional `before_build` / `after_build` extension points:
//! - `BuildSpec`: the shared, mutable build configuration
//! - `HookRunner`: the before-hook -> delegate build -> after-hook pipeline
//! - `HookRegistry`: `$(name)` extension providers
//! - `PkgConfigResolver`: dependency metadata discovery via pkg-config
//!
//! Script-path hooks are executed through the `ScriptHost` trait; the Lua
//! implementation lives in the `rockhook-lua` crate.

pub mod error;
pub mod hooks;
pub mod output;
pub mod pkgconfig;
pub mod spec;

pub use error::HookError;
pub use hooks::HookStage;
pub use hooks::registry::{HookProvider, HookRegistry};
pub use hooks::runner::{BuildBackend, FileCheck, FsCheck, HookRunner, ScriptError, ScriptHost};
pub use hooks::specifier::HookSpec;
pub use output::{Logger, MemoryLogger, TracingLogger};
pub use pkgconfig::{MetadataTool, PkgConfig, PkgConfigResolver};
pub use spec::{BuildSection, BuildSpec, Dependency};
