//! Error types for the hook pipeline.
//!
//! Every fatal category carries a fixed message prefix so callers can
//! classify failures by prefix instead of parsing free text.

use thiserror::Error;

use crate::hooks::HookStage;

/// A fatal hook pipeline failure.
#[derive(Debug, Error)]
pub enum HookError {
    /// A `$(`-prefixed hook value that is not exactly `$(identifier)`.
    #[error("Invalid submodule syntax")]
    InvalidSyntax,

    /// The degenerate `$()` form.
    #[error("Invalid submodule syntax: missing name")]
    MissingName,

    #[error("Failed to load submodule {name}: {cause}")]
    LoadSubmodule { name: String, cause: String },

    #[error("Failed to run submodule {name}: {cause}")]
    RunSubmodule { name: String, cause: String },

    #[error("Hook script not found: {0}")]
    ScriptNotFound(String),

    #[error("Failed to load {stage}: {cause}")]
    LoadScript { stage: HookStage, cause: String },

    #[error("Failed to run {stage}: {cause}")]
    RunScript { stage: HookStage, cause: String },

    /// Delegate build backend failure, surfaced verbatim.
    #[error(transparent)]
    Build(anyhow::Error),

    #[error("hook pipeline is already running (re-entrant invocation is unsupported)")]
    Reentrant,
}
