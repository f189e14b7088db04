//! Error types for rockhook-lua.

use thiserror::Error;

/// Errors raised while loading or running a hook script.
#[derive(Debug, Error)]
pub enum ScriptHostError {
    #[error("Lua runtime error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
