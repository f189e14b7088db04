//! rockhook-lua: Lua script-path hook execution
//!
//! Runs user-supplied hook scripts against the shared `BuildSpec`. Each
//! invocation gets a freshly built Lua state with an explicit stdlib
//! allow-list, so nothing a script does to its environment can leak into
//! later hook invocations in the same process.

pub mod env;
pub mod error;
pub mod host;

pub use env::fresh_env;
pub use error::ScriptHostError;
pub use host::LuaScriptHost;
