//! Per-invocation script environments.
//!
//! Hook scripts get a full general-purpose standard library but no shared
//! mutable library state between invocations: every invocation gets a
//! brand-new state whose global namespace is built from a fixed allow-list,
//! so one hook can never corrupt what the next one sees.

use mlua::{Lua, LuaOptions, StdLib};

/// The stdlib surface granted to hook scripts: everything general-purpose,
/// minus `debug` (which can reach into host state).
fn hook_stdlib() -> StdLib {
    StdLib::COROUTINE
        | StdLib::TABLE
        | StdLib::IO
        | StdLib::OS
        | StdLib::STRING
        | StdLib::UTF8
        | StdLib::MATH
        | StdLib::PACKAGE
}

/// Build a fresh, isolated Lua state for one hook invocation.
///
/// Environments are never cached or reused; a script mutating `string`,
/// `os`, or any other library table only ever affects its own run.
pub fn fresh_env() -> mlua::Result<Lua> {
    Lua::new_with(hook_stdlib(), LuaOptions::default())
}
