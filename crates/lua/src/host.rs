//! Lua script host for script-path hooks.
//!
//! Loads the hook chunk in a fresh environment and calls it with the build
//! spec table as its sole argument:
//!
//! ```lua
//! local spec = ...
//! spec.variables.FOO_DIR = "/opt/foo"
//! ```
//!
//! Mutations to `spec.variables` are written back to the shared `BuildSpec`;
//! the rest of the table is a read-only view from the engine's perspective.

use std::path::Path;

use mlua::{Function, Lua, Table, Value};
use tracing::debug;

use rockhook_core::hooks::runner::{ScriptError, ScriptHost};
use rockhook_core::spec::BuildSpec;

use crate::env;
use crate::error::ScriptHostError;

/// Executes hook scripts in per-invocation Lua environments.
#[derive(Debug, Default)]
pub struct LuaScriptHost;

impl LuaScriptHost {
    pub fn new() -> Self {
        Self
    }

    /// Read and compile the chunk without running it, so syntax and I/O
    /// problems surface as load failures rather than run failures.
    fn load(&self, lua: &Lua, path: &Path) -> Result<Function, ScriptHostError> {
        let source = std::fs::read_to_string(path).map_err(|e| ScriptHostError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let chunk = lua.load(&source).set_name(format!("@{}", path.display()));
        Ok(chunk.into_function()?)
    }
}

impl ScriptHost for LuaScriptHost {
    fn run_script(&self, path: &Path, spec: &mut BuildSpec) -> Result<(), ScriptError> {
        let lua = env::fresh_env().map_err(|e| ScriptError::Load(e.to_string()))?;
        let hook = self
            .load(&lua, path)
            .map_err(|e| ScriptError::Load(e.to_string()))?;

        let view = spec_to_lua(&lua, spec).map_err(|e| ScriptError::Load(e.to_string()))?;
        hook
            .call::<()>(&view)
            .map_err(|e| ScriptError::Run(e.to_string()))?;

        write_back_variables(&view, spec).map_err(|e| ScriptError::Run(e.to_string()))?;
        debug!(script = %path.display(), "hook script completed");
        Ok(())
    }
}

/// Build the Lua view of the spec.
fn spec_to_lua(lua: &Lua, spec: &BuildSpec) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.set("package", spec.package.as_str())?;
    if let Some(version) = &spec.version {
        table.set("version", version.as_str())?;
    }

    let deps = lua.create_table()?;
    for (name, dep) in &spec.external_dependencies {
        let entry = lua.create_table()?;
        if let Some(library) = &dep.library {
            entry.set("library", library.as_str())?;
        }
        if let Some(header) = &dep.header {
            entry.set("header", header.as_str())?;
        }
        if let Some(version) = &dep.version {
            entry.set("version", version.as_str())?;
        }
        deps.set(name.as_str(), entry)?;
    }
    table.set("external_dependencies", deps)?;

    let variables = lua.create_table()?;
    for (key, value) in &spec.variables {
        variables.set(key.as_str(), value.as_str())?;
    }
    table.set("variables", variables)?;

    let build = lua.create_table()?;
    if let Some(v) = &spec.build.before_build {
        build.set("before_build", v.as_str())?;
    }
    if let Some(v) = &spec.build.after_build {
        build.set("after_build", v.as_str())?;
    }
    for (key, value) in &spec.build.backend {
        build.set(key.as_str(), json_to_lua(lua, value)?)?;
    }
    table.set("build", build)?;

    Ok(table)
}

/// Copy the (possibly mutated or replaced) variables table back into the
/// spec. Keys the script removed disappear; non-scalar values are skipped.
fn write_back_variables(view: &Table, spec: &mut BuildSpec) -> mlua::Result<()> {
    let variables: Table = view.get("variables")?;
    spec.variables.clear();
    for pair in variables.pairs::<String, Value>() {
        let (key, value) = pair?;
        match value {
            Value::String(s) => {
                spec.variables.insert(key, s.to_str()?.to_string());
            }
            Value::Integer(n) => {
                spec.variables.insert(key, n.to_string());
            }
            Value::Number(n) => {
                spec.variables.insert(key, n.to_string());
            }
            other => {
                debug!(key = %key, kind = %other.type_name(), "skipping non-scalar variable");
            }
        }
    }
    Ok(())
}

fn json_to_lua(lua: &Lua, value: &serde_json::Value) -> mlua::Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Nil),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                Ok(Value::Number(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(lua.create_string(s)?)),
        serde_json::Value::Array(items) => {
            let table = lua.create_table()?;
            for (i, item) in items.iter().enumerate() {
                table.set(i + 1, json_to_lua(lua, item)?)?;
            }
            Ok(Value::Table(table))
        }
        serde_json::Value::Object(map) => {
            let table = lua.create_table()?;
            for (key, item) in map {
                table.set(key.as_str(), json_to_lua(lua, item)?)?;
            }
            Ok(Value::Table(table))
        }
    }
}
