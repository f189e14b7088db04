//! The hook specifier grammar.
//!
//! A hook field's raw string is classified anew on every execution:
//! - absent or empty means no hook
//! - `$(identifier)` routes to a registered extension
//! - anything else is a filesystem script path

use crate::error::HookError;

/// Classification of a hook field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookSpec {
    Absent,
    Extension(String),
    ScriptPath(String),
}

/// Parse a raw hook field value.
///
/// A value opening with `$(` must be exactly `$(identifier)`: the identifier
/// is non-empty and contains neither whitespace nor `)`, and nothing follows
/// the closing paren. Anything else that opens with `$(` is a syntax error,
/// never a script path.
pub fn parse(raw: Option<&str>) -> Result<HookSpec, HookError> {
    let value = match raw {
        None => return Ok(HookSpec::Absent),
        Some(v) if v.is_empty() => return Ok(HookSpec::Absent),
        Some(v) => v,
    };

    if let Some(rest) = value.strip_prefix("$(") {
        let Some(close) = rest.find(')') else {
            return Err(HookError::InvalidSyntax);
        };
        if close + 1 != rest.len() {
            return Err(HookError::InvalidSyntax);
        }
        let name = &rest[..close];
        if name.is_empty() {
            return Err(HookError::MissingName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(HookError::InvalidSyntax);
        }
        return Ok(HookSpec::Extension(name.to_string()));
    }

    Ok(HookSpec::ScriptPath(value.to_string()))
}
