//! The external pkg-config collaborator.
//!
//! Queries go through `/bin/sh` and keep the classic hook-script wire
//! protocol: one `key=value` line per discovered field, every subcommand
//! guarded so a failure degrades to an empty value instead of an error.
//! Consumers parse by splitting on the first `=`, trimming the value, and
//! dropping pairs that are empty after trimming.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::debug;

/// External package-metadata tool.
pub trait MetadataTool {
    /// Whether `name` is registered with the tool.
    fn exists(&self, name: &str) -> bool;
    /// Every discovered `key=value` pair for `name`, already trimmed.
    ///
    /// A package or tool failure degrades to an empty map.
    fn query(&self, name: &str) -> BTreeMap<String, String>;
    /// All registered package names.
    fn list_all(&self) -> Vec<String>;
}

/// The real pkg-config binary.
#[derive(Debug, Clone)]
pub struct PkgConfig {
    program: String,
}

impl Default for PkgConfig {
    fn default() -> Self {
        Self {
            program: "pkg-config".to_string(),
        }
    }
}

impl PkgConfig {
    /// Use an alternative binary, e.g. `pkgconf` or a cross toolchain wrapper.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn sh(&self, script: &str) -> Option<String> {
        let output = Command::new("/bin/sh").arg("-c").arg(script).output().ok()?;
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Package names are spliced into shell scripts; restrict them to the
/// character set pkg-config names actually use.
pub(crate) fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

impl MetadataTool for PkgConfig {
    fn exists(&self, name: &str) -> bool {
        if !valid_name(name) {
            return false;
        }
        Command::new(&self.program)
            .arg("--exists")
            .arg(name)
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn query(&self, name: &str) -> BTreeMap<String, String> {
        if !valid_name(name) {
            return BTreeMap::new();
        }

        // Emit every variable defined in the .pc file via per-key queries, the
        // Name/Description/Version header lines, then Libs/Cflags/Modversion
        // unconditionally. Every subcommand degrades to an empty string.
        let script = format!(
            r#"PKGCONFIG={program}
PCFILE="`$PKGCONFIG --variable=pcfiledir {name} 2>/dev/null`/{name}.pc"
if [ -f "$PCFILE" ]; then
    for KEY in `sed -n 's/^\([A-Za-z_][A-Za-z0-9_]*\) *=.*/\1/p' "$PCFILE"`; do
        echo "$KEY=`$PKGCONFIG --variable=$KEY {name} 2>/dev/null`"
    done
    sed -n 's/^Name: */Name=/p; s/^Description: */Description=/p; s/^Version: */Version=/p' "$PCFILE"
fi
echo "Libs=`$PKGCONFIG --libs {name} 2>/dev/null`"
echo "Cflags=`$PKGCONFIG --cflags {name} 2>/dev/null`"
echo "Modversion=`$PKGCONFIG --modversion {name} 2>/dev/null`"
"#,
            program = self.program,
            name = name,
        );

        match self.sh(&script) {
            Some(output) => parse_assignments(&output),
            None => {
                debug!(package = %name, "pkg-config query failed, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn list_all(&self) -> Vec<String> {
        let Ok(output) = Command::new(&self.program).arg("--list-all").output() else {
            return Vec::new();
        };
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect()
    }
}

/// Parse line-oriented `key=value` output: split on the first `=`, trim both
/// sides, drop pairs whose value is empty after trimming.
pub fn parse_assignments(output: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in output.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}
