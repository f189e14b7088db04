//! The pkg-config hook extension.
//!
//! For every declared external dependency, discovers the package's variables
//! and merges them into `BuildSpec.variables` under a `<NAME>_` prefix,
//! logging every addition, update, and removal. A dependency the tool does
//! not know is logged (with name suggestions) and skipped; this extension
//! never fails the pipeline.

use std::collections::BTreeMap;

use crate::hooks::registry::HookProvider;
use crate::output::Logger;
use crate::pkgconfig::tool::MetadataTool;
use crate::spec::BuildSpec;

/// Fixed renames applied to discovered pkg-config keys; anything not listed
/// is uppercased as-is.
const RENAMES: &[(&str, &str)] = &[
    ("includedir", "INCDIR"),
    ("libdir", "LIBDIR"),
    ("prefix", "DIR"),
    ("bindir", "BINDIR"),
];

/// Resolves native dependency metadata through an external pkg-config-like
/// tool. Registered as the `$(pkg_config)` extension.
pub struct PkgConfigResolver<T> {
    tool: T,
}

impl<T: MetadataTool> PkgConfigResolver<T> {
    pub fn new(tool: T) -> Self {
        Self { tool }
    }

    /// Process every declared dependency, in lexicographic order so logs and
    /// merges are reproducible across runs.
    pub fn resolve(&self, spec: &mut BuildSpec, logger: &dyn Logger) {
        if spec.external_dependencies.is_empty() {
            return;
        }
        let names: Vec<String> = spec.external_dependencies.keys().cloned().collect();
        for name in names {
            self.resolve_one(&name, spec, logger);
        }
    }

    fn resolve_one(&self, name: &str, spec: &mut BuildSpec, logger: &dyn Logger) {
        if !self.tool.exists(name) {
            logger.printout(&format!("{name} is not registered with pkg-config"));
            let suggestions = self.suggestions(name);
            if !suggestions.is_empty() {
                logger.printout(&format!("did you mean: {}?", suggestions.join(", ")));
            }
            return;
        }

        let prefix = format!("{}_", name.to_uppercase());

        // Back up everything previously set under this prefix; whatever the new
        // query does not refresh is dropped at the end.
        let mut old_vars: BTreeMap<String, String> = BTreeMap::new();
        spec.variables.retain(|key, value| {
            if key.starts_with(&prefix) {
                old_vars.insert(key.clone(), value.clone());
                false
            } else {
                true
            }
        });

        let discovered = self.tool.query(name);
        let new_vars = normalize(&prefix, &discovered);

        for (key, value) in new_vars {
            match old_vars.remove(&key) {
                None => logger.printout(&format!("added {key}={value}")),
                Some(prev) if prev != value => {
                    logger.printout(&format!("updated {key}={value} (replaced {prev})"));
                }
                Some(_) => logger.printout(&format!("kept {key}={value}")),
            }
            spec.variables.insert(key, value);
        }

        // Stale keys are reported and dropped, not restored
        for (key, prev) in old_vars {
            logger.printout(&format!("removed {key} (was {prev})"));
        }
    }

    /// Case-insensitive substring matches over the tool's package listing,
    /// sorted and deduplicated.
    fn suggestions(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut matches: Vec<String> = self
            .tool
            .list_all()
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().contains(&needle))
            .collect();
        matches.sort();
        matches.dedup();
        matches
    }
}

/// Apply the rename table, uppercase, prefix, and drop values that are empty
/// after trimming. Two raw keys normalizing to the same variable resolve in
/// sorted raw-key order, last write wins.
fn normalize(prefix: &str, discovered: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for (raw, value) in discovered {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let renamed = RENAMES
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| (*to).to_string())
            .unwrap_or_else(|| raw.to_uppercase());
        vars.insert(format!("{prefix}{renamed}"), value.to_string());
    }
    vars
}

impl<T: MetadataTool> HookProvider for PkgConfigResolver<T> {
    fn run(&self, spec: &mut BuildSpec, logger: &dyn Logger) -> anyhow::Result<()> {
        self.resolve(spec, logger);
        Ok(())
    }
}
