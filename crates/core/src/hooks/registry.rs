//! Extension provider registry.
//!
//! `$(name)` hooks resolve against a registry built at construction time
//! rather than loading modules by computed name at run time. A successful
//! dispatch short-circuits the hook; the script-path route is never attempted
//! for the same invocation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::HookError;
use crate::output::Logger;
use crate::pkgconfig::{PkgConfig, PkgConfigResolver};
use crate::spec::BuildSpec;

/// A registered build-hook extension.
///
/// Providers mutate the spec in place; `variables` is the only section they
/// may write.
pub trait HookProvider {
    fn run(&self, spec: &mut BuildSpec, logger: &dyn Logger) -> anyhow::Result<()>;
}

/// Registry of extension providers keyed by `$(name)` identifier.
#[derive(Default)]
pub struct HookRegistry {
    providers: BTreeMap<String, Box<dyn HookProvider>>,
}

impl HookRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the stock extensions registered.
    ///
    /// Currently that is `$(pkg_config)`, backed by the real pkg-config
    /// binary.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "pkg_config",
            Box::new(PkgConfigResolver::new(PkgConfig::default())),
        );
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Box<dyn HookProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Resolve `name` and invoke the provider with the shared spec.
    pub fn dispatch(
        &self,
        name: &str,
        spec: &mut BuildSpec,
        logger: &dyn Logger,
    ) -> Result<(), HookError> {
        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| HookError::LoadSubmodule {
                name: name.to_string(),
                cause: "not registered".to_string(),
            })?;

        debug!(submodule = %name, "dispatching hook extension");
        provider.run(spec, logger).map_err(|e| HookError::RunSubmodule {
            name: name.to_string(),
            cause: e.to_string(),
        })
    }
}
