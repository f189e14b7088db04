//! The shared build configuration threaded through the hook pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A package's build configuration.
///
/// Exactly one `BuildSpec` flows through the whole pipeline by mutable
/// reference. The loader populates it up front; after that, stages may only
/// add, update, or remove entries in `variables` (extensions may additionally
/// read `external_dependencies`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared native dependencies, keyed by dependency name.
    #[serde(default)]
    pub external_dependencies: BTreeMap<String, Dependency>,
    /// Build-time variables, mutated freely by hooks and extensions.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub build: BuildSection,
}

impl BuildSpec {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }
}

/// Descriptor for one native dependency.
///
/// The engine only reads the key set; the descriptor fields are filled in by
/// the loader and must round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The `build` section: hook specifiers plus whatever fields the delegate
/// build backend consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_build: Option<String>,
    /// Backend fields opaque to the hook engine, preserved verbatim.
    #[serde(flatten)]
    pub backend: BTreeMap<String, serde_json::Value>,
}
