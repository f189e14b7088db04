//! Hook classification, dispatch, and orchestration.

pub mod registry;
pub mod runner;
pub mod specifier;

use std::fmt;

use crate::spec::BuildSpec;

/// Which hook field of the build section is being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    BeforeBuild,
    AfterBuild,
}

impl HookStage {
    /// The configuration field name for this stage.
    pub fn field(&self) -> &'static str {
        match self {
            HookStage::BeforeBuild => "before_build",
            HookStage::AfterBuild => "after_build",
        }
    }

    /// The raw specifier value for this stage, if declared.
    pub fn value<'s>(&self, spec: &'s BuildSpec) -> Option<&'s str> {
        match self {
            HookStage::BeforeBuild => spec.build.before_build.as_deref(),
            HookStage::AfterBuild => spec.build.after_build.as_deref(),
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}
