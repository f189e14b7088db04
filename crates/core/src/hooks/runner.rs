//! The hook pipeline: before-hook, delegate build, after-hook.
//!
//! Three sequential stages with failure short-circuit. A failing
//! `before_build` prevents the delegate build; a failing delegate prevents
//! `after_build`. Side effects of completed stages are never rolled back.

use std::cell::Cell;
use std::path::Path;

use tracing::debug;

use crate::error::HookError;
use crate::hooks::HookStage;
use crate::hooks::registry::HookRegistry;
use crate::hooks::specifier::{self, HookSpec};
use crate::output::Logger;
use crate::spec::BuildSpec;

/// The delegate build backend that compiles and installs the package.
pub trait BuildBackend {
    fn run(&mut self, spec: &mut BuildSpec, no_install: bool) -> anyhow::Result<()>;
}

/// Filesystem existence collaborator.
pub trait FileCheck {
    fn exists(&self, path: &Path) -> bool;
}

/// Checks the real filesystem.
#[derive(Debug, Default)]
pub struct FsCheck;

impl FileCheck for FsCheck {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Script-side failure, split so the runner can report the load and run
/// phases under distinct prefixes.
#[derive(Debug)]
pub enum ScriptError {
    Load(String),
    Run(String),
}

/// Executes a script-path hook against the shared spec.
pub trait ScriptHost {
    fn run_script(&self, path: &Path, spec: &mut BuildSpec) -> Result<(), ScriptError>;
}

/// Orchestrates `before_build` -> delegate build -> `after_build`.
pub struct HookRunner<'a> {
    registry: &'a HookRegistry,
    scripts: &'a dyn ScriptHost,
    files: &'a dyn FileCheck,
    logger: &'a dyn Logger,
    running: Cell<bool>,
}

impl<'a> HookRunner<'a> {
    pub fn new(
        registry: &'a HookRegistry,
        scripts: &'a dyn ScriptHost,
        files: &'a dyn FileCheck,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            registry,
            scripts,
            files,
            logger,
            running: Cell::new(false),
        }
    }

    /// Run the full pipeline over `spec`.
    ///
    /// Re-entrant invocation (a hook triggering `run` on the same runner) is
    /// unsupported and fails loudly instead of corrupting state.
    pub fn run(
        &self,
        spec: &mut BuildSpec,
        backend: &mut dyn BuildBackend,
        no_install: bool,
    ) -> Result<(), HookError> {
        if self.running.replace(true) {
            return Err(HookError::Reentrant);
        }
        let result = self.run_inner(spec, backend, no_install);
        self.running.set(false);
        result
    }

    fn run_inner(
        &self,
        spec: &mut BuildSpec,
        backend: &mut dyn BuildBackend,
        no_install: bool,
    ) -> Result<(), HookError> {
        self.execute_hook(HookStage::BeforeBuild, spec)?;
        backend.run(spec, no_install).map_err(HookError::Build)?;
        self.execute_hook(HookStage::AfterBuild, spec)?;
        Ok(())
    }

    /// Classify and execute one hook stage.
    ///
    /// A successful extension dispatch short-circuits the stage; the
    /// script-path route is never attempted for the same invocation.
    fn execute_hook(&self, stage: HookStage, spec: &mut BuildSpec) -> Result<(), HookError> {
        match specifier::parse(stage.value(spec))? {
            HookSpec::Absent => Ok(()),
            HookSpec::Extension(name) => self.registry.dispatch(&name, spec, self.logger),
            HookSpec::ScriptPath(path) => self.run_script(stage, &path, spec),
        }
    }

    fn run_script(&self, stage: HookStage, path: &str, spec: &mut BuildSpec) -> Result<(), HookError> {
        let script = Path::new(path);
        if !self.files.exists(script) {
            return Err(HookError::ScriptNotFound(path.to_string()));
        }

        self.logger.printout(&format!("running hook: {path}"));
        debug!(stage = %stage, script = %path, "executing hook script");

        self.scripts.run_script(script, spec).map_err(|e| match e {
            ScriptError::Load(cause) => HookError::LoadScript { stage, cause },
            ScriptError::Run(cause) => HookError::RunScript { stage, cause },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::registry::HookProvider;
    use crate::output::MemoryLogger;

    /// Backend that counts invocations and snapshots the variables it saw.
    #[derive(Default)]
    struct RecordingBackend {
        calls: usize,
        seen: Option<std::collections::BTreeMap<String, String>>,
        fail: bool,
    }

    impl BuildBackend for RecordingBackend {
        fn run(&mut self, spec: &mut BuildSpec, _no_install: bool) -> anyhow::Result<()> {
            self.calls += 1;
            self.seen = Some(spec.variables.clone());
            if self.fail {
                anyhow::bail!("delegate build failed")
            }
            Ok(())
        }
    }

    /// Script host that interprets the script path as an instruction.
    struct FakeHost;

    impl ScriptHost for FakeHost {
        fn run_script(&self, path: &Path, spec: &mut BuildSpec) -> Result<(), ScriptError> {
            match path.to_str().unwrap_or("") {
                "set.lua" => {
                    spec.variables.insert("FROM_HOOK".into(), "1".into());
                    Ok(())
                }
                "bad-load.lua" => Err(ScriptError::Load("unexpected symbol".into())),
                _ => Err(ScriptError::Run("runtime fault".into())),
            }
        }
    }

    /// Pretends every path exists.
    struct AllFiles;

    impl FileCheck for AllFiles {
        fn exists(&self, _path: &Path) -> bool {
            true
        }
    }

    struct NoFiles;

    impl FileCheck for NoFiles {
        fn exists(&self, _path: &Path) -> bool {
            false
        }
    }

    fn spec_with_hooks(before: Option<&str>, after: Option<&str>) -> BuildSpec {
        let mut spec = BuildSpec::new("demo");
        spec.build.before_build = before.map(str::to_string);
        spec.build.after_build = after.map(str::to_string);
        spec
    }

    mod pipeline {
        use super::*;

        #[test]
        fn no_hooks_invokes_delegate_once() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(None, None);
            let mut backend = RecordingBackend::default();
            runner.run(&mut spec, &mut backend, false).unwrap();
            assert_eq!(backend.calls, 1);
            assert!(logger.lines().is_empty());
        }

        #[test]
        fn before_hook_mutation_is_visible_to_delegate_and_caller() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(Some("set.lua"), None);
            let mut backend = RecordingBackend::default();
            runner.run(&mut spec, &mut backend, false).unwrap();

            assert_eq!(backend.seen.unwrap()["FROM_HOOK"], "1");
            assert_eq!(spec.variables["FROM_HOOK"], "1");
            assert!(logger.contains("running hook: set.lua"));
        }

        #[test]
        fn before_hook_failure_skips_delegate() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(Some("crash.lua"), None);
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();

            assert_eq!(backend.calls, 0);
            assert_eq!(err.to_string(), "Failed to run before_build: runtime fault");
        }

        #[test]
        fn delegate_failure_skips_after_hook() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(None, Some("set.lua"));
            let mut backend = RecordingBackend {
                fail: true,
                ..RecordingBackend::default()
            };
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();

            assert_eq!(err.to_string(), "delegate build failed");
            // after_build never ran
            assert!(!spec.variables.contains_key("FROM_HOOK"));
            assert!(!logger.contains("running hook"));
        }

        #[test]
        fn after_hook_runs_when_delegate_succeeds() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(None, Some("set.lua"));
            let mut backend = RecordingBackend::default();
            runner.run(&mut spec, &mut backend, false).unwrap();
            assert_eq!(spec.variables["FROM_HOOK"], "1");
        }

        #[test]
        fn after_hook_failure_is_returned_after_delegate_ran() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(None, Some("crash.lua"));
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();

            assert_eq!(backend.calls, 1);
            assert_eq!(err.to_string(), "Failed to run after_build: runtime fault");
        }
    }

    mod script_route {
        use super::*;

        #[test]
        fn missing_script_is_fatal() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &NoFiles, &logger);

            let mut spec = spec_with_hooks(Some("hooks/pre.lua"), None);
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();

            assert_eq!(err.to_string(), "Hook script not found: hooks/pre.lua");
            assert_eq!(backend.calls, 0);
        }

        #[test]
        fn load_failure_names_the_stage() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(Some("bad-load.lua"), None);
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Failed to load before_build: unexpected symbol"
            );
        }
    }

    mod extension_route {
        use super::*;

        #[test]
        fn malformed_specifier_aborts_before_any_execution() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            for raw in ["$(ok)extra", "$(ok"] {
                let mut spec = spec_with_hooks(Some(raw), None);
                let mut backend = RecordingBackend::default();
                let err = runner.run(&mut spec, &mut backend, false).unwrap_err();
                assert_eq!(err.to_string(), "Invalid submodule syntax");
                assert_eq!(backend.calls, 0);
            }

            let mut spec = spec_with_hooks(Some("$()"), None);
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();
            assert_eq!(err.to_string(), "Invalid submodule syntax: missing name");
        }

        #[test]
        fn unknown_extension_is_a_load_failure() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(Some("$(nope)"), None);
            let mut backend = RecordingBackend::default();
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();
            assert!(err.to_string().starts_with("Failed to load submodule nope"));
            assert_eq!(backend.calls, 0);
        }

        #[test]
        fn successful_dispatch_never_touches_the_filesystem() {
            struct Touch;
            impl HookProvider for Touch {
                fn run(&self, spec: &mut BuildSpec, _logger: &dyn Logger) -> anyhow::Result<()> {
                    spec.variables.insert("EXT".into(), "ran".into());
                    Ok(())
                }
            }

            let mut registry = HookRegistry::new();
            registry.register("touch", Box::new(Touch));
            let logger = MemoryLogger::new();
            // NoFiles would fail the script route; dispatch must not reach it
            let runner = HookRunner::new(&registry, &FakeHost, &NoFiles, &logger);

            let mut spec = spec_with_hooks(Some("$(touch)"), None);
            let mut backend = RecordingBackend::default();
            runner.run(&mut spec, &mut backend, false).unwrap();
            assert_eq!(spec.variables["EXT"], "ran");
        }
    }

    mod reentrancy {
        use super::*;

        struct Reenter<'r> {
            runner: &'r HookRunner<'r>,
        }

        impl BuildBackend for Reenter<'_> {
            fn run(&mut self, spec: &mut BuildSpec, _no_install: bool) -> anyhow::Result<()> {
                let mut inner = RecordingBackend::default();
                let mut inner_spec = spec.clone();
                match self.runner.run(&mut inner_spec, &mut inner, false) {
                    Err(HookError::Reentrant) => anyhow::bail!("refused"),
                    other => anyhow::bail!("expected re-entrancy error, got {other:?}"),
                }
            }
        }

        #[test]
        fn nested_run_fails_loudly() {
            let registry = HookRegistry::new();
            let logger = MemoryLogger::new();
            let runner = HookRunner::new(&registry, &FakeHost, &AllFiles, &logger);

            let mut spec = spec_with_hooks(None, None);
            let mut backend = Reenter { runner: &runner };
            let err = runner.run(&mut spec, &mut backend, false).unwrap_err();
            assert_eq!(err.to_string(), "refused");

            // Guard is released; a later run works again
            let mut backend = RecordingBackend::default();
            runner.run(&mut spec, &mut backend, false).unwrap();
            assert_eq!(backend.calls, 1);
        }
    }
}
