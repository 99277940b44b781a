//! Build Orchestration: linear pipeline (Preparation -> Configuration -> Building -> Installation).
//!
//! The first failing step ends the run; nothing is retried and the build
//! directory is left as-is for inspection.

pub mod build_dir;
pub mod flags;
pub mod state;

use std::path::{Path, PathBuf};

pub use build_dir::{ensure_directory, reset_build_directory};
pub use flags::{build_flags, cmake_flags, compiler_flags};
pub use state::{BuildPhaseState, OrchestrationState};

use crate::config::absolute_path;
use crate::error::Result;
use crate::log_parsed;
use crate::models::{BuildConfig, BuildReport};
use crate::system::{run_checked, xcode, CommandRunner, CommandSpec};

pub const CMAKE: &str = "cmake";
pub const MAKE: &str = "make";

/// Line printed to stdout when a build fails.
pub const BUILD_FAILED_MESSAGE: &str = "Build failed.";

/// Drives one cross-build through an injected command runner.
pub struct Orchestrator<R: CommandRunner> {
    runner: R,
    config: BuildConfig,
    state: OrchestrationState,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, config: BuildConfig) -> Self {
        Orchestrator {
            runner,
            config,
            state: OrchestrationState::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// State of the last (or current) run.
    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    /// Resolve the SDK path for the configured platform and selection policy.
    pub fn resolve_sdk_path(&self) -> Result<PathBuf> {
        xcode::resolve_sdk_path(&self.runner, &self.config.sdk_platform, self.config.sdk_selection)
    }

    /// Run the full pipeline against `source_path`.
    ///
    /// On failure the error is recorded in `state()` and returned; steps
    /// after the failing one are never started.
    pub fn run_build(&mut self, source_path: &Path, install: bool) -> Result<BuildReport> {
        self.state = OrchestrationState::new();
        match self.execute(source_path, install) {
            Ok(report) => Ok(report),
            Err(e) => {
                log::error!("[Orchestrator] {} phase failed: {}", self.state.phase.as_str(), e);
                self.state.record_error(e.user_message());
                Err(e)
            }
        }
    }

    fn execute(&mut self, source_path: &Path, install: bool) -> Result<BuildReport> {
        // cmake runs inside the build directory, so relative paths would
        // resolve against the wrong root
        let build_dir = absolute_path(&self.config.build_dir);
        let source_path = absolute_path(source_path);

        log_parsed!("Preparing build directory {}", build_dir.display());
        reset_build_directory(&build_dir)?;

        let compiler_flags = compiler_flags(&self.config);
        let cmake_flags = cmake_flags(&self.config);

        let (env, sdk_path) = if self.config.inject_toolchain_env {
            let (env, sdk_path) = xcode::toolchain_env(&self.runner, &self.config)?;
            log::debug!("[Orchestrator] Toolchain env: {:?}", env);
            (env.vars(), Some(sdk_path))
        } else {
            (Vec::new(), None)
        };

        let step = |program: &str| {
            CommandSpec::new(program)
                .current_dir(&build_dir)
                .envs(env.clone())
        };

        self.advance(BuildPhaseState::Configuration);
        log_parsed!("Configuring {} with cmake", source_path.display());
        let cmake = step(CMAKE)
            .args(cmake_flags)
            .args(compiler_flags)
            .arg(source_path.to_string_lossy());
        run_checked(&self.runner, &cmake)?;

        self.advance(BuildPhaseState::Building);
        log_parsed!("Building with make");
        run_checked(&self.runner, &step(MAKE))?;

        if install {
            self.advance(BuildPhaseState::Installation);
            if ensure_directory(&self.config.install_dir)? {
                log::info!("[Orchestrator] Created install directory {}", self.config.install_dir.display());
            }
            log_parsed!("Installing to {}", self.config.install_dir.display());
            run_checked(&self.runner, &step(MAKE).arg("install"))?;
        }

        self.advance(BuildPhaseState::Completed);
        log_parsed!("Build completed in {:.1?}", self.state.elapsed());

        Ok(BuildReport {
            phases_completed: self.state.completed.clone(),
            sdk_path,
            installed: install,
            elapsed: self.state.elapsed(),
        })
    }

    fn advance(&mut self, next: BuildPhaseState) {
        if let Err(e) = self.state.transition_to(next) {
            log::warn!("[Orchestrator] {}", e);
        }
    }
}

/// What the binary reports once a run has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Line for stdout, if any.
    pub message: Option<&'static str>,
    pub exit_code: i32,
}

/// Map a build outcome to the user-facing report.
///
/// A failed build prints `Build failed.` and still exits 0 unless
/// `strict_exit` is set.
pub fn summarize(outcome: &Result<BuildReport>, strict_exit: bool) -> RunSummary {
    match outcome {
        Ok(_) => RunSummary {
            message: None,
            exit_code: 0,
        },
        Err(_) => RunSummary {
            message: Some(BUILD_FAILED_MESSAGE),
            exit_code: if strict_exit { 1 } else { 0 },
        },
    }
}
