//! Ceres iOS cross-build orchestrator
//!
//! Configures and drives cmake/make to cross-compile Ceres Solver for iOS.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures and types
//! - **config**: Default layout, TOML overrides, validation
//! - **system**: External command execution and Xcode SDK discovery
//! - **orchestrator**: Flag construction, build directory lifecycle, build pipeline
//! - **log_collector**: `log` backend with a per-run session file

pub mod error;
pub mod models;

pub mod config;

pub mod system;

pub mod log_collector;

pub mod orchestrator;

// Re-export the log crate for macro usage
pub use log;

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{BuildError, ConfigError, Result};

pub use models::{BuildConfig, BuildReport, FlagMap, SdkSelection, ToolchainEnv};

pub use system::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};

pub use log_collector::{LogCollector, LogLine};

pub use orchestrator::{
    build_flags, cmake_flags, compiler_flags, reset_build_directory, summarize, BuildPhaseState,
    Orchestrator, RunSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
