//! Unified error type hierarchy for the Ceres iOS build orchestrator
//!
//! Provides structured error handling with ConfigError and BuildError.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Build orchestration errors.
///
/// Every failure in a run is one of these; the first one aborts the run.
#[derive(Error, Debug)]
pub enum BuildError {
    /// An invoked subprocess exited non-zero, died from a signal, or could not be spawned
    #[error("Command '{cmd}' failed: {reason}")]
    ExternalCommand { cmd: String, reason: String },

    /// SDK discovery found no listing entry for the requested platform
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem operation on the build or install directory failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-facing, single line error message
    pub fn user_message(&self) -> String {
        match self {
            BuildError::ExternalCommand { cmd, reason } => {
                format!("Failed to execute '{}': {}", cmd, reason)
            }
            BuildError::NotFound(msg) => format!("Could not locate {}", msg),
            BuildError::Io { path, source } => {
                format!("File operation failed on {}: {}", path.display(), source)
            }
            BuildError::Config(e) => format!("Configuration error: {}", e),
        }
    }
}

/// Result alias used across the orchestrator.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_command_display() {
        let err = BuildError::ExternalCommand {
            cmd: "make".to_string(),
            reason: "exit status 2".to_string(),
        };
        assert_eq!(err.to_string(), "Command 'make' failed: exit status 2");
        assert_eq!(err.user_message(), "Failed to execute 'make': exit status 2");
    }

    #[test]
    fn test_not_found_display() {
        let err = BuildError::NotFound("SDK matching 'iphoneos'".to_string());
        assert_eq!(err.to_string(), "Not found: SDK matching 'iphoneos'");
    }

    #[test]
    fn test_config_error_wraps_transparently() {
        let err: BuildError = ConfigError::ValidationFailed("no archs".to_string()).into();
        assert_eq!(err.to_string(), "Configuration validation failed: no archs");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = BuildError::io(
            "/tmp/build",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/build"));
    }
}
