//! Configuration module for the cross-build.
//!
//! # Module Structure
//!
//! - `loader`: reads optional TOML overrides from disk
//! - `validator`: checks the merged configuration before any side effect
//!
//! # Configuration Flow
//!
//! 1. `BuildConfig::from_base_dir` produces the fixed defaults
//! 2. An optional `ConfigFile` is layered on top (`apply_overrides`)
//! 3. Command-line switches are applied by the binary
//! 4. `validator::validate_config` runs before the orchestrator starts

pub mod loader;
pub mod validator;

use crate::error::ConfigError;
use crate::models::{BuildConfig, FlagMap, SdkSelection};
use std::path::{Component, Path, PathBuf};

pub use loader::{load_config_file, ConfigFile};

pub const DEFAULT_SOURCE_DIR: &str = "ceres-solver";
pub const DEFAULT_EIGEN_DIR: &str = "eigen-3.2.1";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_INSTALL_DIR: &str = "dist";
pub const DEFAULT_TOOLCHAIN_FILE: &str = "iOS-toolchain.cmake";
pub const DEFAULT_ARCHS: &[&str] = &["armv7"];
pub const DEFAULT_MIN_OS_VERSION: &str = "6.0";
pub const DEFAULT_SDK_PLATFORM: &str = "iphoneos";

impl BuildConfig {
    /// Default layout: every path is a fixed name joined onto `base_dir`.
    ///
    /// A relative `base_dir` is made absolute against the current directory,
    /// since cmake runs with the build directory as its working directory.
    pub fn from_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = absolute_path(&base_dir.into());
        let p = |name: &str| base_dir.join(name);
        BuildConfig {
            source_dir: p(DEFAULT_SOURCE_DIR),
            eigen_include_dir: p(DEFAULT_EIGEN_DIR),
            build_dir: p(DEFAULT_BUILD_DIR),
            install_dir: p(DEFAULT_INSTALL_DIR),
            toolchain_file: p(DEFAULT_TOOLCHAIN_FILE),
            archs: DEFAULT_ARCHS.iter().map(|a| a.to_string()).collect(),
            min_os_version: DEFAULT_MIN_OS_VERSION.to_string(),
            sdk_platform: DEFAULT_SDK_PLATFORM.to_string(),
            sdk_selection: SdkSelection::LastListed,
            compiler_defines: FlagMap::new().with("MINIGLOG", 1),
            install: true,
            inject_toolchain_env: false,
            base_dir,
        }
    }

    /// Resolve `path` against the base directory; absolute paths pass through.
    /// The result is lexically normalized (no `.` or `..` components).
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize_path(&self.base_dir.join(path))
    }

    /// Layer a parsed config file over this configuration.
    ///
    /// Keys absent from the file keep their current value. Defines from the
    /// file are merged into `compiler_defines`, replacing values of existing keys.
    pub fn apply_overrides(&mut self, file: &ConfigFile) -> Result<(), ConfigError> {
        if let Some(ref dir) = file.source_dir {
            self.source_dir = self.resolve(dir);
        }
        if let Some(ref dir) = file.eigen_include_dir {
            self.eigen_include_dir = self.resolve(dir);
        }
        if let Some(ref dir) = file.build_dir {
            self.build_dir = self.resolve(dir);
        }
        if let Some(ref dir) = file.install_dir {
            self.install_dir = self.resolve(dir);
        }
        if let Some(ref tc) = file.toolchain_file {
            self.toolchain_file = self.resolve(tc);
        }
        if let Some(ref archs) = file.archs {
            self.archs = archs.clone();
        }
        if let Some(ref version) = file.min_os_version {
            self.min_os_version = version.clone();
        }
        if let Some(ref platform) = file.sdk_platform {
            self.sdk_platform = platform.clone();
        }
        if let Some(selection) = file.sdk_selection {
            self.sdk_selection = selection;
        }
        if let Some(install) = file.install {
            self.install = install;
        }
        if let Some(inject) = file.inject_toolchain_env {
            self.inject_toolchain_env = inject;
        }
        if let Some(ref defines) = file.compiler_defines {
            for (key, value) in defines {
                self.compiler_defines
                    .insert(key.as_str(), loader::define_value_to_string(key, value)?);
            }
        }
        Ok(())
    }
}

/// Make `path` absolute against the current directory, then normalize it.
///
/// Symlinks are not resolved; the path does not need to exist.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(e) => {
            log::warn!("[Config] Cannot resolve {} against the current directory: {}", path.display(), e);
            normalize_path(path)
        }
    }
}

/// Drop `.` components and fold `..` into the preceding component.
///
/// `..` directly under the root stays at the root; leading `..` of a
/// relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
