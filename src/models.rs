//! Core data structures: build configuration, flag mappings, toolchain
//! environment and the per-run report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// SDK selection policy applied to the matching lines of the SDK listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SdkSelection {
    /// Last matching line wins. Assumes the listing tool prints SDKs in
    /// ascending version order.
    #[default]
    LastListed,
    /// Highest dotted version at the end of the SDK identifier wins.
    /// Identifiers without a parseable version rank below every versioned
    /// one; among ties the later listed line wins.
    HighestVersion,
}

impl SdkSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkSelection::LastListed => "last-listed",
            SdkSelection::HighestVersion => "highest-version",
        }
    }
}

impl fmt::Display for SdkSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered flag name -> value mapping rendered as `-D<KEY>=<VALUE>` tokens.
///
/// Iteration follows insertion order. Inserting an existing key replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagMap {
    entries: Vec<(String, String)>,
}

impl FlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append every entry of `other`, replacing values of keys already present.
    pub fn extend_from(&mut self, other: &FlagMap) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for FlagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FlagMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Immutable configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root every relative path was resolved against
    pub base_dir: PathBuf,
    /// Ceres Solver source checkout handed to cmake
    pub source_dir: PathBuf,
    /// Eigen headers, passed as EIGEN_INCLUDE_DIR
    pub eigen_include_dir: PathBuf,
    /// Wiped and recreated on every run
    pub build_dir: PathBuf,
    /// CMAKE_INSTALL_PREFIX, created on install if missing
    pub install_dir: PathBuf,
    /// CMake cross-compilation toolchain file (opaque)
    pub toolchain_file: PathBuf,
    pub archs: Vec<String>,
    pub min_os_version: String,
    /// Substring matched against `xcodebuild -showsdks` lines
    pub sdk_platform: String,
    pub sdk_selection: SdkSelection,
    /// Compiler defines appended after EIGEN_INCLUDE_DIR
    pub compiler_defines: FlagMap,
    pub install: bool,
    /// Attach CC/CXX/CFLAGS/CXXFLAGS/LDFLAGS to build subprocesses
    pub inject_toolchain_env: bool,
}

/// Toolchain environment handed to child processes.
///
/// Replaces mutation of the orchestrator's own process environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainEnv {
    pub cc: PathBuf,
    pub cxx: PathBuf,
    /// Shared value of CFLAGS, CXXFLAGS and LDFLAGS
    pub flags: String,
}

impl ToolchainEnv {
    /// Environment pairs in a fixed order.
    pub fn vars(&self) -> Vec<(String, String)> {
        vec![
            ("CC".to_string(), self.cc.to_string_lossy().into_owned()),
            ("CXX".to_string(), self.cxx.to_string_lossy().into_owned()),
            ("CFLAGS".to_string(), self.flags.clone()),
            ("CXXFLAGS".to_string(), self.flags.clone()),
            ("LDFLAGS".to_string(), self.flags.clone()),
        ]
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub phases_completed: Vec<crate::orchestrator::BuildPhaseState>,
    pub sdk_path: Option<PathBuf>,
    pub installed: bool,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_map_preserves_insertion_order() {
        let map = FlagMap::new().with("Z", 1).with("A", 2).with("M", 3);
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_flag_map_reinsert_replaces_in_place() {
        let mut map = FlagMap::new().with("A", 1).with("B", 2);
        map.insert("A", "x");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some("x"));
        assert_eq!(map.iter().next(), Some(("A", "x")));
    }

    #[test]
    fn test_toolchain_env_vars_share_flags() {
        let env = ToolchainEnv {
            cc: PathBuf::from("/tc/clang"),
            cxx: PathBuf::from("/tc/clang++"),
            flags: "-arch armv7".to_string(),
        };
        let vars = env.vars();
        assert_eq!(vars.len(), 5);
        assert_eq!(vars[0], ("CC".to_string(), "/tc/clang".to_string()));
        assert!(vars[2..].iter().all(|(_, v)| v == "-arch armv7"));
    }

    #[test]
    fn test_sdk_selection_default_is_last_listed() {
        assert_eq!(SdkSelection::default(), SdkSelection::LastListed);
        assert_eq!(SdkSelection::HighestVersion.to_string(), "highest-version");
    }
}
