//! `-D<KEY>=<VALUE>` flag construction for the compiler and for cmake.

use crate::models::{BuildConfig, FlagMap};

/// Render each entry as one `-D<key>=<value>` token, in map order.
///
/// Nothing is escaped: tokens go to the child as separate argv entries, and
/// values must not rely on shell quoting.
pub fn build_flags(mapping: &FlagMap) -> Vec<String> {
    mapping
        .iter()
        .map(|(key, value)| format!("-D{}={}", key, value))
        .collect()
}

/// EIGEN_INCLUDE_DIR followed by the configured compiler defines.
pub fn compiler_flag_map(config: &BuildConfig) -> FlagMap {
    let mut map = FlagMap::new().with(
        "EIGEN_INCLUDE_DIR",
        config.eigen_include_dir.to_string_lossy(),
    );
    map.extend_from(&config.compiler_defines);
    map
}

pub fn cmake_flag_map(config: &BuildConfig) -> FlagMap {
    FlagMap::new()
        .with("CMAKE_TOOLCHAIN_FILE", config.toolchain_file.to_string_lossy())
        .with("CMAKE_INSTALL_PREFIX", config.install_dir.to_string_lossy())
}

pub fn compiler_flags(config: &BuildConfig) -> Vec<String> {
    build_flags(&compiler_flag_map(config))
}

pub fn cmake_flags(config: &BuildConfig) -> Vec<String> {
    build_flags(&cmake_flag_map(config))
}
