//! Config validation.

use super::absolute_path;
use crate::error::ConfigError;
use crate::models::{BuildConfig, FlagMap};

/// Validate every field of a merged configuration.
pub fn validate_config(config: &BuildConfig) -> Result<(), ConfigError> {
    validate_archs(&config.archs)?;

    if config.min_os_version.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Minimum OS version cannot be empty".to_string(),
        ));
    }

    if config.sdk_platform.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "SDK platform filter cannot be empty".to_string(),
        ));
    }

    validate_build_dir(config)?;
    validate_defines(&config.compiler_defines)?;
    Ok(())
}

/// At least one architecture, each a single token.
pub fn validate_archs(archs: &[String]) -> Result<(), ConfigError> {
    if archs.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "At least one target architecture is required".to_string(),
        ));
    }
    for arch in archs {
        if arch.is_empty() || arch.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid architecture name: '{}'",
                arch
            )));
        }
    }
    Ok(())
}

/// The build directory is wiped on every run, so it must not be (or contain)
/// the base directory or the source checkout.
///
/// Paths are compared after lexical normalization, so `..` components cannot
/// hide an ancestor of a protected directory.
pub fn validate_build_dir(config: &BuildConfig) -> Result<(), ConfigError> {
    if config.build_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Build directory cannot be empty".to_string(),
        ));
    }
    let build_dir = absolute_path(&config.build_dir);
    for (label, protected) in [("base", &config.base_dir), ("source", &config.source_dir)] {
        let protected = absolute_path(protected);
        if protected.starts_with(&build_dir) {
            return Err(ConfigError::ValidationFailed(format!(
                "Build directory {} would wipe the {} directory {}",
                build_dir.display(),
                label,
                protected.display()
            )));
        }
    }
    Ok(())
}

/// Define keys are passed as `-D<KEY>=...` without escaping.
pub fn validate_defines(defines: &FlagMap) -> Result<(), ConfigError> {
    for (key, _) in defines.iter() {
        if key.is_empty() || key.contains('=') || key.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid define name: '{}'",
                key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        let config = BuildConfig::from_base_dir("/work");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_archs_rejected() {
        let mut config = BuildConfig::from_base_dir("/work");
        config.archs.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_arch_with_space_rejected() {
        assert!(validate_archs(&["arm v7".to_string()]).is_err());
    }

    #[test]
    fn test_build_dir_equal_to_base_rejected() {
        let mut config = BuildConfig::from_base_dir("/work");
        config.build_dir = PathBuf::from("/work");
        assert!(validate_build_dir(&config).is_err());
    }

    #[test]
    fn test_build_dir_containing_source_rejected() {
        let mut config = BuildConfig::from_base_dir("/work");
        config.source_dir = PathBuf::from("/work/build/ceres-solver");
        assert!(validate_build_dir(&config).is_err());
    }

    #[test]
    fn test_build_dir_parent_of_base_rejected() {
        let mut config = BuildConfig::from_base_dir("/work/ceres");
        config.build_dir = config.resolve("..");
        assert_eq!(config.build_dir, PathBuf::from("/work"));
        assert!(validate_build_dir(&config).is_err());
    }

    #[test]
    fn test_unnormalized_parent_build_dir_rejected() {
        let mut config = BuildConfig::from_base_dir("/work/ceres");
        config.build_dir = PathBuf::from("/work/ceres/..");
        assert!(validate_build_dir(&config).is_err());

        config.build_dir = PathBuf::from("/work/ceres/build/../../ceres");
        assert!(validate_build_dir(&config).is_err());
    }

    #[test]
    fn test_sibling_build_dir_accepted() {
        let mut config = BuildConfig::from_base_dir("/work/ceres");
        config.build_dir = config.resolve("../ceres-build");
        assert!(validate_build_dir(&config).is_ok());
    }

    #[test]
    fn test_define_key_with_equals_rejected() {
        let defines = FlagMap::new().with("A=B", 1);
        assert!(validate_defines(&defines).is_err());
    }
}
