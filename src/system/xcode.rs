//! Xcode developer-tools queries: developer root, SDK discovery and the
//! toolchain environment derived from them.

use super::{run_checked, CommandRunner, CommandSpec};
use crate::error::{BuildError, Result};
use crate::models::{BuildConfig, SdkSelection, ToolchainEnv};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const XCODE_SELECT: &str = "xcode-select";
pub const XCODEBUILD: &str = "xcodebuild";

/// Relative to the developer root.
const XCODE_TOOLCHAIN: &str = "Toolchains/XcodeDefault.xctoolchain";

static SDK_VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)*)$").expect("Invalid SDK version regex")
});

/// Active developer directory (`xcode-select --print-path`).
pub fn developer_root<R: CommandRunner + ?Sized>(runner: &R) -> Result<PathBuf> {
    let spec = CommandSpec::new(XCODE_SELECT).arg("--print-path").captured();
    let output = run_checked(runner, &spec)?;
    Ok(PathBuf::from(output.stdout.trim()))
}

/// Pick the SDK identifier out of `xcodebuild -showsdks` output.
///
/// Lines are matched by plain (case-sensitive) substring; the identifier is
/// the last whitespace-separated token of the chosen line.
///
/// With `HighestVersion`, any identifier with a parseable version outranks
/// one without; among equal versions (or when none parse) the later line wins.
pub fn select_sdk_identifier(listing: &str, platform: &str, selection: SdkSelection) -> Result<String> {
    let matches: Vec<&str> = listing.lines().filter(|line| line.contains(platform)).collect();

    let chosen = match selection {
        SdkSelection::LastListed => matches.last().copied(),
        SdkSelection::HighestVersion => matches
            .iter()
            .enumerate()
            .max_by_key(|(idx, line)| (last_token(line).and_then(sdk_version), *idx))
            .map(|(_, line)| *line),
    };

    chosen
        .and_then(last_token)
        .map(str::to_string)
        .ok_or_else(|| BuildError::NotFound(format!("an SDK matching '{}'", platform)))
}

fn last_token(line: &str) -> Option<&str> {
    line.split_whitespace().last()
}

/// Dotted version at the end of an SDK identifier (`iphoneos10.3` -> `[10, 3]`).
pub fn sdk_version(identifier: &str) -> Option<Vec<u32>> {
    let caps = SDK_VERSION_REGEX.captures(identifier)?;
    caps[1].split('.').map(|part| part.parse::<u32>().ok()).collect()
}

/// Resolve the filesystem path of the SDK selected for `platform`.
pub fn resolve_sdk_path<R: CommandRunner + ?Sized>(
    runner: &R,
    platform: &str,
    selection: SdkSelection,
) -> Result<PathBuf> {
    let listing = run_checked(runner, &CommandSpec::new(XCODEBUILD).arg("-showsdks").captured())?;
    let sdk = select_sdk_identifier(&listing.stdout, platform, selection)?;
    log::debug!("[Xcode] Selected SDK '{}' ({})", sdk, selection);

    let spec = CommandSpec::new(XCODEBUILD)
        .args(["-version", "-sdk", sdk.as_str(), "Path"])
        .captured();
    let output = run_checked(runner, &spec)?;
    let path = output.stdout.trim();
    if path.is_empty() {
        return Err(BuildError::NotFound(format!("a filesystem path for SDK '{}'", sdk)));
    }
    log::info!("[Xcode] SDK path: {}", path);
    Ok(PathBuf::from(path))
}

/// Compiler and linker flags shared by CFLAGS, CXXFLAGS and LDFLAGS.
pub fn toolchain_flags(min_os_version: &str, archs: &[String], sdk_path: &Path) -> String {
    let mut flags = vec![format!("-miphoneos-version-min={}", min_os_version)];
    for arch in archs {
        flags.push("-arch".to_string());
        flags.push(arch.clone());
    }
    flags.push("-isysroot".to_string());
    flags.push(sdk_path.to_string_lossy().into_owned());
    flags.join(" ")
}

/// Build the child-process toolchain environment for `config`.
///
/// Returns the environment together with the resolved SDK path.
pub fn toolchain_env<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &BuildConfig,
) -> Result<(ToolchainEnv, PathBuf)> {
    let dev_root = developer_root(runner)?;
    let toolchain_bin = dev_root.join(XCODE_TOOLCHAIN).join("usr/bin");
    let sdk_path = resolve_sdk_path(runner, &config.sdk_platform, config.sdk_selection)?;

    let env = ToolchainEnv {
        cc: toolchain_bin.join("clang"),
        cxx: toolchain_bin.join("clang++"),
        flags: toolchain_flags(&config.min_os_version, &config.archs, &sdk_path),
    };
    Ok((env, sdk_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
iOS SDKs:
\tiOS 9.3                       \t-sdk iphoneos9.3
\tiOS 10.0                      \t-sdk iphoneos10.0

iOS Simulator SDKs:
\tSimulator - iOS 10.0          \t-sdk iphonesimulator10.0
";

    #[test]
    fn test_last_listed_picks_last_match() {
        let id = select_sdk_identifier(LISTING, "iphoneos", SdkSelection::LastListed).unwrap();
        assert_eq!(id, "iphoneos10.0");
    }

    #[test]
    fn test_highest_version_ignores_listing_order() {
        let listing = "iOS 10.0 -sdk iphoneos10.0\niOS 9.3 -sdk iphoneos9.3\n";
        let last = select_sdk_identifier(listing, "iphoneos", SdkSelection::LastListed).unwrap();
        let highest = select_sdk_identifier(listing, "iphoneos", SdkSelection::HighestVersion).unwrap();
        assert_eq!(last, "iphoneos9.3");
        assert_eq!(highest, "iphoneos10.0");
    }

    #[test]
    fn test_highest_version_falls_back_to_listing_order_on_ties() {
        let listing = "a -sdk iphoneos\nb -sdk iphoneos-beta\n";
        let id = select_sdk_identifier(listing, "iphoneos", SdkSelection::HighestVersion).unwrap();
        assert_eq!(id, "iphoneos-beta");
    }

    #[test]
    fn test_highest_version_prefers_versioned_over_later_unversioned() {
        let listing = "iOS 9.3 -sdk iphoneos9.3\niOS beta -sdk iphoneos-beta\n";
        let id = select_sdk_identifier(listing, "iphoneos", SdkSelection::HighestVersion).unwrap();
        assert_eq!(id, "iphoneos9.3");
    }

    #[test]
    fn test_highest_version_equal_versions_take_later_line() {
        let listing = "a -sdk iphoneos-a10.0\nb -sdk iphoneos-b10.0\nc -sdk iphoneos9.3\n";
        let id = select_sdk_identifier(listing, "iphoneos", SdkSelection::HighestVersion).unwrap();
        assert_eq!(id, "iphoneos-b10.0");
    }

    #[test]
    fn test_no_match_is_not_found() {
        let err = select_sdk_identifier(LISTING, "appletvos", SdkSelection::LastListed).unwrap_err();
        assert!(matches!(err, BuildError::NotFound(_)));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let err = select_sdk_identifier(LISTING, "IPHONEOS", SdkSelection::LastListed).unwrap_err();
        assert!(matches!(err, BuildError::NotFound(_)));
    }

    #[test]
    fn test_sdk_version_parsing() {
        assert_eq!(sdk_version("iphoneos10.3"), Some(vec![10, 3]));
        assert_eq!(sdk_version("10.0"), Some(vec![10, 0]));
        assert_eq!(sdk_version("iphoneos"), None);
    }

    #[test]
    fn test_toolchain_flags_layout() {
        let flags = toolchain_flags(
            "6.0",
            &["armv7".to_string(), "arm64".to_string()],
            Path::new("/sdk/iPhoneOS.sdk"),
        );
        assert_eq!(
            flags,
            "-miphoneos-version-min=6.0 -arch armv7 -arch arm64 -isysroot /sdk/iPhoneOS.sdk"
        );
    }
}
