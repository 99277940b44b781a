//! Shared test fixtures: a scripted, recording `CommandRunner`.

#![allow(dead_code)]

use ceres_ios_build::{CommandOutput, CommandRunner, CommandSpec, Result};
use std::cell::RefCell;

/// Records every command and answers from a prefix-keyed script.
///
/// The longest scripted prefix of the rendered command line wins; unscripted
/// commands succeed with empty output.
#[derive(Default)]
pub struct MockRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        ));
        self
    }

    pub fn fail(mut self, prefix: &str, code: i32) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: format!("{} exploded", prefix),
            },
        ));
        self
    }

    /// Canned Xcode answers: developer root, SDK listing and SDK path.
    pub fn with_xcode(self, listing: &str, sdk_path: &str) -> Self {
        self.respond("xcode-select --print-path", "/Applications/Xcode.app/Contents/Developer\n")
            .respond("xcodebuild -showsdks", listing)
            .respond("xcodebuild -version -sdk", &format!("{}\n", sdk_path))
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines, in invocation order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        let line = spec.to_string();
        let output = self
            .responses
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .unwrap_or(CommandOutput {
                code: Some(0),
                ..Default::default()
            });
        Ok(output)
    }
}

pub const IOS_LISTING: &str = "\
iOS SDKs:
\tiOS 9.0                       \t-sdk iphoneos9.0
\tiOS 10.0                      \t-sdk iphoneos10.0

iOS Simulator SDKs:
\tSimulator - iOS 10.0          \t-sdk iphonesimulator10.0
";

pub const SDK_PATH: &str =
    "/Applications/Xcode.app/Contents/Developer/Platforms/iPhoneOS.platform/Developer/SDKs/iPhoneOS10.0.sdk";
