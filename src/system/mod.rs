/// System module: external command execution behind the `CommandRunner` seam

pub mod xcode;

use crate::error::{BuildError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// High-level milestone logging, routed to the "parsed" target
#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        $crate::log::info!(target: "parsed", $($arg)*);
    }}
}

/// A single external command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the child; `None` inherits ours
    pub cwd: Option<PathBuf>,
    /// Variables added to the child's environment
    pub envs: Vec<(String, String)>,
    /// Capture stdout/stderr instead of streaming them to the terminal
    pub capture: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.envs.extend(vars);
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the child was terminated by a signal
    pub code: Option<i32>,
    /// Empty unless the command was captured
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn failure_reason(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.trim().lines().last() {
            Some(last) if !last.is_empty() => format!("{} ({})", status, last),
            _ => status,
        }
    }
}

/// Capability to execute external commands.
///
/// The orchestrator only talks to the OS through this trait, so tests can
/// swap in a recording fake.
pub trait CommandRunner {
    /// Execute `spec` to completion. Spawn failures are errors; a non-zero
    /// exit is reported through `CommandOutput::code`.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        (**self).run(spec)
    }
}

/// Run `spec` and turn a non-zero exit into `BuildError::ExternalCommand`.
pub fn run_checked<R: CommandRunner + ?Sized>(runner: &R, spec: &CommandSpec) -> Result<CommandOutput> {
    log::debug!("[System] Running: {}", spec);
    let output = runner.run(spec)?;
    if output.success() {
        Ok(output)
    } else {
        let reason = output.failure_reason();
        log::error!("[System] '{}' {}", spec, reason);
        Err(BuildError::ExternalCommand {
            cmd: spec.to_string(),
            reason,
        })
    }
}

/// Production runner backed by `std::process::Command`.
///
/// Captured commands collect stdout/stderr; everything else inherits the
/// terminal so compiler output streams live.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(ref cwd) = spec.cwd {
            command.current_dir(cwd);
        }
        command.envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let spawn_error = |e: std::io::Error| BuildError::ExternalCommand {
            cmd: spec.to_string(),
            reason: format!("failed to spawn: {}", e),
        };

        if spec.capture {
            let output = command.stdin(Stdio::null()).output().map_err(spawn_error)?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            Ok(CommandOutput {
                code: status.code(),
                ..Default::default()
            })
        }
    }
}
