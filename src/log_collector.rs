//! Decoupled logging pipeline for build runs.
//!
//! ```text
//! log::info!() / log_parsed!()
//!     |
//! [LogCollector] (log::Log impl, echoes to stderr)
//!     | (crossbeam channel)
//!     v
//! [DiskPersister thread] -> logs/ceres-build_<ts>.log
//! ```
//!
//! Every accepted record reaches the session file even though the build
//! itself runs on the main thread. `flush()` blocks until the persister has
//! written everything sent before it.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the log level (`error` .. `trace`).
pub const LOG_LEVEL_ENV: &str = "CERES_BUILD_LOG";

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker with channel sender to signal completion
    Flush(std::sync::mpsc::Sender<()>),
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    /// "full" or "parsed"
    pub log_type: String,
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            log_type: "full".to_string(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            log_type: "parsed".to_string(),
            ..LogLine::new(message)
        }
    }
}

/// Default logs directory: `<base>/logs`
pub fn logs_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("logs")
}

/// Level from `CERES_BUILD_LOG`, falling back to `default`.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(default)
}

/// Unified logger that echoes to stderr and persists to the session file
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    session_path: PathBuf,
    level: LevelFilter,
}

impl LogCollector {
    /// Create the session log file under `log_dir` and start the persister thread
    pub fn new(log_dir: &Path, level: LevelFilter) -> Result<Self, String> {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create logs directory: {}", e))?;

        let session_path = log_dir.join(format!(
            "ceres-build_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&session_path)
            .map_err(|e| format!("Failed to open log file {}: {}", session_path.display(), e))?;

        let (tx, rx) = unbounded::<LogMessage>();

        std::thread::spawn(move || {
            let mut file: File = file;
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = if line.log_type == "parsed" {
                            format!("[{}] ==> {}\n", line.timestamp, line.message)
                        } else {
                            format!("[{}] {}\n", line.timestamp, line.message)
                        };
                        let _ = file.write_all(formatted.as_bytes());
                    }
                    LogMessage::Flush(done) => {
                        let _ = file.flush();
                        let _ = done.send(());
                    }
                }
            }
        });

        Ok(LogCollector {
            tx,
            session_path,
            level,
        })
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Send a log line (non-blocking)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Block until every line sent so far is on disk
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }

    /// Register a clone of this collector as the global `log` backend
    pub fn install(&self) -> Result<(), String> {
        log::set_boxed_logger(Box::new(self.clone()))
            .map(|()| log::set_max_level(self.level))
            .map_err(|e| format!("Failed to set global logger: {}", e))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if record.target() == "parsed" {
            let message = record.args().to_string();
            eprintln!("==> {}", message);
            self.log_line(LogLine::parsed(message));
        } else {
            let message = format!("[{}] {}", record.level(), record.args());
            eprintln!("{}", message);
            self.log_line(LogLine::new(message));
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}
