use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use ceres_ios_build::config::{self, validator};
use ceres_ios_build::log_collector::{level_from_env, logs_dir};
use ceres_ios_build::{summarize, BuildConfig, LogCollector, Orchestrator, SdkSelection, SystemRunner};

/// Cross-compile Ceres Solver for iOS with cmake and make.
#[derive(Parser, Debug)]
#[command(name = "ceres-ios-build", version, about)]
struct Cli {
    /// Root that every relative path is resolved against [default: current directory]
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// TOML file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source checkout handed to cmake
    #[arg(long)]
    source: Option<PathBuf>,

    /// Skip `make install`
    #[arg(long)]
    no_install: bool,

    /// How to choose among SDKs matching the platform
    #[arg(long, value_enum)]
    sdk_selection: Option<SdkSelection>,

    /// Pass CC/CXX/CFLAGS/CXXFLAGS/LDFLAGS to the build commands
    #[arg(long)]
    inject_toolchain_env: bool,

    /// Exit with status 1 when the build fails
    #[arg(long)]
    strict_exit: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli, base_dir: PathBuf) -> anyhow::Result<BuildConfig> {
    let mut build_config = BuildConfig::from_base_dir(base_dir);

    if let Some(ref path) = cli.config {
        let path = build_config.resolve(path);
        let file = config::load_config_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        build_config.apply_overrides(&file)?;
    }

    if let Some(ref source) = cli.source {
        build_config.source_dir = build_config.resolve(source);
    }
    if cli.no_install {
        build_config.install = false;
    }
    if let Some(selection) = cli.sdk_selection {
        build_config.sdk_selection = selection;
    }
    if cli.inject_toolchain_env {
        build_config.inject_toolchain_env = true;
    }

    validator::validate_config(&build_config)?;
    Ok(build_config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base_dir = match cli.base_dir {
        Some(ref dir) => config::absolute_path(dir),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        level_from_env(LevelFilter::Info)
    };
    match LogCollector::new(&logs_dir(&base_dir), level) {
        Ok(collector) => {
            if let Err(e) = collector.install() {
                eprintln!("[Main] WARNING: {}", e);
            } else {
                log::debug!("[Main] Session log: {}", collector.session_path().display());
            }
        }
        Err(e) => eprintln!("[Main] WARNING: LogCollector initialization failed: {}", e),
    }

    let build_config = match load_config(&cli, base_dir) {
        Ok(build_config) => build_config,
        Err(e) => {
            log::error!("[Main] {:#}", e);
            log::logger().flush();
            return Err(e);
        }
    };
    let source_dir = build_config.source_dir.clone();
    let install = build_config.install;

    let mut orchestrator = Orchestrator::new(SystemRunner::new(), build_config);
    let outcome = orchestrator.run_build(&source_dir, install);
    match outcome {
        Ok(ref report) => log::info!(
            "[Main] Build finished: {} phases, installed={}, {:.1?}",
            report.phases_completed.len(),
            report.installed,
            report.elapsed
        ),
        Err(ref e) => log::error!("[Main] {}", e.user_message()),
    }

    let summary = summarize(&outcome, cli.strict_exit);
    if let Some(message) = summary.message {
        println!("{}", message);
    }

    log::logger().flush();

    if summary.exit_code != 0 {
        std::process::exit(summary.exit_code);
    }
    Ok(())
}
