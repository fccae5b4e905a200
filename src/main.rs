// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};

use crate::app_config::Config;
use crate::node::ClusterNode;
use crate::status::{NodeState, StatusWriter};

mod app_config;
mod decoder;
mod errors;
mod language_utils;
mod node;
mod scheduler;
mod status;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the cluster node (default command)
    #[command(alias = "serve")]
    Run(RunArgs),

    /// Generate shell completions for nmt-node
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// Engine name this node serves
    #[arg(short, long)]
    engine: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Path of the JSON status file
    #[arg(long)]
    status_file: Option<String>,

    /// Maximum number of pending jobs before admission is rejected
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Number of decoder worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// nmt-node - Neural machine-translation cluster node
///
/// Runs the dispatch core of an MT cluster node: accepts translation
/// requests, schedules them as decoder jobs under admission control, and
/// reports node health to a status file.
#[derive(Parser, Debug)]
#[command(name = "nmt-node")]
#[command(version = "0.1.0")]
#[command(about = "Neural MT cluster node")]
#[command(long_about = "nmt-node runs the translation scheduler of a neural MT cluster node.

EXAMPLES:
    nmt-node                                  # Run with default config
    nmt-node -e europarl                      # Serve the 'europarl' engine
    nmt-node --queue-capacity 1024 -w 8       # Tune scheduler capacity and workers
    nmt-node --status-file /run/node.json     # Write status snapshots elsewhere
    nmt-node --log-level debug                # Verbose logging
    nmt-node completions bash > nmt-node.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "nmt-node", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_node(args).await,
        None => run_node(cli.run).await,
    }
}

async fn run_node(options: RunArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(to_level_filter(&level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .save(config_path)
            .context("Failed to write default config")?;
        config
    };

    // Override config with CLI options if provided
    if let Some(engine) = &options.engine {
        config.engine = engine.clone();
    }
    if let Some(status_file) = &options.status_file {
        config.status.file = status_file.clone();
    }
    if let Some(queue_capacity) = options.queue_capacity {
        config.scheduler.queue_capacity = queue_capacity;
    }
    if let Some(workers) = options.workers {
        config.decoder.workers = workers;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(to_level_filter(&config.log_level));
    }

    let status_writer = StatusWriter::new(&config.status.file);
    let status_interval = Duration::from_secs(config.status.interval_secs);

    let node = ClusterNode::with_config(config)?;
    node.start();
    if let Err(e) = status_writer.write(&node.status()) {
        warn!("Failed to write status file: {}", e);
    }

    // Refresh the status file until a shutdown signal arrives
    let mut interval = tokio::time::interval(status_interval);
    interval.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = status_writer.write(&node.status()) {
                    warn!("Failed to write status file: {}", e);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Shutdown signal received"),
                    Err(e) => error!("Failed to listen for shutdown signal: {}", e),
                }
                break;
            }
        }
    }

    node.shutdown();

    // Final snapshot so supervisors see the node stopped cleanly
    let mut final_status = node.status();
    final_status.state = NodeState::Stopped;
    if let Err(e) = status_writer.write(&final_status) {
        warn!("Failed to write final status file: {}", e);
    }

    Ok(())
}
