//! cnc-intake - validate CAD/mesh files the way the upload widget does
//!
//! Only file names and sizes are read; file contents are never opened.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cnc_intake::config::{self, IntakeConfig};
use cnc_intake::events::LoggingEventHandler;
use cnc_intake::intake::{
    format_size, IntakeReport, IntakeSession, SelectedFile, SimulatedTransport, MAX_FILE_SIZE,
    PICKER_ACCEPT, SUPPORTED_FORMATS,
};
use cnc_intake::logging;
use cnc_intake::shutdown::ShutdownCoordinator;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "cnc-intake")]
#[command(about = "Upload intake checks for CNC part designs")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.cnc-intake/config.json)
    #[arg(long, global = true, env = "CNC_INTAKE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch of local files through intake
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the intake report as JSON
        #[arg(long)]
        json: bool,

        /// Hand accepted files to the simulated transport afterwards
        #[arg(long)]
        dispatch: bool,
    },
    /// List supported formats and the picker filter
    Formats,
    /// Format a byte count
    Size { bytes: u64 },
    /// Show recent intake log entries, newest first
    Logs {
        #[arg(short = 'n', long, default_value_t = 20)]
        lines: usize,
    },
    /// Print the effective configuration
    Config {
        /// Write the defaults to ~/.cnc-intake/config.json first
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    if let Err(e) = logging::init_logging(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match args.command {
        Command::Check {
            paths,
            json,
            dispatch,
        } => run_check(&config, paths, json, dispatch).await,
        Command::Formats => {
            println!("Supported formats: {}", SUPPORTED_FORMATS.join(", "));
            println!("Picker filter:     {}", PICKER_ACCEPT);
            println!("Max file size:     {}", format_size(MAX_FILE_SIZE));
            Ok(ExitCode::SUCCESS)
        }
        Command::Size { bytes } => {
            println!("{}", format_size(bytes));
            Ok(ExitCode::SUCCESS)
        }
        Command::Logs { lines } => {
            let entries = logging::read_component_logs("intake", Some(lines))
                .context("Failed to read intake log")?;
            for entry in entries {
                println!("{} {:5} {}", entry.timestamp, entry.level, entry.message);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { reset } => {
            let config = if reset {
                let defaults = IntakeConfig::default();
                config::save_config(&defaults).context("Failed to save configuration")?;
                info!("Configuration reset to defaults");
                defaults
            } else {
                config
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_check(
    config: &IntakeConfig,
    paths: Vec<PathBuf>,
    json: bool,
    dispatch: bool,
) -> Result<ExitCode> {
    let shutdown = ShutdownCoordinator::new();
    let session = IntakeSession::new(config);
    let handler = LoggingEventHandler::new(session.event_bus().clone(), shutdown.clone()).start();

    let mut selected = Vec::with_capacity(paths.len());
    let mut unreadable = 0usize;
    for path in &paths {
        match SelectedFile::from_path(path) {
            Ok(file) => selected.push(file),
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    info!("Checking {} file(s)", selected.len());
    let report = session.intake(selected);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report);
    }

    if dispatch && !report.accepted.is_empty() {
        let transport = SimulatedTransport::new(config.simulated_transport_delay());
        let summary = session.dispatch(&transport).await;
        info!(
            "Dispatched {} file(s), {} failed",
            summary.sent,
            summary.failed.len()
        );
    }

    session.teardown();
    shutdown.shutdown();
    if let Err(e) = handler.await {
        error!("Event handler task failed: {}", e);
    }

    if report.has_rejections() || unreadable > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_report(report: &IntakeReport) {
    for file in &report.accepted {
        println!(
            "  ok    {}  {}  {}",
            file.name,
            format_size(file.size_bytes),
            file.extension_upper
        );
    }
    for reason in &report.rejected_reasons {
        println!("  skip  {}", reason);
    }

    if report.has_rejections() {
        println!("Some files couldn't be uploaded");
    } else if !report.accepted.is_empty() {
        println!("Files uploaded successfully!");
    }
}
