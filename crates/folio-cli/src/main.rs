use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::FolioConfig;

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "A scroll-driven page presentation for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of ~/.config/folio/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the presentation (default)
    Run,
    /// Replay a timed list of scroll events headlessly
    Simulate {
        /// Comma-separated events: down@MS, up@MS or goto:INDEX@MS
        #[arg(short = 'e', long, default_value = "down@0,down@500,down@850")]
        events: String,
        /// Frame interval in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
        /// Run against the wall clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
    },
    /// List the pages of the deck
    Pages,
    /// Print the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => FolioConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FolioConfig::load().context("Failed to load config")?,
    };

    // The TUI owns the terminal, so its logs go to a file
    let log_file = match cli.command {
        Some(Commands::Run) | None => Some(FolioConfig::data_dir().join("folio.log")),
        _ => None,
    };
    init_logging(&config.general.log_level, log_file)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(&config),
        Some(Commands::Simulate {
            events,
            frame_ms,
            json,
            realtime,
        }) => {
            if realtime {
                commands::simulate::run_realtime(&config, &events, frame_ms, json).await
            } else {
                commands::simulate::run(&config, &events, frame_ms, json)
            }
        }
        Some(Commands::Pages) => commands::pages::run(&config),
        Some(Commands::Config { init, force }) => {
            commands::config::run(&config, cli.config.as_deref(), init, force)
        }
    }
}

fn init_logging(level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}
