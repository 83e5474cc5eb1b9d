//! Gazemouse CLI — Command-line interface for the gaze-driven pointer.
//!
//! Usage:
//!   gazemouse run <FRAMES>        Replay a recording through the control loop
//!   gazemouse inspect <FRAMES>    Show per-frame vectors, gates and events
//!   gazemouse validate <FRAMES>   Validate a blendshape recording
//!   gazemouse config <ACTION>     Show, locate or initialize the config file
//!   gazemouse check               Check configuration and audio setup

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gazemouse_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "gazemouse",
    about = "Hands-free pointer control from facial blendshapes",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a blendshape recording through the detector and control loops
    Run {
        /// Path to a JSONL frame recording
        frames: PathBuf,

        /// Release frames at their recorded timestamps
        #[arg(long)]
        realtime: bool,

        /// Emit directional nudge cues
        #[arg(long)]
        directional: bool,

        /// Print the session summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the mapper sees in each frame
    Inspect {
        /// Path to a JSONL frame recording
        frames: PathBuf,

        /// Only show the first N frames
        #[arg(short, long)]
        limit: Option<usize>,

        /// Emit directional nudge cues
        #[arg(long)]
        directional: bool,
    },

    /// Validate a blendshape recording
    Validate {
        /// Path to a JSONL frame recording
        frames: PathBuf,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check configuration, cadence and audio setup
    Check,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match &cli.config {
        Some(path) => (
            AppConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None,
        ),
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    gazemouse_common::logging::init_logging(&logging);

    if let Some(e) = load_error {
        tracing::warn!(
            "Ignoring config at {:?}, using defaults: {}",
            gazemouse_common::config::config_file_path(),
            e
        );
    }

    match cli.command {
        Commands::Run {
            frames,
            realtime,
            directional,
            json,
        } => commands::run::run(config, frames, realtime, directional, json).await,
        Commands::Inspect {
            frames,
            limit,
            directional,
        } => commands::inspect::run(config, frames, limit, directional),
        Commands::Validate { frames } => commands::validate::run(frames),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Path => commands::config::path(cli.config),
            ConfigAction::Init { force } => commands::config::init(cli.config, force),
        },
        Commands::Check => commands::check::run(&config),
    }
}
