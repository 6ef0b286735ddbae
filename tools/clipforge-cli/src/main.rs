//! Clipforge CLI: render clip compilations through ffmpeg.
//!
//! Usage:
//!   clipforge check                 Check the engine and show the configuration
//!   clipforge validate <REQUEST>    Validate a render request
//!   clipforge plan <REQUEST>        Print the engine invocations a request needs
//!   clipforge render <REQUEST>      Render a request and wait for the result
//!   clipforge init <REQUEST>        Write a template render request

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clipforge_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipforge",
    about = "Trim, concatenate and caption clips with ffmpeg",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the engine can be started and show the effective configuration
    Check,

    /// Validate a render request without rendering it
    Validate {
        /// Path to the request JSON
        request: PathBuf,
    },

    /// Print every stage and engine invocation of a request
    Plan {
        /// Path to the request JSON
        request: PathBuf,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a request and wait until it finishes
    Render {
        /// Path to the request JSON
        request: PathBuf,

        /// Override the output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Polling interval for progress (milliseconds)
        #[arg(long, default_value = "250")]
        poll_ms: u64,
    },

    /// Write a template render request
    Init {
        /// Where to write the request JSON
        request: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    clipforge_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Check => commands::check::run(&config),
        Commands::Validate { request } => commands::validate::run(request),
        Commands::Plan { request, json } => commands::plan::run(&config, request, json),
        Commands::Render {
            request,
            output_dir,
            poll_ms,
        } => {
            if let Some(dir) = output_dir {
                config.render.work_dir = dir.join(".work");
                config.render.output_dir = dir;
            }
            commands::render::run(&config, request, poll_ms).await
        }
        Commands::Init { request, force } => commands::init::run(request, force),
    }
}
