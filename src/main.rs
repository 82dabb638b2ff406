// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod cli;

#[derive(Parser)]
#[command(name = "fieldcam")]
#[command(about = "Capture, annotate and scan photos for field records")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan images for a QR code and print its text
    Scan {
        /// Images served as consecutive camera frames
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Also look for light-on-dark codes
        #[arg(long)]
        invert: bool,

        /// Give up after this many milliseconds
        #[arg(long, default_value = "2000")]
        timeout_ms: u64,
    },

    /// Capture a photo from an image and optionally annotate it
    Capture {
        /// Image served as the camera stream
        #[arg(short, long)]
        input: PathBuf,

        /// JSON edit script to replay on the captured photo
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output file or directory (default: ~/Pictures/fieldcam/photo_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Turn the torch on before capturing
        #[arg(long)]
        torch: bool,
    },

    /// Annotate an existing photo
    Edit {
        /// Photo to edit
        input: PathBuf,

        /// JSON edit script to replay
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forward a library image unchanged
    Import {
        /// Image file to import
        input: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=fieldcam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Scan {
            images,
            invert,
            timeout_ms,
        } => rt.block_on(cli::scan(images, invert, Duration::from_millis(timeout_ms))),
        Commands::Capture {
            input,
            script,
            output,
            torch,
        } => rt.block_on(cli::capture(input, script, output, torch)),
        Commands::Edit {
            input,
            script,
            output,
        } => rt.block_on(cli::edit(input, script, output)),
        Commands::Import { input, output } => rt.block_on(cli::import(input, output)),
        Commands::Config => cli::show_config(),
    }
}
