//! Screenlab Control - terminal front-end for the baggage screening study.
//!
//! All rendering and input collection lives here; protocol rules and state
//! live in screenlab_common and are driven through its transition methods.

mod commands;
mod display;
mod prompts;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screenlabctl")]
#[command(about = "Baggage screening study - terminal instrument", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive study protocol
    Run,

    /// Run the batch verification harness
    Verify {
        /// Override the configured trial count
        #[arg(long)]
        trials: Option<usize>,
    },

    /// Summarize a previously exported results file
    Report {
        /// Path to a results CSV
        file: PathBuf,
    },

    /// Show the active configuration
    Config {
        /// Also show the config file search paths
        #[arg(long)]
        paths: bool,
    },
}

fn main() -> Result<()> {
    // Silent unless RUST_LOG asks for diagnostics; the interactive surface
    // owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => commands::run(),
        Commands::Verify { trials } => commands::verify(trials),
        Commands::Report { file } => commands::report(&file),
        Commands::Config { paths } => commands::config(paths),
    }
}
