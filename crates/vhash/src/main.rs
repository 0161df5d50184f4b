//! vhash CLI - perceptual fingerprints for near-duplicate video detection.
//!
//! Each video is sampled at evenly spaced timestamps, every sampled frame is
//! perceptually hashed, and the ordered frame hashes are folded into a
//! single digest. Two videos with the same digest looked the same at every
//! sampled moment.
//!
//! # Usage
//!
//! ```bash
//! # Fingerprint one or more videos
//! vhash hash clip.mp4 other.mkv --strength 4
//!
//! # Inspect what ffprobe reports
//! vhash probe clip.mp4
//!
//! # Compare two videos frame by frame
//! vhash compare a.mp4 b.mp4
//!
//! # View configuration
//! vhash config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// vhash - perceptual fingerprints for near-duplicate video detection.
#[derive(Parser, Debug)]
#[command(name = "vhash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint videos
    Hash(cli::hash::HashArgs),

    /// Print duration and stream metadata for a video
    Probe(cli::probe::ProbeArgs),

    /// Fingerprint two videos and report how closely they match
    Compare(cli::compare::CompareArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match vhash_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vhash config path`."
            );
            vhash_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("vhash v{}", vhash_core::VERSION);

    match cli.command {
        Commands::Hash(args) => cli::hash::execute(config, args).await,
        Commands::Probe(args) => cli::probe::execute(config, args).await,
        Commands::Compare(args) => cli::compare::execute(config, args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
