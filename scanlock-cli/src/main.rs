//! # scanlock-cli
//!
//! CLI tool for testing scanlock video-link scrambling.
//!
//! ## Commands
//!
//! - `loopback`: run a full transmitter→receiver software loopback
//! - `selftest`: check cipher consistency against a fixed test pattern
//! - `keystream`: dump the first keystream words for a key
//!
//! ## Example
//!
//! ```bash
//! # Verify a picture survives a 3-frame loopback
//! scanlock loopback --frames 3 --lines 5
//!
//! # Compare protocol constants across two builds
//! scanlock keystream --key 123456789ABCDEF0 -n 4
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{keystream, loopback, selftest};

/// CLI tool for testing scanlock video-link scrambling.
#[derive(Parser, Debug)]
#[command(name = "scanlock")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a transmitter→receiver software loopback and verify the picture
    Loopback {
        /// Number of frames to send
        #[arg(long, default_value_t = 3)]
        frames: u32,

        /// Lines per frame
        #[arg(long, default_value_t = 5)]
        lines: u32,

        /// Link config TOML file (role is ignored; both sides are run)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pre-shared key as hex (overrides the config file)
        #[arg(long)]
        key: Option<String>,

        /// Line width in bytes (overrides the config file)
        #[arg(long)]
        width: Option<usize>,
    },

    /// Check cipher consistency against a fixed test pattern
    Selftest,

    /// Print the first N keystream words for a key
    Keystream {
        /// Pre-shared key as hex
        #[arg(long, default_value = "123456789ABCDEF0")]
        key: String,

        /// Number of words to print
        #[arg(long, short = 'n', default_value_t = 8)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Loopback {
            frames,
            lines,
            config,
            key,
            width,
        } => loopback::run(frames, lines, config, key, width).await,
        Commands::Selftest => selftest::run(),
        Commands::Keystream { key, count } => keystream::run(&key, count),
    }
}
