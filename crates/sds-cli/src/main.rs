//! # sds CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sds_cli::token::{run_decode, run_encode, run_keygen, DecodeArgs, EncodeArgs, KeygenArgs};

/// SDS gateway operator CLI.
///
/// Generates codec keys and converts between internal SDS ids and the
/// opaque tokens the gateway hands to callers.
#[derive(Parser, Debug)]
#[command(name = "sds", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new codec key.
    Keygen(KeygenArgs),

    /// Encode an internal id into a token.
    Encode(EncodeArgs),

    /// Decode a token back into its internal id.
    Decode(DecodeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
