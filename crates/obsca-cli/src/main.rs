//! # obsca CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use obsca_cli::profile::{run_profile, ProfileArgs};
use obsca_cli::resolve::{run_resolve, ResolveArgs};
use obsca_cli::simulate::{run_simulate, SimulateArgs};

/// Open-banking SCA authorisation engine CLI.
///
/// Validates ASPSP profiles, shows how preference headers resolve to an
/// SCA approach, and runs scenarios against the sandbox bank.
#[derive(Parser, Debug)]
#[command(name = "obsca", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load, validate and print an ASPSP profile.
    Profile(ProfileArgs),

    /// Resolve the SCA approach for a set of preference headers.
    Resolve(ResolveArgs),

    /// Run an SCA scenario end to end against the sandbox bank.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

    tracing::debug!("obsca CLI starting");

    let result = match cli.command {
        Commands::Profile(args) => run_profile(&args),
        Commands::Resolve(args) => run_resolve(&args),
        Commands::Simulate(args) => run_simulate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
