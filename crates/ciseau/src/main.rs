//! # ciseau
//!
//! Ciseau - Scope-aware codemods for JavaScript and JSX.
//!
//! ## Name Origin
//!
//! A **ciseau** is the sculptor's chisel: it takes away only what has to
//! go. This crate is the command-line front end that finds source files,
//! runs the selected codemods over them in parallel and writes the results
//! back.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ciseau")]
#[command(about = "Scope-aware codemods for JavaScript and JSX", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),

    /// Log every skipped rewrite and its reason (overridden by CISEAU_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run codemods over source files (default command)
    Run(commands::run::RunArgs),

    /// List the available codemods
    List(commands::list::ListArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Run(args)) => commands::run::run(args),
        Some(Commands::List(args)) => commands::list::run(args),
        None => {
            // Default to run command with default args
            commands::run::run(commands::run::RunArgs::default());
        }
    }
}

/// Install a stderr subscriber filtered by `CISEAU_LOG`
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CISEAU_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
