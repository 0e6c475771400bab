//! CLI subcommands.

pub mod list;
pub mod run;

use clap::ValueEnum;

/// Output format for command reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// A single JSON document on stdout
    Json,
}
