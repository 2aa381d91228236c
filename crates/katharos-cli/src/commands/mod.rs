//! CLI commands and argument parsing.

pub mod clean;

use clap::{Parser, Subcommand};

/// Katharos - Registry tag retention for the Themis platform
#[derive(Parser)]
#[command(name = "katharos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Remove stale tags from Docker Hub repositories
    Clean(clean::CleanArgs),

    /// Print version information
    Version,
}
