//! CLI command definitions for sift-recipes
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod show;

use check::CheckArgs;
use clap::{Parser, Subcommand};
use show::ConfigArgs;
use std::path::PathBuf;

/// Validate sift execution recipes and inspect the global config
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (skips the search path)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a recipe, then print it
    Check(CheckArgs),

    /// Load the global config and print it
    Config(ConfigArgs),

    /// Print the job dependencies declared in the global config
    Deps,
}
