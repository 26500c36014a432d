//! sift-recipes
//!
//! Validates execution recipes and inspects the global config of a sift
//! deployment.

use anyhow::Result;
use clap::Parser;
use sift_recipes::cli::check::run_check;
use sift_recipes::cli::show::{run_config, run_deps};
use sift_recipes::cli::{Cli, Command};
use sift_recipes::config::ConfigProvider;
use sift_recipes::error::{ConfigError, ErrorCode, RecipeError};
use sift_recipes::logging::{LogTarget, init_logging};
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("Warning: could not initialize logging: {e}");
    }

    match run(cli) {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", error_code(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let provider = ConfigProvider::discover();

    // An explicit config replaces whatever the search path would find, for
    // every command that touches the config afterwards.
    if let Some(path) = &cli.config {
        debug!(path = %path.display(), "Using explicit config");
        provider.ensure_loaded(Some(path.as_path()))?;
    }

    match cli.command {
        Command::Check(args) => run_check(&provider, &args),
        Command::Config(args) => run_config(&provider, &args),
        Command::Deps => run_deps(&provider),
    }
}

/// Machine-readable code for an error surfaced to the operator.
fn error_code(err: &anyhow::Error) -> ErrorCode {
    if let Some(recipe_err) = err.downcast_ref::<RecipeError>() {
        return recipe_err.code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return ErrorCode::Configuration;
    }
    ErrorCode::Internal
}
