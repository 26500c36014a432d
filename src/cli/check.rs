//! `check` subcommand: load, validate and print a recipe.

use crate::config::ConfigProvider;
use crate::error::RecipeResult;
use crate::format::{OutputFormat, render};
use crate::recipe::{MissingGlobalsPolicy, Recipe, RecipeLoader};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Recipe file to validate (default: the built-in recipe)
    #[arg(value_name = "RECIPE")]
    pub recipe: Option<PathBuf>,

    /// Output format for the validated recipe
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Fail when the recipe has no `globals` entry instead of using defaults
    #[arg(long)]
    pub require_globals: bool,
}

impl CheckArgs {
    pub fn missing_globals_policy(&self) -> MissingGlobalsPolicy {
        if self.require_globals {
            MissingGlobalsPolicy::Reject
        } else {
            MissingGlobalsPolicy::Synthesize
        }
    }
}

/// Load the recipe named by `args`.
pub fn load_recipe(provider: &ConfigProvider, args: &CheckArgs) -> RecipeResult<Recipe> {
    RecipeLoader::new(provider)
        .with_missing_globals(args.missing_globals_policy())
        .load(args.recipe.as_deref())
}

/// Run the check command, returning the rendered recipe.
pub fn run_check(provider: &ConfigProvider, args: &CheckArgs) -> anyhow::Result<String> {
    let recipe = load_recipe(provider, args)?;
    render(&recipe, args.format)
}
