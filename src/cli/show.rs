//! `config` and `deps` subcommands.

use crate::config::ConfigProvider;
use crate::format::{OutputFormat, render};
use anyhow::Result;
use clap::Args;
use std::collections::BTreeMap;
use tracing::debug;

/// Arguments for the config subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Load the global config and render it.
///
/// YAML output starts with a `# source:` comment naming the file; JSON has no
/// comments, so the source only goes to the log.
pub fn run_config(provider: &ConfigProvider, args: &ConfigArgs) -> Result<String> {
    let config = provider.ensure_loaded(None)?;
    let body = render(config.as_ref(), args.format)?;
    match args.format {
        OutputFormat::Yaml => Ok(format!("# source: {}\n{}", config.source().display(), body)),
        OutputFormat::Json => {
            debug!(source = %config.source().display(), "Rendering config as JSON");
            Ok(body)
        }
    }
}

/// Load the global config and render its parsed job dependencies.
pub fn run_deps(provider: &ConfigProvider) -> Result<String> {
    let config = provider.ensure_loaded(None)?;
    let dependencies: BTreeMap<_, _> = config.parse_dependencies()?.into_iter().collect();
    render(&dependencies, OutputFormat::Yaml)
}
