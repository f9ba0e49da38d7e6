//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the toolchain configuration, runs the synthesis, and writes either
//! the manifest or the rule-name list.

mod error;
mod file_io;
mod path_helpers;

pub use error::RunnerError;

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use mockable::DefaultEnv;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, GenerateArgs};
use crate::config::ToolchainConfig;
use crate::edges::edges_from_path;
use crate::rules::RuleSet;
use crate::toolchain::{CommandBuilder, PathProbe};

use file_io::{WriteOutcome, is_stdout_path, write_manifest_file, write_stdout};
use path_helpers::{resolve_cli_path, resolve_config_path, resolve_root_dir};

/// Wrapper around generated Ninja manifest text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NinjaContent(String);

impl NinjaContent {
    /// Store the provided Ninja manifest string.
    #[must_use]
    pub const fn new(content: String) -> Self {
        Self(content)
    }

    /// Borrow the underlying manifest text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned manifest string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, synthesis fails,
/// an edge references an undeclared rule, or the output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Generate(GenerateArgs::default()));
    match command {
        Commands::Generate(args) => handle_generate(cli, &args),
        Commands::Rules => handle_rules(cli),
    }
}

fn handle_generate(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let ninja = generate_ninja(cli, args)?;
    if is_stdout_path(&args.output) {
        return write_stdout(ninja.as_str());
    }
    let output = resolve_cli_path(cli, &args.output)?;
    match write_manifest_file(&output, &ninja)? {
        WriteOutcome::Written => info!("Wrote Ninja file to {output}"),
        WriteOutcome::Unchanged => info!("Ninja file {output} is up to date"),
    }
    Ok(())
}

fn handle_rules(cli: &Cli) -> Result<()> {
    let rules = synthesize(cli)?;
    let mut listing = String::new();
    for name in rules.rule_names() {
        listing.push_str(name);
        listing.push('\n');
    }
    write_stdout(&listing)
}

/// Load the configuration referenced by `cli`, with `root_dir` made
/// absolute.
///
/// # Errors
///
/// Returns an error when an explicitly named configuration is missing or
/// any configuration is invalid.
pub fn load_config(cli: &Cli) -> Result<ToolchainConfig> {
    let mut config = match resolve_config_path(cli)? {
        Some(path) => ToolchainConfig::from_path(&path)
            .with_context(|| format!("loading toolchain configuration {path}"))?,
        None => {
            debug!("no toolchain configuration found; using defaults");
            ToolchainConfig::default()
        }
    };
    config.root_dir = resolve_root_dir(cli, &config.root_dir)?;
    Ok(config)
}

/// Run the toolchain synthesis for `cli`.
///
/// # Errors
///
/// Returns an error when the configuration cannot be loaded or a toolchain
/// routine reports a configuration problem.
pub fn synthesize(cli: &Cli) -> Result<RuleSet> {
    let config = load_config(cli)?;
    let env = DefaultEnv::new();
    let probe = PathProbe::from_env(&env).with_base(config.root_dir.clone());
    let mut builder = CommandBuilder::new(&config, &env, &probe);
    if let Some(jobs) = cli.jobs.and_then(NonZeroUsize::new) {
        builder = builder.with_parallelism(jobs);
    }
    let rules = builder.synthesize().context("synthesising toolchain rules")?;
    debug!(rules = rules.rule_names().len(), "synthesised rule set");
    Ok(rules)
}

/// Generate the manifest text, appending external edges when given.
///
/// # Errors
///
/// Returns an error if synthesis fails, the edge list cannot be read, or an
/// edge references an undeclared rule or pool.
pub fn generate_ninja(cli: &Cli, args: &GenerateArgs) -> Result<NinjaContent> {
    let rules = synthesize(cli)?;
    let text = match &args.edges {
        Some(path) => {
            let edges_path = resolve_cli_path(cli, path)?;
            let edges = edges_from_path(&edges_path)?;
            rules
                .render_with_edges(&edges)
                .with_context(|| format!("validating build edges from {edges_path}"))?
        }
        None => rules.render(),
    };
    Ok(NinjaContent::new(text))
}
