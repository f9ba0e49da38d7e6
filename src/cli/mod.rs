//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands.

use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

mod parsing;

use parsing::parse_jobs;

/// Maximum number of jobs accepted by the CLI.
const MAX_JOBS: usize = 1024;

/// Configuration file looked up in the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "kumihimo.yml";

/// Manifest written by `generate` when no output path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "build.ninja";

/// Synthesise Ninja build rules for C/C++, Java, Go and friends.
#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Toolchain configuration file.
    ///
    /// Defaults to `kumihimo.yml`; built-in defaults apply when that file
    /// does not exist.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in this directory.
    ///
    /// This affects configuration lookup, output paths and the workspace
    /// root.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Build parallelism the link pool is clamped to.
    ///
    /// Defaults to the host's available parallelism.
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            directory: None,
            jobs: None,
            verbose: false,
            command: Some(Commands::Generate(GenerateArgs::default())),
        }
    }
}

impl Cli {
    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the clap error when the arguments are invalid.
    pub fn try_parse_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::with_default_command)
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Generate(GenerateArgs::default()));
        }
        self
    }
}

/// Arguments accepted by the `generate` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct GenerateArgs {
    /// YAML list of build edges to append after the synthesised rules.
    ///
    /// Every edge must use a rule the synthesis declared.
    #[arg(long, value_name = "FILE")]
    pub edges: Option<PathBuf>,

    /// Output path for the manifest; `-` writes to standard output.
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            edges: None,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Write the Ninja manifest (the default command).
    Generate(GenerateArgs),

    /// List the names of every synthesised rule, one per line.
    Rules,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn no_subcommand_means_generate() {
        let cli = Cli::try_parse_with_default(["kumihimo"]).expect("parse");
        assert_eq!(cli.command, Some(Commands::Generate(GenerateArgs::default())));
    }

    #[rstest]
    fn global_options_are_parsed() {
        let cli = Cli::try_parse_with_default([
            "kumihimo", "-c", "tc.yml", "-C", "work", "-j", "4", "-v", "generate", "--edges",
            "edges.yml", "-",
        ])
        .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("tc.yml")));
        assert_eq!(cli.directory, Some(PathBuf::from("work")));
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Some(Commands::Generate(GenerateArgs {
                edges: Some(PathBuf::from("edges.yml")),
                output: PathBuf::from("-"),
            }))
        );
    }

    #[rstest]
    #[case("0")]
    #[case("many")]
    #[case("1025")]
    fn invalid_job_counts_are_rejected(#[case] jobs: &str) {
        assert!(Cli::try_parse_with_default(["kumihimo", "-j", jobs, "rules"]).is_err());
    }
}
