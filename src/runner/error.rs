//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving paths and writing the manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A path supplied on the command line is not valid UTF-8.
    #[error("path {} is not valid UTF-8", path.display())]
    #[diagnostic(code(kumihimo::runner::non_utf8_path))]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A configuration file named with `--config` does not exist.
    #[error("configuration file {} does not exist", path.display())]
    #[diagnostic(
        code(kumihimo::runner::config_not_found),
        help("omit --config to fall back to kumihimo.yml or the built-in defaults")
    )]
    ConfigNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// The working directory could not be determined.
    #[error("cannot determine the current directory")]
    #[diagnostic(code(kumihimo::runner::current_dir))]
    CurrentDir {
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
