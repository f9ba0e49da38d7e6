//! Toolchain rule synthesis.
//!
//! [`CommandBuilder`] owns one synthesis session. It runs one routine per
//! toolchain family in a fixed order against a single [`RuleSetBuilder`],
//! which every routine receives by `&mut` reference. Routines read the
//! read-only [`ToolchainConfig`], consult the environment only for compiler
//! overrides, and probe the filesystem only to confirm that explicitly
//! configured plugins exist.
//!
//! # Examples
//!
//! ```
//! use std::num::NonZeroUsize;
//! use kumihimo::config::ToolchainConfig;
//! use kumihimo::toolchain::{CommandBuilder, PathProbe};
//! use mockable::DefaultEnv;
//!
//! let config = ToolchainConfig::default();
//! let env = DefaultEnv::new();
//! let probe = PathProbe::new(Vec::new());
//! let rules = CommandBuilder::new(&config, &env, &probe)
//!     .with_parallelism(NonZeroUsize::MIN)
//!     .synthesize()
//!     .expect("default configuration synthesises");
//! assert!(rules.rule_names().contains("cxx"));
//! ```

mod cc;
mod common;
mod go;
mod idl;
mod java;
mod paths;
mod probe;
mod proto;
mod python;
mod version;

use std::fmt;
use std::num::NonZeroUsize;
use std::thread;

use mockable::Env;

use crate::config::ToolchainConfig;
use crate::dispatch::Dispatcher;
use crate::error::SynthesisError;
use crate::rules::{Header, RuleSet, RuleSetBuilder};

pub use cc::SECURECC_PHONY;
pub use go::{GoLayout, GoModeInput, go_layout};
pub use idl::thrift_binary;
pub use paths::{normalize_lexically, relative_to};
pub use probe::{PathProbe, ToolProbe};

/// Compiler/interpreter ecosystems that contribute rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainFamily {
    /// Toolchain-independent helpers.
    Common,
    /// Native C/C++ compiler, archiver and linker.
    Cc,
    /// Protocol buffer compiler.
    Proto,
    /// Embedded resources.
    Resource,
    /// Java compiler and packagers.
    Java,
    /// Scala compiler.
    Scala,
    /// Thrift IDL compiler.
    Thrift,
    /// SWIG wrapper generator.
    Swig,
    /// Python packager.
    Python,
    /// Go toolchain.
    Go,
    /// Shell test harness.
    Shell,
    /// Flex and Bison.
    LexYacc,
    /// Archive packaging.
    Package,
    /// Version-control stamp.
    Version,
}

impl ToolchainFamily {
    /// Configuration section name, also used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Cc => "cc",
            Self::Proto => "proto",
            Self::Resource => "resource",
            Self::Java => "java",
            Self::Scala => "scala",
            Self::Thrift => "thrift",
            Self::Swig => "swig",
            Self::Python => "python",
            Self::Go => "go",
            Self::Shell => "shell",
            Self::LexYacc => "lex_yacc",
            Self::Package => "package",
            Self::Version => "version",
        }
    }
}

impl fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesises every toolchain family's rules for one session.
#[derive(Debug)]
pub struct CommandBuilder<'a, E, P> {
    config: &'a ToolchainConfig,
    env: &'a E,
    probe: &'a P,
    dispatcher: Dispatcher,
    parallelism: NonZeroUsize,
}

impl<'a, E: Env, P: ToolProbe> CommandBuilder<'a, E, P> {
    /// Create a builder reading `config`, compiler overrides from `env`, and
    /// plugin presence from `probe`.
    ///
    /// Parallelism defaults to the host's available parallelism.
    #[must_use]
    pub fn new(config: &'a ToolchainConfig, env: &'a E, probe: &'a P) -> Self {
        let parallelism = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            env,
            probe,
            dispatcher: Dispatcher::new(&config.helper),
            parallelism,
        }
    }

    /// Override the parallelism the link pool is clamped to.
    #[must_use]
    pub const fn with_parallelism(mut self, parallelism: NonZeroUsize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Header written at the top of the manifest.
    #[must_use]
    pub fn header(&self) -> Header {
        Header {
            required_version: self.config.ninja_required_version.clone(),
            build_dir: self.config.build_dir.clone(),
        }
    }

    /// Run every family routine in the fixed order and freeze the result.
    ///
    /// # Errors
    ///
    /// Returns the first [`SynthesisError`] raised by a routine; no partial
    /// rule set escapes.
    pub fn synthesize(&self) -> Result<RuleSet, SynthesisError> {
        let mut rules = RuleSetBuilder::new(self.header());
        self.common_rules(&mut rules)?;
        self.cc_rules(&mut rules)?;
        self.proto_rules(&mut rules)?;
        self.resource_rules(&mut rules)?;
        self.java_scala_rules(&mut rules)?;
        self.thrift_rules(&mut rules)?;
        self.swig_rules(&mut rules)?;
        self.python_rules(&mut rules)?;
        self.go_rules(&mut rules)?;
        self.shell_rules(&mut rules)?;
        self.lex_yacc_rules(&mut rules)?;
        self.package_rules(&mut rules)?;
        self.version_rules(&mut rules)?;
        Ok(rules.finish())
    }

    /// Whether compile rules should emit dependency files: the manifest's
    /// Ninja release must support dependency logs and the configuration
    /// must ask for them.
    #[must_use]
    pub fn dependency_tracking(&self) -> bool {
        self.config.cc.dependency_tracking && self.config.supports_deps_log()
    }
}

/// Join non-empty words with single spaces.
fn join_words<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for item in words {
        let word = item.as_ref();
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Prefix each include directory with `flag`, e.g. `-I` or `-I=`.
fn include_flags(flag: &str, dirs: &[String]) -> String {
    join_words(dirs.iter().map(|dir| format!("{flag}{dir}")))
}
