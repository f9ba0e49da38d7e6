//! Error types raised while synthesising Ninja rules.
//!
//! [`SynthesisError`] separates user-fixable configuration problems from
//! invariant violations inside a toolchain routine. Every variant carries the
//! context needed to fix the configuration without reading the source.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::toolchain::ToolchainFamily;

/// A dangling name found while validating build edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// The edge names a rule that was never declared.
    Rule(String),
    /// The edge binds a pool that was never declared.
    Pool(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(name) => write!(f, "rule '{name}'"),
            Self::Pool(name) => write!(f, "pool '{name}'"),
        }
    }
}

/// Errors raised during rule synthesis and manifest validation.
#[derive(Debug, Error, Diagnostic)]
pub enum SynthesisError {
    /// A required tool or setting is missing, or settings conflict.
    #[error("{family}: {message}")]
    #[diagnostic(
        code(kumihimo::synthesis::configuration),
        help("check the {family} section of the toolchain configuration")
    )]
    Configuration {
        /// Toolchain family whose configuration is at fault.
        family: ToolchainFamily,
        /// Description of the missing field or tool.
        message: String,
    },

    /// Two routines tried to declare the same rule.
    #[error("rule '{name}' is already declared")]
    #[diagnostic(code(kumihimo::synthesis::duplicate_rule))]
    DuplicateRule {
        /// Name of the rule declared twice.
        name: String,
    },

    /// A rule name contains characters Ninja does not accept.
    #[error("'{name}' is not a valid Ninja rule name")]
    #[diagnostic(code(kumihimo::synthesis::invalid_rule_name))]
    InvalidRuleName {
        /// The rejected name.
        name: String,
    },

    /// A command template is not valid shell.
    #[error("rule '{rule}' has a malformed command: {command}")]
    #[diagnostic(code(kumihimo::synthesis::invalid_command))]
    InvalidCommand {
        /// Rule carrying the command.
        rule: String,
        /// The offending command template.
        command: String,
    },

    /// A pool name was declared twice with different depths.
    #[error("pool '{name}' already has depth {existing}, cannot redeclare with depth {requested}")]
    #[diagnostic(code(kumihimo::synthesis::conflicting_pool))]
    ConflictingPool {
        /// Name of the pool.
        name: String,
        /// Depth recorded by the first declaration.
        existing: usize,
        /// Depth requested by the conflicting declaration.
        requested: usize,
    },

    /// A pool was declared with depth zero.
    #[error("pool '{name}' must have a depth of at least 1")]
    #[diagnostic(code(kumihimo::synthesis::invalid_pool_depth))]
    InvalidPoolDepth {
        /// Name of the pool.
        name: String,
    },

    /// A build edge refers to a rule or pool that was never declared.
    #[error("build edge for '{output}' references undeclared {reference}")]
    #[diagnostic(
        code(kumihimo::synthesis::referential_integrity),
        help("every build edge must use a rule emitted by the toolchain synthesis")
    )]
    ReferentialIntegrity {
        /// The dangling reference.
        reference: Reference,
        /// First output of the offending edge.
        output: String,
    },

    /// A build edge lists no outputs.
    #[error("build edge for rule '{rule}' has no outputs")]
    #[diagnostic(code(kumihimo::synthesis::empty_outputs))]
    EmptyOutputs {
        /// Rule the edge invokes.
        rule: String,
    },

    /// A build edge binds a variable whose name Ninja cannot parse.
    #[error("build edge for '{output}' binds invalid variable name '{name}'")]
    #[diagnostic(code(kumihimo::synthesis::invalid_variable_name))]
    InvalidVariableName {
        /// The rejected name.
        name: String,
        /// First output of the offending edge.
        output: String,
    },
}

impl SynthesisError {
    /// Build a [`SynthesisError::Configuration`] for `family`.
    pub(crate) fn configuration(family: ToolchainFamily, message: impl Into<String>) -> Self {
        Self::Configuration {
            family,
            message: message.into(),
        }
    }
}
