//! Append-only registry of declarations for one synthesis session.
//!
//! [`RuleSetBuilder`] is the context object each toolchain routine receives.
//! It records pools, variables, rules, and the few build statements the
//! synthesis owns in the order they are declared, which is also the order
//! they are written to the manifest.

use std::collections::BTreeSet;

use camino::Utf8PathBuf;
use semver::Version;
use tracing::debug;

use super::pool::{HEAVY_POOL, Pool, PoolManager, PoolRef};
use super::{Rule, is_valid_identifier};
use crate::edges::{BuildEdge, PHONY_RULE};
use crate::error::{Reference, SynthesisError};

/// Manifest-wide settings written before any declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Oldest Ninja release able to read the manifest.
    pub required_version: Version,
    /// Directory Ninja stores its logs in.
    pub build_dir: Utf8PathBuf,
}

/// A global `name = value` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Default value; may be empty.
    pub value: String,
}

impl Variable {
    /// Create a binding.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One emitted manifest block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `pool <name>` block.
    Pool(Pool),
    /// A group of global variables.
    Variables(Vec<Variable>),
    /// `rule <name>` block.
    Rule(Rule),
    /// A build statement owned by the synthesis itself.
    Build(BuildEdge),
}

/// Accumulates declarations for one session.
#[derive(Debug)]
pub struct RuleSetBuilder {
    header: Header,
    declarations: Vec<Declaration>,
    rule_names: BTreeSet<String>,
    pools: PoolManager,
}

impl RuleSetBuilder {
    /// Start a session. The singleton heavy pool is declared immediately so
    /// it precedes every family block.
    #[must_use]
    pub fn new(header: Header) -> Self {
        let (pools, heavy) = PoolManager::with_singleton(HEAVY_POOL);
        Self {
            header,
            declarations: vec![Declaration::Pool(heavy)],
            rule_names: BTreeSet::new(),
            pools,
        }
    }

    /// Settings written at the top of the manifest.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Declare a pool, emitting its block the first time it is seen.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::declare`].
    pub fn declare_pool(&mut self, name: &str, depth: usize) -> Result<PoolRef, SynthesisError> {
        let (pool_ref, record) = self.pools.declare(name, depth)?;
        if let Some(pool) = record {
            debug!(pool = name, depth, "declared pool");
            self.declarations.push(Declaration::Pool(pool));
        }
        Ok(pool_ref)
    }

    /// Emit a block of global variables. Call this immediately before the
    /// rules that reference them.
    pub fn define_variables<I>(&mut self, variables: I)
    where
        I: IntoIterator<Item = Variable>,
    {
        let block: Vec<_> = variables.into_iter().collect();
        if !block.is_empty() {
            self.declarations.push(Declaration::Variables(block));
        }
    }

    /// Register a rule.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::DuplicateRule`] when the name is taken,
    /// [`SynthesisError::InvalidRuleName`] for names Ninja rejects, and
    /// [`SynthesisError::InvalidCommand`] when the command is not valid
    /// shell.
    pub fn define_rule(&mut self, rule: Rule) -> Result<(), SynthesisError> {
        if !is_valid_identifier(&rule.name) || rule.name == PHONY_RULE {
            return Err(SynthesisError::InvalidRuleName { name: rule.name });
        }
        if self.rule_names.contains(&rule.name) {
            return Err(SynthesisError::DuplicateRule { name: rule.name });
        }
        if !is_well_formed_command(&rule.command) {
            return Err(SynthesisError::InvalidCommand {
                rule: rule.name,
                command: rule.command,
            });
        }
        self.rule_names.insert(rule.name.clone());
        self.declarations.push(Declaration::Rule(rule));
        Ok(())
    }

    /// Emit a build statement owned by the synthesis.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::ReferentialIntegrity`] when the statement
    /// uses a rule or pool declared neither earlier nor built in, and the
    /// errors of [`RuleSet::check_edges`] for a malformed statement.
    pub fn add_build(&mut self, edge: BuildEdge) -> Result<(), SynthesisError> {
        check_edge(&edge, &self.rule_names, |name| self.pools.depth(name).is_some())?;
        self.declarations.push(Declaration::Build(edge));
        Ok(())
    }

    /// Names of every rule declared so far.
    #[must_use]
    pub const fn rule_names(&self) -> &BTreeSet<String> {
        &self.rule_names
    }

    /// Freeze the session into an immutable [`RuleSet`].
    #[must_use]
    pub fn finish(self) -> RuleSet {
        RuleSet {
            header: self.header,
            declarations: self.declarations,
            rule_names: self.rule_names,
            pool_names: self.pools.names().map(str::to_owned).collect(),
        }
    }
}

/// The finished, read-only result of a synthesis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    header: Header,
    declarations: Vec<Declaration>,
    rule_names: BTreeSet<String>,
    pool_names: BTreeSet<String>,
}

impl RuleSet {
    /// Manifest-wide settings.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Declarations in emission order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Every declared rule name, for validating externally produced edges.
    #[must_use]
    pub const fn rule_names(&self) -> &BTreeSet<String> {
        &self.rule_names
    }

    /// Every declared pool name.
    #[must_use]
    pub const fn pool_names(&self) -> &BTreeSet<String> {
        &self.pool_names
    }

    /// Look up a declared rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.declarations.iter().find_map(|decl| match decl {
            Declaration::Rule(rule) if rule.name == name => Some(rule),
            _ => None,
        })
    }

    /// Confirm every edge references a declared rule and pool.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::EmptyOutputs`] or
    /// [`SynthesisError::InvalidVariableName`] for a malformed edge and
    /// [`SynthesisError::ReferentialIntegrity`] for the first dangling
    /// reference.
    pub fn check_edges(&self, edges: &[BuildEdge]) -> Result<(), SynthesisError> {
        edges.iter().try_for_each(|edge| {
            check_edge(edge, &self.rule_names, |name| self.pool_names.contains(name))
        })
    }
}

/// Ninja's implicit pool for jobs needing the terminal.
const CONSOLE_POOL: &str = "console";

fn check_edge<F>(
    edge: &BuildEdge,
    rule_names: &BTreeSet<String>,
    pool_declared: F,
) -> Result<(), SynthesisError>
where
    F: Fn(&str) -> bool,
{
    if edge.outputs.is_empty() {
        return Err(SynthesisError::EmptyOutputs {
            rule: edge.rule.clone(),
        });
    }
    let output = edge.display_name();
    if let Some(name) = edge.variables.keys().find(|key| !is_valid_identifier(key)) {
        return Err(SynthesisError::InvalidVariableName {
            name: name.clone(),
            output,
        });
    }
    if edge.rule != PHONY_RULE && !rule_names.contains(&edge.rule) {
        return Err(SynthesisError::ReferentialIntegrity {
            reference: Reference::Rule(edge.rule.clone()),
            output,
        });
    }
    if let Some(pool) = edge.variables.get("pool")
        && pool != CONSOLE_POOL
        && !pool_declared(pool)
    {
        return Err(SynthesisError::ReferentialIntegrity {
            reference: Reference::Pool(pool.clone()),
            output,
        });
    }
    Ok(())
}

/// Returns `true` when the command contains an odd number of backticks.
fn has_unmatched_backticks(s: &str) -> bool {
    s.chars().filter(|&c| c == '`').count().rem_euclid(2) != 0
}

fn is_well_formed_command(command: &str) -> bool {
    !command.trim().is_empty()
        && !has_unmatched_backticks(command)
        && shlex::split(command).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new(Header {
            required_version: Version::new(1, 7, 0),
            build_dir: Utf8PathBuf::from("build64_release"),
        })
    }

    #[rstest]
    fn heavy_pool_is_declared_first(builder: RuleSetBuilder) {
        let set = builder.finish();
        match set.declarations().first() {
            Some(Declaration::Pool(pool)) => {
                assert_eq!(pool.name, HEAVY_POOL);
                assert_eq!(pool.depth.get(), 1);
            }
            other => panic!("expected heavy pool, got {other:?}"),
        }
    }

    #[rstest]
    fn heavy_pool_handle_comes_from_declare_pool(mut builder: RuleSetBuilder) {
        let pool = builder.declare_pool(HEAVY_POOL, 1).expect("singleton depth");
        assert_eq!(pool.name(), HEAVY_POOL);
        let set = builder.finish();
        let pools = set
            .declarations()
            .iter()
            .filter(|decl| matches!(decl, Declaration::Pool(_)))
            .count();
        assert_eq!(pools, 1);
    }

    #[rstest]
    fn duplicate_rule_names_are_rejected(mut builder: RuleSetBuilder) {
        builder
            .define_rule(Rule::builder("stamp", "touch ${out}").build())
            .expect("first declaration");
        let err = builder
            .define_rule(Rule::builder("stamp", "touch ${out}.stamp").build())
            .expect_err("duplicate");
        assert!(matches!(err, SynthesisError::DuplicateRule { ref name } if name == "stamp"));
        assert_eq!(builder.rule_names().len(), 1);
    }

    #[rstest]
    #[case("echo `date")]
    #[case("echo \"unterminated")]
    #[case("   ")]
    fn malformed_commands_are_rejected(mut builder: RuleSetBuilder, #[case] command: &str) {
        let err = builder
            .define_rule(Rule::builder("bad", command).build())
            .expect_err("malformed");
        assert!(matches!(err, SynthesisError::InvalidCommand { .. }));
    }

    #[rstest]
    fn phony_cannot_be_redeclared(mut builder: RuleSetBuilder) {
        let err = builder
            .define_rule(Rule::builder(PHONY_RULE, "true").build())
            .expect_err("phony is built in");
        assert!(matches!(err, SynthesisError::InvalidRuleName { .. }));
    }

    #[rstest]
    fn build_statements_must_reference_declared_rules(mut builder: RuleSetBuilder) {
        let edge = BuildEdge::new("cxx", ["build/scm.cc.o"]);
        let err = builder.add_build(edge).expect_err("undeclared rule");
        assert!(matches!(
            err,
            SynthesisError::ReferentialIntegrity {
                reference: Reference::Rule(_),
                ..
            }
        ));
    }

    #[rstest]
    fn phony_edges_need_no_rule(mut builder: RuleSetBuilder) {
        builder
            .add_build(BuildEdge::new(PHONY_RULE, ["__securecc_phony__"]))
            .expect("phony is built in");
    }

    #[rstest]
    fn edges_may_use_declared_or_console_pools(builder: RuleSetBuilder) {
        let set = builder.finish();
        let heavy = BuildEdge::new(PHONY_RULE, ["a"]).with_variable("pool", HEAVY_POOL);
        let console = BuildEdge::new(PHONY_RULE, ["b"]).with_variable("pool", "console");
        set.check_edges(&[heavy, console]).expect("declared pools");

        let missing = BuildEdge::new(PHONY_RULE, ["c"]).with_variable("pool", "gpu_pool");
        let err = set.check_edges(&[missing]).expect_err("undeclared pool");
        assert!(matches!(
            err,
            SynthesisError::ReferentialIntegrity {
                reference: Reference::Pool(ref name),
                ref output,
            } if name == "gpu_pool" && output == "c"
        ));
    }
}
