//! Ninja rule model.
//!
//! A [`Rule`] is a named command template plus the incremental-build
//! metadata Ninja needs to schedule it. Rules are assembled through
//! [`RuleBuilder`], whose optional fields stay absent until set, and are
//! registered with a [`RuleSetBuilder`] which enforces name uniqueness.
//!
//! Command templates keep their `${in}`/`${out}` style placeholders verbatim.
//! Ninja substitutes them per build edge; this crate never does.
//!
//! # Examples
//!
//! ```
//! use kumihimo::rules::{DepsFormat, Rule};
//!
//! let rule = Rule::builder("cc", "gcc -MMD -MF ${out}.d -c ${in} -o ${out}")
//!     .description("CC ${in}")
//!     .gcc_depfile(true)
//!     .build();
//! assert_eq!(rule.depfile.as_deref(), Some("${out}.d"));
//! assert_eq!(rule.deps, DepsFormat::Gcc);
//! ```

mod pool;
mod registry;

pub use pool::{GOLANG_POOL, HEAVY_POOL, LINK_POOL, Pool, PoolManager, PoolRef, link_pool_depth};
pub use registry::{Declaration, Header, RuleSet, RuleSetBuilder, Variable};

/// Dependency-file format understood by Ninja's `deps` setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepsFormat {
    /// No `deps` line is emitted.
    #[default]
    None,
    /// GCC/Clang style Makefile fragments.
    Gcc,
    /// MSVC `/showIncludes` output.
    Msvc,
}

impl DepsFormat {
    /// Value written after `deps =`, or `None` when the field is omitted.
    #[must_use]
    pub const fn as_ninja(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gcc => Some("gcc"),
            Self::Msvc => Some("msvc"),
        }
    }
}

/// A response file Ninja writes before running the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFile {
    /// Path of the response file, usually derived from `${out}`.
    pub path: String,
    /// Content template, usually `${in}`.
    pub content: String,
}

/// A named, reusable command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Unique rule identifier.
    pub name: String,
    /// Command template with unresolved placeholders.
    pub command: String,
    /// Human-readable progress line.
    pub description: Option<String>,
    /// Dependency file produced by the command.
    pub depfile: Option<String>,
    /// Marks rules that regenerate the manifest itself.
    pub generator: bool,
    /// Concurrency pool bound at declaration time.
    pub pool: Option<PoolRef>,
    /// Re-stat outputs after the command runs.
    pub restat: bool,
    /// Optional response file.
    pub rspfile: Option<ResponseFile>,
    /// Format of the dependency file.
    pub deps: DepsFormat,
}

impl Rule {
    /// Start building a rule with the mandatory name and command.
    #[must_use]
    pub fn builder(name: impl Into<String>, command: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            rule: Self {
                name: name.into(),
                command: command.into(),
                description: None,
                depfile: None,
                generator: false,
                pool: None,
                restat: false,
                rspfile: None,
                deps: DepsFormat::None,
            },
        }
    }
}

/// Incrementally assembles a [`Rule`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    /// Set the progress description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.rule.description = Some(description.into());
        self
    }

    /// Set the dependency file path.
    pub fn depfile(mut self, depfile: impl Into<String>) -> Self {
        self.rule.depfile = Some(depfile.into());
        self
    }

    /// Set the dependency file format.
    pub const fn deps(mut self, deps: DepsFormat) -> Self {
        self.rule.deps = deps;
        self
    }

    /// Track `${out}.d` as a GCC-style dependency file when `enabled`.
    ///
    /// When disabled neither `depfile` nor `deps` is set, so both lines are
    /// omitted from the manifest.
    pub fn gcc_depfile(self, enabled: bool) -> Self {
        if enabled {
            self.depfile("${out}.d").deps(DepsFormat::Gcc)
        } else {
            self
        }
    }

    /// Flag the rule as a manifest generator.
    pub const fn generator(mut self) -> Self {
        self.rule.generator = true;
        self
    }

    /// Bind the rule to `pool`.
    pub fn pool(mut self, pool: &PoolRef) -> Self {
        self.rule.pool = Some(pool.clone());
        self
    }

    /// Bind the rule to `pool` when one is given.
    pub fn maybe_pool(self, pool: Option<&PoolRef>) -> Self {
        match pool {
            Some(p) => self.pool(p),
            None => self,
        }
    }

    /// Ask Ninja to re-stat outputs after the command runs.
    pub const fn restat(mut self) -> Self {
        self.rule.restat = true;
        self
    }

    /// Attach a response file.
    pub fn rspfile(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.rule.rspfile = Some(ResponseFile {
            path: path.into(),
            content: content.into(),
        });
        self
    }

    /// Finish the rule.
    #[must_use]
    pub fn build(self) -> Rule {
        self.rule
    }
}

/// Returns `true` when `name` is usable as a Ninja rule or pool identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn builder_leaves_optional_fields_absent() {
        let rule = Rule::builder("stamp", "touch ${out}").build();
        assert!(rule.description.is_none());
        assert!(rule.depfile.is_none());
        assert!(rule.pool.is_none());
        assert!(rule.rspfile.is_none());
        assert!(!rule.generator && !rule.restat);
        assert_eq!(rule.deps, DepsFormat::None);
    }

    #[rstest]
    fn disabled_depfile_sets_nothing() {
        let rule = Rule::builder("cc", "gcc").gcc_depfile(false).build();
        assert!(rule.depfile.is_none());
        assert_eq!(rule.deps.as_ninja(), None);
    }

    #[rstest]
    #[case("cxx", true)]
    #[case("package_tar", true)]
    #[case("java.jar-1", true)]
    #[case("", false)]
    #[case("two words", false)]
    #[case("a:b", false)]
    fn identifier_validation(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_identifier(name), valid);
    }
}
