//! Ninja file generator.
//!
//! This module converts a [`RuleSet`] into the textual representation
//! expected by Ninja. Every declaration kind is formatted here and nowhere
//! else, so optional fields are omitted consistently: a field that is unset
//! never appears, not even as an empty assignment.
//!
//! Output follows declaration order exactly and involves no hashing or
//! sorting of unordered collections, so serialising the same rule set twice
//! yields byte-identical text.

use std::fmt::{self, Display, Formatter};

use camino::Utf8PathBuf;
use itertools::Itertools;

use crate::edges::BuildEdge;
use crate::error::SynthesisError;
use crate::rules::{Declaration, Header, Pool, Rule, RuleSet, Variable};

/// First line of every generated manifest.
pub const BANNER: &str = "# build.ninja generated by kumihimo";

macro_rules! write_kv {
    ($f:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            writeln!($f, "  {} = {}", $key, val)?;
        }
    };
}

macro_rules! write_flag {
    ($f:expr, $key:expr, $cond:expr) => {
        if $cond {
            writeln!($f, "  {} = 1", $key)?;
        }
    };
}

/// Serialise `set` into ordered text blocks: the header followed by one
/// block per declaration.
#[must_use]
pub fn serialize(set: &RuleSet) -> Vec<String> {
    std::iter::once(DisplayHeader(set.header()).to_string())
        .chain(set.declarations().iter().map(|decl| DisplayDeclaration(decl).to_string()))
        .collect()
}

/// Generate the manifest text for `set` without external edges.
#[must_use]
pub fn generate(set: &RuleSet) -> String {
    serialize(set).concat()
}

/// Generate the manifest text for `set` followed by `edges`.
///
/// Edges are validated before any text is produced.
///
/// # Errors
///
/// Returns [`SynthesisError::ReferentialIntegrity`] when an edge names a rule
/// or pool that `set` does not declare, [`SynthesisError::EmptyOutputs`] for
/// an edge without outputs, and [`SynthesisError::InvalidVariableName`] for a
/// binding Ninja cannot parse.
pub fn generate_with_edges(set: &RuleSet, edges: &[BuildEdge]) -> Result<String, SynthesisError> {
    set.check_edges(edges)?;
    let mut out = generate(set);
    for edge in edges {
        out.push_str(&DisplayEdge(edge).to_string());
    }
    Ok(out)
}

impl RuleSet {
    /// Ordered text blocks; see [`serialize`].
    #[must_use]
    pub fn serialize(&self) -> Vec<String> {
        serialize(self)
    }

    /// Full manifest text; see [`generate`].
    #[must_use]
    pub fn render(&self) -> String {
        generate(self)
    }

    /// Full manifest text with external edges appended; see
    /// [`generate_with_edges`].
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::ReferentialIntegrity`] for dangling edges
    /// and the shape errors listed on [`generate_with_edges`].
    pub fn render_with_edges(&self, edges: &[BuildEdge]) -> Result<String, SynthesisError> {
        generate_with_edges(self, edges)
    }
}

/// Escape a path for use in a `build` line.
///
/// Ninja treats `$`, space, and `:` specially in paths.
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if matches!(ch, '$' | ' ' | ':') {
            out.push('$');
        }
        out.push(ch);
    }
    out
}

/// Escape a literal so Ninja does not expand `$` sequences inside it.
#[must_use]
pub fn escape_value(value: &str) -> String {
    value.replace('$', "$$")
}

/// Convert a slice of paths into a space-separated, escaped string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().map(|p| escape_path(p.as_str())).join(" ")
}

struct DisplayHeader<'a>(&'a Header);

impl Display for DisplayHeader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let version = &self.0.required_version;
        writeln!(f, "{BANNER}")?;
        writeln!(
            f,
            "ninja_required_version = {}.{}",
            version.major, version.minor
        )?;
        writeln!(f, "builddir = {}", escape_path(self.0.build_dir.as_str()))?;
        writeln!(f)
    }
}

struct DisplayDeclaration<'a>(&'a Declaration);

impl Display for DisplayDeclaration<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Declaration::Pool(pool) => DisplayPool(pool).fmt(f),
            Declaration::Variables(vars) => DisplayVariables(vars).fmt(f),
            Declaration::Rule(rule) => DisplayRule(rule).fmt(f),
            Declaration::Build(edge) => DisplayEdge(edge).fmt(f),
        }
    }
}

struct DisplayPool<'a>(&'a Pool);

impl Display for DisplayPool<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "pool {}", self.0.name)?;
        writeln!(f, "  depth = {}", self.0.depth)?;
        writeln!(f)
    }
}

struct DisplayVariables<'a>(&'a [Variable]);

impl Display for DisplayVariables<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for var in self.0 {
            write_binding(f, "", &var.name, &var.value)?;
        }
        writeln!(f)
    }
}

/// Write `name = value`, or `name =` when the value is empty.
fn write_binding(f: &mut Formatter<'_>, indent: &str, name: &str, value: &str) -> fmt::Result {
    if value.is_empty() {
        writeln!(f, "{indent}{name} =")
    } else {
        writeln!(f, "{indent}{name} = {value}")
    }
}

/// Wrapper struct to display a rule.
struct DisplayRule<'a>(&'a Rule);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rule = self.0;
        writeln!(f, "rule {}", rule.name)?;
        writeln!(f, "  command = {}", rule.command)?;
        write_kv!(f, "description", &rule.description);
        write_kv!(f, "depfile", &rule.depfile);
        write_flag!(f, "generator", rule.generator);
        write_kv!(f, "pool", rule.pool.as_ref().map(|p| p.name()));
        write_flag!(f, "restat", rule.restat);
        if let Some(rsp) = &rule.rspfile {
            writeln!(f, "  rspfile = {}", rsp.path)?;
            writeln!(f, "  rspfile_content = {}", rsp.content)?;
        }
        write_kv!(f, "deps", rule.deps.as_ninja());
        writeln!(f)
    }
}

/// Wrapper struct to display a build edge.
struct DisplayEdge<'a>(&'a BuildEdge);

impl Display for DisplayEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let edge = self.0;
        write!(f, "build {}", join(&edge.outputs))?;
        if !edge.implicit_outputs.is_empty() {
            write!(f, " | {}", join(&edge.implicit_outputs))?;
        }
        write!(f, ": {}", edge.rule)?;
        if !edge.inputs.is_empty() {
            write!(f, " {}", join(&edge.inputs))?;
        }
        if !edge.implicit_inputs.is_empty() {
            write!(f, " | {}", join(&edge.implicit_inputs))?;
        }
        if !edge.order_only.is_empty() {
            write!(f, " || {}", join(&edge.order_only))?;
        }
        writeln!(f)?;
        for (name, value) in &edge.variables {
            write_binding(f, "  ", name, value)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DepsFormat, RuleSetBuilder, Variable};
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use semver::Version;

    #[fixture]
    fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new(Header {
            required_version: Version::new(1, 7, 0),
            build_dir: Utf8PathBuf::from("build64_release"),
        })
    }

    #[rstest]
    fn header_and_heavy_pool_lead_the_manifest(builder: RuleSetBuilder) {
        let ninja = generate(&builder.finish());
        let expected = concat!(
            "# build.ninja generated by kumihimo\n",
            "ninja_required_version = 1.7\n",
            "builddir = build64_release\n\n",
            "pool heavy_pool\n",
            "  depth = 1\n\n",
        );
        assert_eq!(ninja, expected);
    }

    #[rstest]
    fn rule_fields_follow_fixed_order(mut builder: RuleSetBuilder) {
        let pool = builder.declare_pool("link_pool", 2).expect("pool");
        let rule = Rule::builder("link", "g++ -o ${out} @${out}.rsp")
            .description("LINK ${out}")
            .depfile("${out}.d")
            .generator()
            .pool(&pool)
            .restat()
            .rspfile("${out}.rsp", "${in}")
            .deps(DepsFormat::Gcc)
            .build();
        builder.define_rule(rule).expect("define");
        let blocks = serialize(&builder.finish());
        let expected = concat!(
            "rule link\n",
            "  command = g++ -o ${out} @${out}.rsp\n",
            "  description = LINK ${out}\n",
            "  depfile = ${out}.d\n",
            "  generator = 1\n",
            "  pool = link_pool\n",
            "  restat = 1\n",
            "  rspfile = ${out}.rsp\n",
            "  rspfile_content = ${in}\n",
            "  deps = gcc\n\n",
        );
        assert_eq!(blocks.last().map(String::as_str), Some(expected));
        assert_eq!(blocks.get(2).map(String::as_str), Some("pool link_pool\n  depth = 2\n\n"));
    }

    #[rstest]
    fn empty_variables_have_no_trailing_space(mut builder: RuleSetBuilder) {
        builder.define_variables([
            Variable::new("protocflags", ""),
            Variable::new("classpath", "."),
        ]);
        let blocks = serialize(&builder.finish());
        assert_eq!(
            blocks.last().map(String::as_str),
            Some("protocflags =\nclasspath = .\n\n")
        );
    }

    #[rstest]
    fn edges_render_every_dependency_class() {
        let mut edge = BuildEdge::new("cxx", ["out/a b.o"])
            .with_inputs(["a.cc"])
            .with_variable("cppflags", "-w -O2");
        edge.implicit_outputs.push(Utf8PathBuf::from("out/a.o.d"));
        edge.implicit_inputs.push(Utf8PathBuf::from("gen/a.pb.h"));
        edge.order_only.push(Utf8PathBuf::from("stamp"));
        let text = DisplayEdge(&edge).to_string();
        assert_eq!(
            text,
            "build out/a$ b.o | out/a.o.d: cxx a.cc | gen/a.pb.h || stamp\n  cppflags = -w -O2\n\n"
        );
    }

    #[rstest]
    #[case("c:/tmp", "c$:/tmp")]
    #[case("$out", "$$out")]
    #[case("plain/path.o", "plain/path.o")]
    fn paths_are_escaped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_path(input), expected);
    }

    #[rstest]
    fn dangling_edges_produce_no_text(builder: RuleSetBuilder) {
        let set = builder.finish();
        let edges = [BuildEdge::new("cxx", ["a.o"])];
        assert!(generate_with_edges(&set, &edges).is_err());
    }

    #[fixture]
    fn with_cxx(mut builder: RuleSetBuilder) -> RuleSet {
        builder
            .define_rule(Rule::builder("cxx", "g++ -c ${in} -o ${out}").build())
            .expect("define cxx");
        builder.finish()
    }

    #[rstest]
    fn edges_without_outputs_are_rejected(with_cxx: RuleSet) {
        let edges = [BuildEdge::new("cxx", Vec::<Utf8PathBuf>::new()).with_inputs(["a.cc"])];
        let err = with_cxx.render_with_edges(&edges).expect_err("no outputs");
        assert!(
            matches!(err, SynthesisError::EmptyOutputs { ref rule } if rule == "cxx"),
            "{err}"
        );
    }

    #[rstest]
    #[case("cpp flags")]
    #[case("x\ny")]
    #[case("")]
    #[case("$out")]
    fn edge_variables_need_identifier_names(with_cxx: RuleSet, #[case] name: &str) {
        let edges = [BuildEdge::new("cxx", ["a.o"])
            .with_inputs(["a.cc"])
            .with_variable(name, "-O2")];
        let err = with_cxx.render_with_edges(&edges).expect_err("bad variable name");
        assert!(
            matches!(
                err,
                SynthesisError::InvalidVariableName { name: ref found, ref output }
                    if found == name && output == "a.o"
            ),
            "{err}"
        );
    }
}
