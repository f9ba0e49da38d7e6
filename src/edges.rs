//! Build edges.
//!
//! Edges are normally produced by an external target-graph component and
//! appended after the synthesised rules. The synthesis also owns a handful
//! of fixed edges (the secure-compile phony target and the version stamp).
//! Externally produced edges arrive as YAML:
//!
//! ```yaml
//! edges:
//!   - rule: cxx
//!     outputs: [build64_release/foo.o]
//!     inputs: [foo.cc]
//!     vars:
//!       cppflags: -DNDEBUG
//! ```

use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ninja's built-in rule that runs nothing.
pub const PHONY_RULE: &str = "phony";

/// One `build` statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildEdge {
    /// Rule executed for this edge.
    pub rule: String,
    /// Files the rule produces and Ninja tracks as targets.
    pub outputs: Vec<Utf8PathBuf>,
    /// Outputs not named on the command line.
    #[serde(default)]
    pub implicit_outputs: Vec<Utf8PathBuf>,
    /// Files substituted for `${in}`.
    #[serde(default)]
    pub inputs: Vec<Utf8PathBuf>,
    /// Dependencies not named on the command line.
    #[serde(default)]
    pub implicit_inputs: Vec<Utf8PathBuf>,
    /// Dependencies that must exist but never trigger a rebuild.
    #[serde(default)]
    pub order_only: Vec<Utf8PathBuf>,
    /// Per-edge variable overrides, written in insertion order.
    #[serde(default, rename = "vars")]
    pub variables: IndexMap<String, String>,
}

impl BuildEdge {
    /// Create an edge running `rule` to produce `outputs`.
    #[must_use]
    pub fn new<I, P>(rule: impl Into<String>, outputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            rule: rule.into(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            implicit_outputs: Vec::new(),
            inputs: Vec::new(),
            implicit_inputs: Vec::new(),
            order_only: Vec::new(),
            variables: IndexMap::new(),
        }
    }

    /// Replace the explicit inputs.
    #[must_use]
    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Add a per-edge variable override.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// First explicit output, used to name the edge in diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.outputs.first().map(ToString::to_string).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeFile {
    #[serde(default)]
    edges: Vec<BuildEdge>,
}

/// Parse an edge list from YAML text.
///
/// # Errors
///
/// Returns an error when the YAML does not match the edge schema.
pub fn edges_from_str(yaml: &str) -> Result<Vec<BuildEdge>> {
    let file: EdgeFile = serde_saphyr::from_str(yaml).context("parse build edges")?;
    Ok(file.edges)
}

/// Read an edge list from `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn edges_from_path(path: &Utf8Path) -> Result<Vec<BuildEdge>> {
    let text = fs::read_to_string(path).with_context(|| format!("read build edges {path}"))?;
    edges_from_str(&text).with_context(|| format!("load build edges {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_edges_with_defaults() {
        let yaml = concat!(
            "edges:\n",
            "  - rule: cxx\n",
            "    outputs: [out/foo.o]\n",
            "    inputs: [foo.cc]\n",
            "    vars:\n",
            "      cppflags: -DNDEBUG\n",
            "      cxx_warnings: ''\n",
        );
        let edges = edges_from_str(yaml).expect("parse edges");
        let [edge] = edges.as_slice() else {
            panic!("expected one edge, got {edges:?}");
        };
        assert_eq!(edge.rule, "cxx");
        assert_eq!(edge.outputs, vec![Utf8PathBuf::from("out/foo.o")]);
        assert!(edge.order_only.is_empty());
        let keys: Vec<_> = edge.variables.keys().map(String::as_str).collect();
        assert_eq!(keys, ["cppflags", "cxx_warnings"]);
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let yaml = "edges:\n  - rule: cc\n    outputs: [a.o]\n    command: gcc\n";
        assert!(edges_from_str(yaml).is_err());
    }

    #[rstest]
    fn empty_document_has_no_edges() {
        let edges = edges_from_str("edges: []\n").expect("parse edges");
        assert!(edges.is_empty());
    }
}
