//! A tool probe with a fixed answer set.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use kumihimo::toolchain::ToolProbe;

/// Resolves exactly the programs it was built with.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe(BTreeSet<Utf8PathBuf>);

impl FixedProbe {
    /// A probe that finds nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A probe that finds each of `programs`.
    #[must_use]
    pub fn with(programs: &[&str]) -> Self {
        Self(programs.iter().copied().map(Utf8PathBuf::from).collect())
    }
}

impl ToolProbe for FixedProbe {
    fn resolve(&self, program: &Utf8Path) -> Option<Utf8PathBuf> {
        self.0.contains(program).then(|| program.to_owned())
    }
}
