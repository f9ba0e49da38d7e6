//! Executable presence checks.
//!
//! Synthesis only probes for tools the configuration names explicitly, such
//! as a protobuf Go plugin or the caching proxy. Everything else is assumed
//! to be resolved by the shell when Ninja runs the command.

use std::env;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use mockable::Env;

/// Resolves a program name or path to an existing executable.
pub trait ToolProbe {
    /// Return the executable `program` refers to, or `None` when absent.
    fn resolve(&self, program: &Utf8Path) -> Option<Utf8PathBuf>;
}

/// Probe that searches `PATH`-style directories.
///
/// Programs containing a separator are checked directly, relative paths
/// against the workspace root.
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    dirs: Vec<Utf8PathBuf>,
    base: Option<Utf8PathBuf>,
}

impl PathProbe {
    /// Search exactly `dirs`, in order.
    #[must_use]
    pub const fn new(dirs: Vec<Utf8PathBuf>) -> Self {
        Self { dirs, base: None }
    }

    /// Search the directories listed in the environment's `PATH`.
    ///
    /// Entries that are empty or not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_env(env: &impl Env) -> Self {
        let dirs = env
            .raw("PATH")
            .map(|raw| {
                env::split_paths(&raw)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .filter_map(|dir| Utf8PathBuf::from_path_buf(dir).ok())
                    .collect()
            })
            .unwrap_or_default();
        Self::new(dirs)
    }

    /// Resolve relative program paths against `base` rather than the
    /// process working directory.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<Utf8PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }
}

impl ToolProbe for PathProbe {
    fn resolve(&self, program: &Utf8Path) -> Option<Utf8PathBuf> {
        if program.as_str().is_empty() {
            return None;
        }
        if program.is_absolute() || program.components().count() > 1 {
            let candidate = match &self.base {
                Some(base) if program.is_relative() => base.join(program),
                _ => program.to_owned(),
            };
            return is_executable(&candidate).then_some(candidate);
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }
}

pub(crate) fn is_executable(path: &Utf8Path) -> bool {
    fs::metadata(path.as_std_path())
        .is_ok_and(|metadata| metadata.is_file() && has_execute_permission(&metadata))
}

#[cfg(unix)]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}
