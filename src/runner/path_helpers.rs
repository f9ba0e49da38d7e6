//! Path resolution helpers for the runner module.
//!
//! Centralises configuration, edge-list and output path logic so the main
//! runner module stays focused on command dispatch.

use std::env;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};

use super::RunnerError;
use crate::cli::{Cli, DEFAULT_CONFIG_FILE};
use crate::toolchain::normalize_lexically;

fn to_utf8(path: PathBuf) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path).map_err(|bad| RunnerError::NonUtf8Path { path: bad })
}

/// Resolve a command-line path against the `-C/--directory` option.
///
/// Relative paths become `directory/path`; absolute paths are kept.
///
/// # Errors
///
/// Returns [`RunnerError::NonUtf8Path`] when either path is not UTF-8.
pub(super) fn resolve_cli_path(cli: &Cli, path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    let joined = match &cli.directory {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    to_utf8(joined)
}

/// Locate the configuration file, if any.
///
/// An explicit `--config` must exist. Without it, `kumihimo.yml` is used when
/// present and `None` selects the built-in defaults.
///
/// # Errors
///
/// Returns [`RunnerError::ConfigNotFound`] for a missing explicit file and
/// [`RunnerError::NonUtf8Path`] for non-UTF-8 paths.
pub(super) fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>, RunnerError> {
    if let Some(explicit) = &cli.config {
        let path = resolve_cli_path(cli, explicit)?;
        if !path.as_std_path().is_file() {
            return Err(RunnerError::ConfigNotFound {
                path: path.into_std_path_buf(),
            });
        }
        return Ok(Some(path));
    }
    let fallback = resolve_cli_path(cli, Path::new(DEFAULT_CONFIG_FILE))?;
    Ok(fallback.as_std_path().is_file().then_some(fallback))
}

/// Make the configured workspace root absolute.
///
/// Relative roots are taken from the effective working directory: the
/// process directory joined with `-C/--directory` when given.
///
/// # Errors
///
/// Returns [`RunnerError::CurrentDir`] when the process directory is
/// unavailable and [`RunnerError::NonUtf8Path`] when it is not UTF-8.
pub(super) fn resolve_root_dir(cli: &Cli, root: &Utf8Path) -> Result<Utf8PathBuf, RunnerError> {
    if root.is_absolute() {
        return Ok(normalize_lexically(root));
    }
    let cwd = env::current_dir().map_err(|source| RunnerError::CurrentDir { source })?;
    let base = match &cli.directory {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };
    Ok(normalize_lexically(&to_utf8(base)?.join(root)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cli_in(directory: Option<&str>) -> Cli {
        Cli {
            directory: directory.map(PathBuf::from),
            ..Cli::default()
        }
    }

    #[rstest]
    #[case(None, "build.ninja", "build.ninja")]
    #[case(Some("work"), "build.ninja", "work/build.ninja")]
    #[case(Some("work"), "/abs/out.ninja", "/abs/out.ninja")]
    fn cli_paths_follow_directory(
        #[case] directory: Option<&str>,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let resolved = resolve_cli_path(&cli_in(directory), Path::new(path)).expect("utf8");
        assert_eq!(resolved, Utf8PathBuf::from(expected));
    }

    #[rstest]
    fn absolute_root_is_normalised() {
        let root = resolve_root_dir(&cli_in(Some("ignored")), Utf8Path::new("/ws/./a/../b"))
            .expect("root");
        assert_eq!(root, Utf8PathBuf::from("/ws/b"));
    }

    #[rstest]
    fn relative_root_is_made_absolute() {
        let root = resolve_root_dir(&cli_in(Some("sub")), Utf8Path::new(".")).expect("root");
        assert!(root.is_absolute());
        assert!(root.ends_with("sub"));
    }

    #[rstest]
    fn missing_explicit_config_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = Cli {
            config: Some(temp.path().join("absent.yml")),
            ..Cli::default()
        };
        assert!(matches!(
            resolve_config_path(&cli),
            Err(RunnerError::ConfigNotFound { .. })
        ));
    }

    #[rstest]
    fn missing_default_config_selects_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = Cli {
            directory: Some(temp.path().to_path_buf()),
            ..Cli::default()
        };
        assert_eq!(resolve_config_path(&cli).expect("resolve"), None);
    }

    #[rstest]
    fn default_config_is_found_in_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "profile: debug\n").expect("write");
        let cli = Cli {
            directory: Some(temp.path().to_path_buf()),
            ..Cli::default()
        };
        let found = resolve_config_path(&cli).expect("resolve").expect("present");
        assert!(found.ends_with(DEFAULT_CONFIG_FILE));
    }
}
