//! Manifest writers.
//!
//! Files are replaced atomically through a sibling temporary file and left
//! untouched when their contents already match, so Ninja does not see a
//! spurious modification time.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tempfile::NamedTempFile;
use tracing::debug;

use super::NinjaContent;
use crate::hasher::ManifestDigest;

/// Result of a manifest write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WriteOutcome {
    /// The file was created or replaced.
    Written,
    /// The existing file already held identical content.
    Unchanged,
}

/// Return `true` when `path` is the CLI sentinel indicating "write to stdout".
#[must_use]
pub(super) fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn existing_digest(path: &Utf8Path) -> Option<ManifestDigest> {
    fs::read(path).ok().map(|bytes| ManifestDigest::of_bytes(&bytes))
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error when the directory, temporary file or final rename
/// fails.
pub(super) fn write_manifest_file(path: &Utf8Path, content: &NinjaContent) -> Result<WriteOutcome> {
    if existing_digest(path) == Some(ManifestDigest::of(content.as_str())) {
        debug!(%path, "manifest unchanged; skipping write");
        return Ok(WriteOutcome::Unchanged);
    }
    let parent = match path.parent().filter(|p| !p.as_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("creating directory {dir}"))?;
            dir
        }
        None => Utf8Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temporary file in {parent}"))?;
    {
        let handle = tmp.as_file_mut();
        handle
            .write_all(content.as_str().as_bytes())
            .with_context(|| format!("writing temporary manifest for {path}"))?;
        handle
            .flush()
            .with_context(|| format!("flushing temporary manifest for {path}"))?;
        handle
            .sync_all()
            .with_context(|| format!("syncing temporary manifest for {path}"))?;
        // Temporary files are created owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            handle
                .set_permissions(fs::Permissions::from_mode(0o644))
                .with_context(|| format!("setting permissions for {path}"))?;
        }
    }
    tmp.persist(path)
        .with_context(|| format!("replacing {path}"))?;
    Ok(WriteOutcome::Written)
}

fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

/// Write `text` to standard output, treating a closed pipe as success.
///
/// # Errors
///
/// Returns an error for any other write or flush failure.
pub(super) fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    ignore_broken_pipe(stdout.write_all(text.as_bytes())).context("writing to standard output")?;
    ignore_broken_pipe(stdout.flush()).context("flushing standard output")?;
    Ok(())
}
