//! Lexical path arithmetic.
//!
//! These helpers never touch the filesystem: symlinks are not followed and
//! the paths need not exist.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// Leading `..` components of a relative path are kept; `..` directly under
/// the root is dropped. An empty result becomes `.`.
///
/// ```
/// use camino::Utf8Path;
/// use kumihimo::toolchain::normalize_lexically;
///
/// assert_eq!(normalize_lexically(Utf8Path::new("a/./b/../c")), "a/c");
/// assert_eq!(normalize_lexically(Utf8Path::new("../a/..")), "..");
/// assert_eq!(normalize_lexically(Utf8Path::new("/../a")), "/a");
/// ```
#[must_use]
pub fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Utf8PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Express `target` relative to the directory `base`.
///
/// Both paths are normalised first and must be relative to the same root.
/// Returns `None` when `base` climbs above that root, since the way back
/// down cannot be known lexically.
///
/// ```
/// use camino::Utf8Path;
/// use kumihimo::toolchain::relative_to;
///
/// let rel = relative_to(Utf8Path::new("tools/go/bin/go"), Utf8Path::new("src/svc"));
/// assert_eq!(rel.as_deref().map(Utf8Path::as_str), Some("../../tools/go/bin/go"));
/// assert_eq!(relative_to(Utf8Path::new("a"), Utf8Path::new("../b")), None);
/// ```
#[must_use]
pub fn relative_to(target: &Utf8Path, base: &Utf8Path) -> Option<Utf8PathBuf> {
    let to = normalize_lexically(target);
    let from = normalize_lexically(base);
    if to.is_absolute() != from.is_absolute() {
        return None;
    }
    let base_parts: Vec<_> = from
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    if base_parts
        .iter()
        .any(|c| matches!(c, Utf8Component::ParentDir))
    {
        return None;
    }
    let target_parts: Vec<_> = to
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let mut out = Utf8PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in target_parts.iter().skip(common) {
        out.push(part.as_str());
    }
    if out.as_str().is_empty() {
        out.push(".");
    }
    Some(out)
}
