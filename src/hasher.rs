//! Manifest digest utilities.
//!
//! This module provides [`ManifestDigest`], a stable SHA-256 fingerprint of
//! generated manifest text. The writer compares digests so an unchanged
//! manifest is left untouched on disk and Ninja does not see a spurious
//! modification.
//!
//! # Examples
//!
//! ```
//! use kumihimo::hasher::ManifestDigest;
//!
//! let a = ManifestDigest::of("rule stamp\n  command = touch ${out}\n\n");
//! let b = ManifestDigest::of("rule stamp\n  command = touch ${out}\n\n");
//! assert_eq!(a, b);
//! assert_eq!(a.to_string().len(), 64);
//! ```

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of manifest text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestDigest([u8; 32]);

impl ManifestDigest {
    /// Hash the manifest text.
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Hash raw manifest bytes, such as a file read back from disk.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
