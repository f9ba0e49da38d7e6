//! Toolchain configuration.
//!
//! The configuration is resolved by an external discovery step and handed
//! to synthesis read-only. It is stored as YAML with one section per
//! toolchain family; every field has a default so a configuration only
//! needs to mention what differs.
//!
//! ```
//! use kumihimo::config::ToolchainConfig;
//!
//! let yaml = "build_dir: out\nlink:\n  link_jobs: 4\n";
//! let config = ToolchainConfig::from_str(yaml).expect("parse");
//! assert_eq!(config.build_dir, "out");
//! assert_eq!(config.link.link_jobs.map(|n| n.get()), Some(4));
//! ```

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

mod sections;

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use sections::{
    CacheConfig, CcConfig, GoConfig, HelperConfig, JavaBinaryConfig, JavaConfig, JavaTestConfig,
    LinkConfig, ProtoConfig, ScalaConfig, SwigConfig, ThriftConfig, VersionConfig,
};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read toolchain configuration {path}")]
    #[diagnostic(code(kumihimo::config::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The YAML did not match the schema.
    #[error("invalid toolchain configuration {name}")]
    #[diagnostic(
        code(kumihimo::config::parse),
        help("unknown keys are rejected; check the section and field names")
    )]
    Parse {
        /// File name, or `<string>` for inline text.
        name: String,
        /// Parser failure.
        #[source]
        source: serde_saphyr::Error,
    },

    /// A field holds a value the manifest cannot carry.
    #[error("invalid toolchain configuration {name}: {field} must not contain line breaks")]
    #[diagnostic(
        code(kumihimo::config::line_break),
        help("version stamp values are written on a single manifest line")
    )]
    LineBreak {
        /// File name, or `<string>` for inline text.
        name: String,
        /// Dotted path of the offending field.
        field: &'static str,
    },
}

/// Resolved toolchain configuration for one build session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Directory receiving build outputs, relative to the workspace root.
    pub build_dir: Utf8PathBuf,
    /// Workspace root.
    pub root_dir: Utf8PathBuf,
    /// Build profile recorded in the version stamp.
    pub profile: String,
    /// Oldest Ninja release the manifest targets.
    #[serde(deserialize_with = "deserialize_version")]
    pub ninja_required_version: Version,
    /// Delegated step helper.
    pub helper: HelperConfig,
    /// Link tuning.
    pub link: LinkConfig,
    /// C/C++ toolchain.
    pub cc: CcConfig,
    /// Protocol buffers.
    pub proto: ProtoConfig,
    /// Java compiler.
    pub java: JavaConfig,
    /// Java tests.
    pub java_test: JavaTestConfig,
    /// Java binaries.
    pub java_binary: JavaBinaryConfig,
    /// Scala.
    pub scala: ScalaConfig,
    /// Thrift.
    pub thrift: ThriftConfig,
    /// Go.
    pub go: GoConfig,
    /// SWIG.
    pub swig: SwigConfig,
    /// Version stamp metadata.
    pub version: VersionConfig,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            build_dir: Utf8PathBuf::from("build64_release"),
            root_dir: Utf8PathBuf::from("."),
            profile: "release".into(),
            ninja_required_version: DEFAULT_NINJA_VERSION,
            helper: HelperConfig::default(),
            link: LinkConfig::default(),
            cc: CcConfig::default(),
            proto: ProtoConfig::default(),
            java: JavaConfig::default(),
            java_test: JavaTestConfig::default(),
            java_binary: JavaBinaryConfig::default(),
            scala: ScalaConfig::default(),
            thrift: ThriftConfig::default(),
            go: GoConfig::default(),
            swig: SwigConfig::default(),
            version: VersionConfig::default(),
        }
    }
}

/// Ninja release targeted when the configuration does not say.
pub const DEFAULT_NINJA_VERSION: Version = Version::new(1, 7, 0);

/// First Ninja release able to read `deps = gcc` dependency logs.
pub const DEPS_LOG_VERSION: Version = Version::new(1, 3, 0);

impl ToolchainConfig {
    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the YAML does not match the schema
    /// and [`ConfigError::LineBreak`] when a version stamp value spans lines.
    #[expect(
        clippy::should_implement_trait,
        reason = "mirrors serde-style constructors; FromStr would hide the error type"
    )]
    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_named(yaml, "<string>")
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] or [`ConfigError::LineBreak`] when its contents
    /// are invalid.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse_named(&text, path.as_str())
    }

    fn parse_named(yaml: &str, name: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_saphyr::from_str(yaml).map_err(|source| ConfigError::Parse {
            name: name.to_owned(),
            source,
        })?;
        match config.multiline_stamp_field() {
            Some(field) => Err(ConfigError::LineBreak {
                name: name.to_owned(),
                field,
            }),
            None => Ok(config),
        }
    }

    /// First version stamp field whose value spans lines.
    ///
    /// These values become per-edge bindings, and a line break would end the
    /// binding early.
    #[must_use]
    pub fn multiline_stamp_field(&self) -> Option<&'static str> {
        [
            ("profile", self.profile.as_str()),
            ("version.revision", self.version.revision.as_str()),
            ("version.url", self.version.url.as_str()),
            ("version.compiler", self.version.compiler.as_str()),
        ]
        .into_iter()
        .find_map(|(field, value)| value.contains(['\n', '\r']).then_some(field))
    }

    /// Whether the targeted Ninja release records compiler dependency logs.
    #[must_use]
    pub fn supports_deps_log(&self) -> bool {
        self.ninja_required_version >= DEPS_LOG_VERSION
    }
}

/// Accept `1.7` as well as full `1.7.0` versions.
fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_ninja_version(&raw).map_err(serde::de::Error::custom)
}

/// Parse a Ninja version, padding a missing patch or minor component.
///
/// # Errors
///
/// Returns the `semver` error when the padded text is still not a version.
pub fn parse_ninja_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let padded = match trimmed.matches('.').count() {
        0 => format!("{trimmed}.0.0"),
        1 => format!("{trimmed}.0"),
        _ => trimmed.to_owned(),
    };
    Version::parse(&padded)
}

#[cfg(test)]
mod tests;
