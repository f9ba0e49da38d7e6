//! Command lines for delegated build steps.
//!
//! Some steps (archive repackaging, resource indexing, version stamping,
//! multi-file jar assembly) need imperative logic that a single tool
//! invocation cannot express. Their rules run an out-of-process helper that
//! finds its library code through an environment-variable prefix. The
//! [`Dispatcher`] only builds that command line; Ninja runs it later.
//!
//! # Examples
//!
//! ```
//! use kumihimo::config::HelperConfig;
//! use kumihimo::dispatch::{DelegatedStep, Dispatcher};
//!
//! let dispatcher = Dispatcher::new(&HelperConfig::default());
//! let cmd = dispatcher.build_delegated_command(DelegatedStep::JavaJar, None, &["jar", "${out}", "${in}"]);
//! assert_eq!(
//!     cmd,
//!     "PYTHONPATH=.:$$PYTHONPATH python3 -m kumihimo_toolchain java_jar jar ${out} ${in}"
//! );
//! ```

use std::fmt;

use shell_quote::{QuoteRefExt, Sh};

use crate::config::HelperConfig;

/// Positional arguments used when a step needs nothing extra.
pub const DEFAULT_ARGS: &str = "${out} ${in}";

/// Steps handled by the helper process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegatedStep {
    /// Copy a secure-compiled object and verify it.
    SecureccObject,
    /// Generate the resource lookup table.
    ResourceIndex,
    /// Collect Java resources.
    JavaResource,
    /// Assemble a jar from classes and resources.
    JavaJar,
    /// Produce a Java test launcher.
    JavaTest,
    /// Merge dependency jars into one.
    JavaFatjar,
    /// Wrap dependencies into a One-JAR.
    JavaOnejar,
    /// Produce a Java binary launcher.
    JavaBinary,
    /// Produce a Scala test launcher.
    ScalaTest,
    /// Package Python sources.
    PythonLibrary,
    /// Build a self-contained Python executable.
    PythonBinary,
    /// Produce a shell test launcher.
    ShellTest,
    /// Stage shell test data.
    ShellTestdata,
    /// Build an archive from staged entries.
    Package,
    /// Write version-control metadata into a source file.
    Scm,
}

impl DelegatedStep {
    /// Name understood by the helper process.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecureccObject => "securecc_object",
            Self::ResourceIndex => "resource_index",
            Self::JavaResource => "java_resource",
            Self::JavaJar => "java_jar",
            Self::JavaTest => "java_test",
            Self::JavaFatjar => "java_fatjar",
            Self::JavaOnejar => "java_onejar",
            Self::JavaBinary => "java_binary",
            Self::ScalaTest => "scala_test",
            Self::PythonLibrary => "python_library",
            Self::PythonBinary => "python_binary",
            Self::ShellTest => "shell_test",
            Self::ShellTestdata => "shell_testdata",
            Self::Package => "package",
            Self::Scm => "scm",
        }
    }
}

impl fmt::Display for DelegatedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds helper invocations for delegated steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    search_path_var: String,
    library_path: String,
    launcher: Vec<String>,
}

impl Dispatcher {
    /// Create a dispatcher from the helper configuration.
    #[must_use]
    pub fn new(config: &HelperConfig) -> Self {
        Self {
            search_path_var: config.search_path_var.clone(),
            library_path: quote_word(config.library_path.as_str()),
            launcher: config.launcher.iter().map(|w| quote_word(w)).collect(),
        }
    }

    /// Build the command line for `step`.
    ///
    /// `prefix_env` is inserted after the search path assignment, typically
    /// further `NAME=value` pairs. When `positional_args` is empty the helper
    /// receives `${out} ${in}`.
    #[must_use]
    pub fn build_delegated_command(
        &self,
        step: DelegatedStep,
        prefix_env: Option<&str>,
        positional_args: &[&str],
    ) -> String {
        let var = &self.search_path_var;
        let mut words = vec![format!("{var}={}:$${var}", self.library_path)];
        if let Some(prefix) = prefix_env.filter(|p| !p.trim().is_empty()) {
            words.push(prefix.to_owned());
        }
        words.extend(self.launcher.iter().cloned());
        words.push(step.as_str().to_owned());
        if positional_args.is_empty() {
            words.push(DEFAULT_ARGS.to_owned());
        } else {
            words.extend(positional_args.iter().map(|arg| (*arg).to_owned()));
        }
        words.join(" ")
    }
}

/// Returns `true` when `word` survives the shell unquoted.
fn is_shell_safe(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@%+=,".contains(c))
}

/// Quote `word` for the shell when needed, then escape it for Ninja.
fn quote_word(word: &str) -> String {
    if is_shell_safe(word) {
        return word.to_owned();
    }
    let bytes: Vec<u8> = word.quoted(Sh);
    let quoted = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug_assert!(false, "shell quoting produced non UTF-8 bytes: {err}");
            String::from_utf8_lossy(&err.into_bytes()).into_owned()
        }
    };
    quoted.replace('$', "$$")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&HelperConfig {
            library_path: Utf8PathBuf::from("/opt/kumihimo/lib"),
            search_path_var: "PYTHONPATH".into(),
            launcher: vec!["/usr/bin/python3".into(), "-m".into(), "toolchain".into()],
        })
    }

    #[rstest]
    fn default_arguments_are_out_then_in(dispatcher: Dispatcher) {
        let cmd = dispatcher.build_delegated_command(DelegatedStep::JavaFatjar, None, &[]);
        assert_eq!(
            cmd,
            "PYTHONPATH=/opt/kumihimo/lib:$$PYTHONPATH /usr/bin/python3 -m toolchain java_fatjar ${out} ${in}"
        );
    }

    #[rstest]
    fn prefix_and_extra_arguments_are_kept_in_place(dispatcher: Dispatcher) {
        let cmd = dispatcher.build_delegated_command(
            DelegatedStep::JavaTest,
            Some("BLADE_JACOCOAGENT=/opt/jacoco/lib/jacocoagent.jar"),
            &["${mainclass}", "${out}", "${in}"],
        );
        assert_eq!(
            cmd,
            "PYTHONPATH=/opt/kumihimo/lib:$$PYTHONPATH BLADE_JACOCOAGENT=/opt/jacoco/lib/jacocoagent.jar /usr/bin/python3 -m toolchain java_test ${mainclass} ${out} ${in}"
        );
    }

    #[rstest]
    fn blank_prefix_is_ignored(dispatcher: Dispatcher) {
        let with_blank = dispatcher.build_delegated_command(DelegatedStep::Package, Some(""), &[]);
        let without = dispatcher.build_delegated_command(DelegatedStep::Package, None, &[]);
        assert_eq!(with_blank, without);
    }

    #[rstest]
    fn unsafe_library_paths_are_quoted() {
        let dispatcher = Dispatcher::new(&HelperConfig {
            library_path: Utf8PathBuf::from("/opt/my tools"),
            ..HelperConfig::default()
        });
        let cmd = dispatcher.build_delegated_command(DelegatedStep::Scm, None, &[]);
        assert!(!cmd.starts_with("PYTHONPATH=/opt/my tools:"), "{cmd}");
        assert!(shlex::split(&cmd.replace("$$", "$")).is_some(), "{cmd}");
    }

    #[rstest]
    #[case(DelegatedStep::SecureccObject, "securecc_object")]
    #[case(DelegatedStep::ShellTestdata, "shell_testdata")]
    #[case(DelegatedStep::Scm, "scm")]
    fn step_names(#[case] step: DelegatedStep, #[case] name: &str) {
        assert_eq!(step.to_string(), name);
    }
}
