//! Go toolchain rules and dependency-resolution layout.
//!
//! Go resolves packages either through a single shared `GOPATH` or through
//! `go.mod` module roots. In module mode the module may live below the
//! workspace root, in which case every invocation first changes into it and
//! output paths must be rewritten to stay anchored at the workspace root.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use mockable::Env;
use tracing::debug;

use super::{CommandBuilder, ToolProbe, ToolchainFamily, normalize_lexically, relative_to};
use crate::error::SynthesisError;
use crate::rules::{GOLANG_POOL, Rule, RuleSetBuilder};

/// Inputs to [`go_layout`].
#[derive(Debug, Clone, Copy)]
pub struct GoModeInput<'a> {
    /// Resolve through `go.mod` rather than `GOPATH`.
    pub module_enabled: bool,
    /// Module root relative to the workspace root.
    pub module_relpath: Option<&'a Utf8Path>,
    /// `GOPATH` root, relative to `root_dir` unless absolute.
    pub go_home: &'a Utf8Path,
    /// `go` binary as configured.
    pub go: &'a Utf8Path,
    /// Workspace root.
    pub root_dir: &'a Utf8Path,
}

/// How Go invocations are spelled for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoLayout {
    /// Text placed before the Go sub-command, e.g. `GOPATH=/ws/go go`.
    pub command_prefix: String,
    /// Prepended to `${out}` so outputs land relative to the workspace root.
    pub output_prefix: String,
}

/// Compute the command prefix and output rewrite for the Go toolchain.
///
/// # Errors
///
/// Returns [`SynthesisError::Configuration`] when the module sub-path is
/// absolute or escapes the workspace root.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use kumihimo::toolchain::{GoModeInput, go_layout};
///
/// let layout = go_layout(&GoModeInput {
///     module_enabled: true,
///     module_relpath: Some(Utf8Path::new("src/service")),
///     go_home: Utf8Path::new("go"),
///     go: Utf8Path::new("tools/go/bin/go"),
///     root_dir: Utf8Path::new("/ws"),
/// })
/// .expect("valid layout");
/// assert_eq!(layout.command_prefix, "cd src/service && ../../tools/go/bin/go");
/// assert_eq!(layout.output_prefix, "../../");
/// ```
pub fn go_layout(input: &GoModeInput<'_>) -> Result<GoLayout, SynthesisError> {
    if !input.module_enabled {
        let gopath = normalize_lexically(&input.root_dir.join(input.go_home));
        return Ok(GoLayout {
            command_prefix: format!("GOPATH={gopath} {}", input.go),
            output_prefix: String::new(),
        });
    }

    let Some(subpath) = module_subpath(input.module_relpath)? else {
        return Ok(GoLayout {
            command_prefix: input.go.to_string(),
            output_prefix: String::new(),
        });
    };

    let go = if input.go.is_absolute() || input.go.components().count() == 1 {
        input.go.to_owned()
    } else {
        relative_to(input.go, &subpath).ok_or_else(|| {
            SynthesisError::configuration(
                ToolchainFamily::Go,
                format!("cannot express '{}' relative to '{subpath}'", input.go),
            )
        })?
    };
    let depth = subpath.components().count();
    Ok(GoLayout {
        command_prefix: format!("cd {subpath} && {go}"),
        output_prefix: "../".repeat(depth),
    })
}

/// Validate the module sub-path, returning `None` when it names the root.
pub(super) fn module_subpath(
    relpath: Option<&Utf8Path>,
) -> Result<Option<Utf8PathBuf>, SynthesisError> {
    let Some(raw) = relpath.filter(|p| !p.as_str().is_empty()) else {
        return Ok(None);
    };
    if raw.is_absolute() {
        return Err(SynthesisError::configuration(
            ToolchainFamily::Go,
            format!("go_module_relpath '{raw}' must be relative to the workspace root"),
        ));
    }
    let normalised = normalize_lexically(raw);
    if normalised
        .components()
        .any(|c| matches!(c, Utf8Component::ParentDir))
    {
        return Err(SynthesisError::configuration(
            ToolchainFamily::Go,
            format!("go_module_relpath '{raw}' escapes the workspace root"),
        ));
    }
    if normalised == "." {
        return Ok(None);
    }
    Ok(Some(normalised))
}

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// Go rules, bound to the single-job `golang_pool`.
    ///
    /// Skipped when either `go.go_home` or `go.go` is unset.
    ///
    /// # Errors
    ///
    /// Propagates [`go_layout`] and registry failures.
    pub fn go_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let go = &self.config.go;
        let (Some(go_home), Some(go_bin)) = (go.go_home.as_deref(), go.go.as_deref()) else {
            debug!("go toolchain not configured; skipping go rules");
            return Ok(());
        };
        let layout = go_layout(&GoModeInput {
            module_enabled: go.go_module_enabled,
            module_relpath: go.go_module_relpath.as_deref(),
            go_home,
            go: go_bin,
            root_dir: &self.config.root_dir,
        })?;
        let pool = rules.declare_pool(GOLANG_POOL, 1)?;
        let prefix = &layout.command_prefix;
        let out = &layout.output_prefix;

        rules.define_rule(
            Rule::builder(
                "gopackage",
                format!("{prefix} install ${{extra_goflags}} ${{package}}"),
            )
            .description("GOLANG PACKAGE ${package}")
            .pool(&pool)
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "gocommand",
                format!("{prefix} build -o {out}${{out}} ${{extra_goflags}} ${{package}}"),
            )
            .description("GOLANG COMMAND ${package}")
            .pool(&pool)
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "gotest",
                format!("{prefix} test -c -o {out}${{out}} ${{extra_goflags}} ${{package}}"),
            )
            .description("GOLANG TEST ${package}")
            .pool(&pool)
            .build(),
        )
    }
}
