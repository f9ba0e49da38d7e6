//! Interface-definition compilers: Thrift and SWIG.

use mockable::Env;
use tracing::debug;

use super::{CommandBuilder, ToolProbe, include_flags, join_words};
use crate::error::SynthesisError;
use crate::rules::{Rule, RuleSetBuilder};

/// Map a `//dir:name` target label to its output under `build_dir`; any
/// other value is returned unchanged.
///
/// ```
/// use kumihimo::toolchain::thrift_binary;
///
/// assert_eq!(
///     thrift_binary("//thirdparty/thrift:thrift", "build64_release"),
///     "build64_release/thirdparty/thrift/thrift"
/// );
/// assert_eq!(thrift_binary("/usr/bin/thrift", "build64_release"), "/usr/bin/thrift");
/// ```
#[must_use]
pub fn thrift_binary(thrift: &str, build_dir: &str) -> String {
    thrift.strip_prefix("//").map_or_else(
        || thrift.to_owned(),
        |label| format!("{build_dir}/{}", label.replace(':', "/")),
    )
}

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// The `thrift` rule.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn thrift_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let cfg = &self.config.thrift;
        let build_dir = self.config.build_dir.as_str();
        let thrift = thrift_binary(&cfg.thrift, build_dir);
        let incs = include_flags("-I ", &cfg.thrift_incs);
        rules.define_rule(
            Rule::builder(
                "thrift",
                join_words([
                    thrift.as_str(),
                    "--gen",
                    cfg.thrift_gen_params.as_str(),
                    "-I .",
                    incs.as_str(),
                    "-I `dirname ${in}`",
                    format!("-out {build_dir}/`dirname ${{in}}` ${{in}}").as_str(),
                ]),
            )
            .description("THRIFT ${in}")
            .build(),
        )
    }

    /// `swigpython`, `swigjava` and `swigphp` when a SWIG binary is
    /// configured.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn swig_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let cfg = &self.config.swig;
        let Some(swig) = &cfg.swig else {
            debug!("swig not configured; skipping swig rules");
            return Ok(());
        };
        let tracking = self.dependency_tracking();
        let depfile_flags = if tracking { "-MMD -MF ${out}.d" } else { "" };
        let incs = include_flags("-I", &cfg.swig_incs);
        let generate = |language: &str| {
            join_words([
                swig.as_str(),
                language,
                depfile_flags,
                "-c++ -I.",
                incs.as_str(),
                "${swigflags} -o ${out} ${in}",
            ])
        };
        for (name, language, description) in [
            ("swigpython", "-python -threads", "SWIG PYTHON ${in}"),
            ("swigjava", "-java -package ${package}", "SWIG JAVA ${in}"),
            ("swigphp", "-php", "SWIG PHP ${in}"),
        ] {
            rules.define_rule(
                Rule::builder(name, generate(language))
                    .description(description)
                    .gcc_depfile(tracking)
                    .build(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("thrift", "thrift")]
    #[case("//tools:thrift", "out/tools/thrift")]
    #[case("//a/b:c", "out/a/b/c")]
    fn labels_resolve_into_build_dir(#[case] configured: &str, #[case] expected: &str) {
        assert_eq!(thrift_binary(configured, "out"), expected);
    }
}
