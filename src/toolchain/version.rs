//! Version-control stamp compiled into every binary.

use mockable::Env;

use super::{CommandBuilder, ToolProbe, ToolchainFamily};
use crate::dispatch::DelegatedStep;
use crate::edges::BuildEdge;
use crate::error::SynthesisError;
use crate::ninja_gen::escape_value;
use crate::rules::{Rule, RuleSetBuilder};

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// The `scm` rule and the two statements that generate and compile
    /// `<build_dir>/scm.cc`.
    ///
    /// Must run after [`Self::cc_rules`], which declares `cxx`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Configuration`] when a stamp value spans
    /// lines, [`SynthesisError::ReferentialIntegrity`] when `cxx` has not
    /// been declared, and propagates other registry failures.
    pub fn version_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder(
                "scm",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::Scm,
                    None,
                    &[r#"${out} ${revision} ${url} ${profile} "${compiler}""#],
                ),
            )
            .description("SCM ${out}")
            .build(),
        )?;

        if let Some(field) = self.config.multiline_stamp_field() {
            return Err(SynthesisError::configuration(
                ToolchainFamily::Version,
                format!("{field} must not contain line breaks"),
            ));
        }
        let version = &self.config.version;
        let scm = self.config.build_dir.join("scm.cc");
        let object = self.config.build_dir.join("scm.cc.o");
        rules.add_build(
            BuildEdge::new("scm", [scm.clone()])
                .with_variable("revision", escape_value(&version.revision))
                .with_variable("url", escape_value(&version.url))
                .with_variable("profile", escape_value(&self.config.profile))
                .with_variable("compiler", escape_value(&version.compiler)),
        )?;
        rules.add_build(
            BuildEdge::new("cxx", [object])
                .with_inputs([scm])
                .with_variable("cppflags", "-w -O2")
                .with_variable("cxx_warnings", ""),
        )
    }
}
