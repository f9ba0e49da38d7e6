//! Python packaging rules.

use mockable::Env;

use super::{CommandBuilder, ToolProbe};
use crate::dispatch::DelegatedStep;
use crate::error::SynthesisError;
use crate::rules::{Rule, RuleSetBuilder, Variable};

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// `pythonlibrary` and `pythonbinary`, preceded by `pythonbasedir`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn python_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_variables([Variable::new("pythonbasedir", "__pythonbasedir__")]);
        rules.define_rule(
            Rule::builder(
                "pythonlibrary",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::PythonLibrary,
                    None,
                    &["${pythonbasedir} ${out} ${in}"],
                ),
            )
            .description("PYTHON LIBRARY ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "pythonbinary",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::PythonBinary,
                    None,
                    &["${pythonbasedir} ${mainentry} ${out} ${in}"],
                ),
            )
            .description("PYTHON BINARY ${out}")
            .build(),
        )
    }
}
