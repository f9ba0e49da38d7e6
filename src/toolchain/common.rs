//! Toolchain-independent rules: stamps, copies, resources, shell tests,
//! parser generators and archives.

use mockable::Env;

use super::{CommandBuilder, ToolProbe};
use crate::dispatch::DelegatedStep;
use crate::error::SynthesisError;
use crate::rules::{Rule, RuleSetBuilder};

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// `stamp` and `copy`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn common_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder("stamp", "touch ${out}")
                .description("STAMP ${out}")
                .build(),
        )?;
        rules.define_rule(
            Rule::builder("copy", "cp -f ${in} ${out}")
                .description("COPY ${in} ${out}")
                .build(),
        )
    }

    /// `resource_index` and `resource`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn resource_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder(
                "resource_index",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::ResourceIndex,
                    None,
                    &["${name} ${path} ${out} ${in}"],
                ),
            )
            .description("RESOURCE INDEX ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "resource",
                concat!(
                    "xxd -i ${in} | ",
                    r#"sed -e "s/^unsigned char /const char RESOURCE_/g" "#,
                    r#"-e "s/^unsigned int /const unsigned int RESOURCE_/g" > ${out}"#,
                ),
            )
            .description("RESOURCE ${in}")
            .build(),
        )
    }

    /// `shelltest` and `shelltestdata`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn shell_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder(
                "shelltest",
                self.dispatcher
                    .build_delegated_command(DelegatedStep::ShellTest, None, &[]),
            )
            .description("SHELL TEST ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "shelltestdata",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::ShellTestdata,
                    None,
                    &["${out} ${in} ${testdata}"],
                ),
            )
            .description("SHELL TEST DATA ${out}")
            .build(),
        )
    }

    /// `lex` and `yacc`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn lex_yacc_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder("lex", "flex ${lexflags} -o ${out} ${in}")
                .description("LEX ${in}")
                .build(),
        )?;
        rules.define_rule(
            Rule::builder("yacc", "bison ${yaccflags} -o ${out} ${in}")
                .description("YACC ${in}")
                .build(),
        )
    }

    /// `package`, `package_tar` and `package_zip`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn package_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        rules.define_rule(
            Rule::builder(
                "package",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::Package,
                    None,
                    &["${out} ${in} ${entries}"],
                ),
            )
            .description("PACKAGE ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "package_tar",
                "tar -c -f ${out} ${tarflags} -C ${packageroot} ${entries}",
            )
            .description("TAR ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "package_zip",
                concat!(
                    "cd ${packageroot} && zip -q temp_archive.zip ${entries} && ",
                    "cd - && mv ${packageroot}/temp_archive.zip ${out}",
                ),
            )
            .description("ZIP ${out}")
            .build(),
        )
    }
}
