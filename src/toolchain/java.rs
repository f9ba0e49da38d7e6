//! Java and Scala rules.
//!
//! Compilation runs `javac`/`scalac` directly; jar assembly, test and binary
//! launchers are delegated steps.

use camino::{Utf8Path, Utf8PathBuf};
use mockable::Env;
use tracing::debug;

use super::{CommandBuilder, ToolProbe, join_words};
use crate::dispatch::DelegatedStep;
use crate::error::SynthesisError;
use crate::rules::{Rule, RuleSetBuilder, Variable};

/// `<home>/bin/<tool>` when `home` is set, else the bare tool name.
fn home_tool(home: Option<&Utf8Path>, tool: &str) -> Utf8PathBuf {
    home.map_or_else(|| Utf8PathBuf::from(tool), |dir| dir.join("bin").join(tool))
}

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    fn java_tool(&self, tool: &str) -> Utf8PathBuf {
        home_tool(self.config.java.java_home.as_deref(), tool)
    }

    /// Java rules followed by Scala rules.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn java_scala_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        self.javac_rules(rules)?;
        rules.define_rule(
            Rule::builder(
                "javaresource",
                self.dispatcher
                    .build_delegated_command(DelegatedStep::JavaResource, None, &[]),
            )
            .description("JAVA RESOURCE ${in}")
            .build(),
        )?;
        let jar = self.java_tool("jar");
        rules.define_rule(
            Rule::builder(
                "javajar",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::JavaJar,
                    None,
                    &[jar.as_str(), "${out} ${in}"],
                ),
            )
            .description("JAVA JAR ${out}")
            .build(),
        )?;
        self.java_test_rules(rules)?;
        rules.define_rule(
            Rule::builder(
                "fatjar",
                self.dispatcher
                    .build_delegated_command(DelegatedStep::JavaFatjar, None, &[]),
            )
            .description("FAT JAR ${out}")
            .build(),
        )?;
        self.java_binary_rules(rules)?;
        self.scala_rules(rules)
    }

    fn javac_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let cfg = &self.config.java;
        let javac = self.java_tool("javac");
        let jar = self.java_tool("jar");
        let version = cfg.version.as_deref().filter(|v| !v.is_empty());
        let source = cfg
            .source_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(version)
            .map(|v| format!("-source {v}"))
            .unwrap_or_default();
        let target = cfg
            .target_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(version)
            .map(|v| format!("-target {v}"))
            .unwrap_or_default();
        let compile = join_words([
            javac.as_str(),
            source.as_str(),
            target.as_str(),
            "-encoding ${source_encoding}",
            "-d ${classes_dir}",
            "-classpath ${classpath}",
            "${javacflags}",
            "${in}",
        ]);

        rules.define_variables([
            Variable::new("source_encoding", "UTF-8"),
            Variable::new("classpath", "."),
            Variable::new("javacflags", ""),
        ]);
        rules.define_rule(
            Rule::builder(
                "javac",
                format!(
                    "rm -fr ${{classes_dir}} && mkdir -p ${{classes_dir}} && {compile} && \
                     sleep 0.5 && {jar} cf ${{out}} -C ${{classes_dir}} ."
                ),
            )
            .description("JAVAC ${in}")
            .build(),
        )
    }

    fn java_test_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let prefix = self
            .config
            .java_test
            .jacoco_home
            .as_ref()
            .map(|home| format!("BLADE_JACOCOAGENT={}", home.join("lib").join("jacocoagent.jar")));
        rules.define_variables([Variable::new(
            "javatargetundertestpkg",
            "__targetundertestpkg__",
        )]);
        rules.define_rule(
            Rule::builder(
                "javatest",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::JavaTest,
                    prefix.as_deref(),
                    &["${mainclass} ${javatargetundertestpkg} ${out} ${in}"],
                ),
            )
            .description("JAVA TEST ${out}")
            .build(),
        )
    }

    fn java_binary_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        if let Some(boot_jar) = &self.config.java_binary.one_jar_boot_jar {
            rules.define_rule(
                Rule::builder(
                    "onejar",
                    self.dispatcher.build_delegated_command(
                        DelegatedStep::JavaOnejar,
                        None,
                        &[boot_jar.as_str(), "${mainclass} ${out} ${in}"],
                    ),
                )
                .description("ONE JAR ${out}")
                .build(),
            )?;
        } else {
            debug!("one_jar_boot_jar not configured; skipping onejar");
        }
        rules.define_rule(
            Rule::builder(
                "javabinary",
                self.dispatcher
                    .build_delegated_command(DelegatedStep::JavaBinary, None, &[]),
            )
            .description("JAVA BIN ${out}")
            .build(),
        )
    }

    fn scala_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let scala_home = self.config.scala.scala_home.as_deref();
        let scala = home_tool(scala_home, "scala");
        let scalac = home_tool(scala_home, "scalac");
        let java = self.java_tool("java");

        rules.define_variables([Variable::new("scalacflags", "-nowarn")]);
        rules.define_rule(
            Rule::builder(
                "scalac",
                format!(
                    "JAVACMD={java} {scalac} -encoding UTF8 -d ${{out}} \
                     -classpath ${{classpath}} ${{scalacflags}} ${{in}}"
                ),
            )
            .description("SCALAC ${out}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "scalatest",
                self.dispatcher.build_delegated_command(
                    DelegatedStep::ScalaTest,
                    None,
                    &[java.as_str(), scala.as_str(), "${out} ${in}"],
                ),
            )
            .description("SCALA TEST ${out}")
            .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "javac", "javac")]
    #[case(Some("/usr/lib/jvm/jdk"), "jar", "/usr/lib/jvm/jdk/bin/jar")]
    fn tools_resolve_under_home(
        #[case] home: Option<&str>,
        #[case] tool: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(home_tool(home.map(Utf8Path::new), tool), expected);
    }
}
