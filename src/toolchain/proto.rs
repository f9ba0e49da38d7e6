//! Protocol buffer compiler rules.

use camino::Utf8PathBuf;
use mockable::Env;
use tracing::debug;

use super::go::module_subpath;
use super::{CommandBuilder, ToolProbe, ToolchainFamily, include_flags, join_words};
use crate::error::SynthesisError;
use crate::rules::{Rule, RuleSetBuilder, Variable};

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// `proto`, `protojava`, `protopython`, `protodescriptors`, and `protogo`
    /// when a Go plugin is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Configuration`] when the configured Go
    /// plugin does not exist, `go.go_home` is unset, the module sub-path is
    /// invalid, or module mode has no `protobuf_go_path`.
    pub fn proto_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let cfg = &self.config.proto;
        let build_dir = self.config.build_dir.as_str();
        let protoc = cfg.protoc.as_str();
        let protoc_java = cfg.protoc_java.as_ref().map_or(protoc, |p| p.as_str());
        let incs = include_flags("-I=", &cfg.protobuf_incs);
        let java_incs = if cfg.protobuf_java_incs.is_empty() {
            incs.clone()
        } else {
            include_flags("-I=", &cfg.protobuf_java_incs)
        };

        rules.define_variables(
            [
                "protocflags",
                "protoccpppluginflags",
                "protocjavapluginflags",
                "protocpythonpluginflags",
            ]
            .map(|name| Variable::new(name, "")),
        );

        rules.define_rule(
            Rule::builder(
                "proto",
                join_words([
                    protoc,
                    "--proto_path=.",
                    incs.as_str(),
                    "-I=`dirname ${in}`",
                    format!("--cpp_out={build_dir}").as_str(),
                    "${protocflags} ${protoccpppluginflags} ${in}",
                ]),
            )
            .description("PROTOC ${in}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "protojava",
                join_words([
                    protoc_java,
                    "--proto_path=.",
                    java_incs.as_str(),
                    format!("--java_out={build_dir}/`dirname ${{in}}`").as_str(),
                    "${protocjavapluginflags} ${in}",
                ]),
            )
            .description("PROTOCJAVA ${in}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "protopython",
                join_words([
                    protoc,
                    "--proto_path=.",
                    incs.as_str(),
                    "-I=`dirname ${in}`",
                    format!("--python_out={build_dir}").as_str(),
                    "${protocpythonpluginflags} ${in}",
                ]),
            )
            .description("PROTOCPYTHON ${in}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "protodescriptors",
                join_words([
                    protoc,
                    "--proto_path=.",
                    incs.as_str(),
                    "-I=`dirname ${first}`",
                    "--descriptor_set_out=${out} --include_imports --include_source_info ${in}",
                ]),
            )
            .description("PROTODESCRIPTORS ${in}")
            .build(),
        )?;

        let Some(plugin) = &cfg.protoc_go_plugin else {
            debug!("protoc_go_plugin not configured; skipping protogo");
            return Ok(());
        };
        if self.probe.resolve(plugin).is_none() {
            return Err(SynthesisError::configuration(
                ToolchainFamily::Proto,
                format!("protoc_go_plugin '{plugin}' does not exist or is not executable"),
            ));
        }
        let go_out = self.go_proto_out()?;
        rules.define_rule(
            Rule::builder(
                "protogo",
                join_words([
                    protoc,
                    "--proto_path=.",
                    incs.as_str(),
                    "-I=`dirname ${in}`",
                    format!("--plugin=protoc-gen-go={plugin}").as_str(),
                    format!("--go_out={go_out}").as_str(),
                    "${in}",
                ]),
            )
            .description("PROTOCGOLANG ${in}")
            .build(),
        )
    }

    /// Value of `--go_out`: the output directory, prefixed with the
    /// sub-plugin list when one is configured.
    fn go_proto_out(&self) -> Result<String, SynthesisError> {
        let go = &self.config.go;
        let Some(go_home) = &go.go_home else {
            return Err(SynthesisError::configuration(
                ToolchainFamily::Go,
                "go_home must be configured to generate Go protobuf sources",
            ));
        };
        let at_module_root = module_subpath(go.go_module_relpath.as_deref())?.is_none();
        let outdir: Utf8PathBuf = if go.go_module_enabled && at_module_root {
            let module_out = &self.config.proto.protobuf_go_path;
            if module_out.as_str().is_empty() {
                return Err(SynthesisError::configuration(
                    ToolchainFamily::Proto,
                    "protobuf_go_path must be configured to generate Go protobuf sources in module mode",
                ));
            }
            module_out.clone()
        } else {
            go_home.join("src")
        };
        let subplugins = &self.config.proto.protoc_go_subplugins;
        if subplugins.is_empty() {
            Ok(outdir.into_string())
        } else {
            Ok(format!("plugins={}:{outdir}", subplugins.join("+")))
        }
    }
}
