//! Native C/C++ compile, archive and link rules.

use mockable::Env;
use toolchain_env::{CC_ENV, CXX_ENV, DEFAULT_CC, DEFAULT_CXX, DEFAULT_LD, LD_ENV};
use tracing::{debug, info, warn};

use super::{CommandBuilder, ToolProbe, join_words};
use crate::dispatch::DelegatedStep;
use crate::edges::{BuildEdge, PHONY_RULE};
use crate::error::SynthesisError;
use crate::rules::{LINK_POOL, PoolRef, Rule, RuleSetBuilder, Variable, link_pool_depth};

/// Phony target secure-compiled objects depend on.
pub const SECURECC_PHONY: &str = "__securecc_phony__";

/// Compiler invocations after environment overrides and caching.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compilers {
    cc: String,
    cxx: String,
    ld: String,
    /// C++ compiler without the caching proxy, for wrappers that must be
    /// the first word of the command.
    plain_cxx: String,
}

/// Configured flags shared by every compile rule.
#[derive(Debug)]
struct CompileFlags {
    cflags: String,
    cxxflags: String,
    cppflags: String,
    includes: String,
}

impl<E: Env, P: ToolProbe> CommandBuilder<'_, E, P> {
    /// Read `name` from the environment, falling back to `default` when it is
    /// unset or blank.
    fn env_or(&self, name: &str, default: &str) -> String {
        self.env
            .raw(name)
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_owned())
    }

    /// Command prefix for the compilation cache, when enabled and installed.
    fn cache_prefix(&self) -> Option<String> {
        let cache = &self.config.cc.cache;
        if !cache.enabled {
            return None;
        }
        if self.probe.resolve(&cache.program).is_none() {
            warn!(
                program = %cache.program,
                "compilation cache is enabled but not installed; compiling without it"
            );
            return None;
        }
        Some(format!(
            "CCACHE_BASEDIR={} CCACHE_NOHASHDIR=true {}",
            self.config.root_dir, cache.program
        ))
    }

    fn compilers(&self) -> Compilers {
        let cc = self.env_or(CC_ENV, DEFAULT_CC);
        let cxx = self.env_or(CXX_ENV, DEFAULT_CXX);
        let ld = self.env_or(LD_ENV, DEFAULT_LD);
        let prefix = self.cache_prefix().unwrap_or_default();
        Compilers {
            cc: join_words([prefix.as_str(), cc.as_str()]),
            cxx: join_words([prefix.as_str(), cxx.as_str()]),
            ld,
            plain_cxx: cxx,
        }
    }

    /// C/C++ rules: warning variables, `cc`, `cxx`, optional header
    /// inclusion and secure-compile rules, `ar`, the link pool, `link`,
    /// `solink` and `strip`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn cc_rules(&self, rules: &mut RuleSetBuilder) -> Result<(), SynthesisError> {
        let cfg = &self.config.cc;
        let compilers = self.compilers();
        let flags = CompileFlags {
            cflags: cfg.cflags.join(" "),
            cxxflags: cfg.cxxflags.join(" "),
            cppflags: cfg.cppflags.join(" "),
            includes: join_words(
                cfg.extra_incs
                    .iter()
                    .map(String::as_str)
                    .chain([".", self.config.build_dir.as_str()])
                    .map(|inc| format!("-I{inc}")),
            ),
        };
        self.compile_rules(rules, &compilers, &flags)?;
        if cfg.header_inclusion_dependencies {
            header_rules(rules, &compilers, &flags)?;
        }
        self.securecc_rules(rules, &compilers, &flags)?;
        self.archive_link_rules(rules, &compilers)
    }

    fn compile_rules(
        &self,
        rules: &mut RuleSetBuilder,
        compilers: &Compilers,
        flags: &CompileFlags,
    ) -> Result<(), SynthesisError> {
        let cfg = &self.config.cc;
        let warnings = |specific: &[String]| {
            join_words(specific.iter().chain(&cfg.warnings).map(String::as_str))
        };
        rules.define_variables([
            Variable::new("c_warnings", warnings(&cfg.c_warnings)),
            Variable::new("cxx_warnings", warnings(&cfg.cxx_warnings)),
        ]);

        let tracking = self.dependency_tracking();
        let depfile_flags = if tracking { "-MMD -MF ${out}.d" } else { "" };
        let compile = |compiler: &str, lang_flags: &str, warnings_var: &str| {
            join_words([
                compiler,
                "-o ${out}",
                depfile_flags,
                "-c -fPIC",
                lang_flags,
                flags.cppflags.as_str(),
                warnings_var,
                "${cppflags}",
                flags.includes.as_str(),
                "${includes} ${in}",
            ])
        };
        rules.define_rule(
            Rule::builder("cc", compile(&compilers.cc, &flags.cflags, "${c_warnings}"))
                .description("CC ${in}")
                .gcc_depfile(tracking)
                .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "cxx",
                compile(&compilers.cxx, &flags.cxxflags, "${cxx_warnings}"),
            )
            .description("CXX ${in}")
            .gcc_depfile(tracking)
            .build(),
        )
    }

    /// The secure-compile phony edge and rule pair, when a wrapper is set.
    fn securecc_rules(
        &self,
        rules: &mut RuleSetBuilder,
        compilers: &Compilers,
        flags: &CompileFlags,
    ) -> Result<(), SynthesisError> {
        let Some(securecc) = &self.config.cc.securecc else {
            debug!("securecc not configured; skipping secure compile rules");
            return Ok(());
        };
        rules.add_build(BuildEdge::new(PHONY_RULE, [SECURECC_PHONY]))?;
        rules.define_rule(
            Rule::builder(
                "securecccompile",
                join_words([
                    securecc.as_str(),
                    compilers.plain_cxx.as_str(),
                    "-o ${out} -c -fPIC",
                    flags.cxxflags.as_str(),
                    flags.cppflags.as_str(),
                    "${cxx_warnings} ${cppflags}",
                    flags.includes.as_str(),
                    "${includes} ${in}",
                ]),
            )
            .description("SECURECC ${in}")
            .build(),
        )?;
        rules.define_rule(
            Rule::builder(
                "securecc",
                self.dispatcher
                    .build_delegated_command(DelegatedStep::SecureccObject, None, &[]),
            )
            .description("SECURECC ${in}")
            .restat()
            .build(),
        )
    }

    fn archive_link_rules(
        &self,
        rules: &mut RuleSetBuilder,
        compilers: &Compilers,
    ) -> Result<(), SynthesisError> {
        let cfg = &self.config.cc;
        let arflags = cfg.arflags.concat();
        rules.define_rule(
            Rule::builder(
                "ar",
                join_words(["rm -f $out; ar", arflags.as_str(), "$out $in"]),
            )
            .description("AR ${out}")
            .build(),
        )?;

        let link_pool = self.link_pool(rules)?;
        let ldflags = cfg.linkflags.join(" ");
        let link = |shared: &str| {
            join_words([
                compilers.ld.as_str(),
                "-o ${out}",
                shared,
                ldflags.as_str(),
                "${ldflags} ${in} ${extra_ldflags}",
            ])
        };
        rules.define_rule(
            Rule::builder("link", link(""))
                .description("LINK ${out}")
                .maybe_pool(link_pool.as_ref())
                .build(),
        )?;
        rules.define_rule(
            Rule::builder("solink", link("-shared"))
                .description("SHAREDLINK ${out}")
                .maybe_pool(link_pool.as_ref())
                .build(),
        )?;
        rules.define_rule(
            Rule::builder("strip", "strip --strip-unneeded -o ${out} ${in}")
                .description("STRIP ${out}")
                .build(),
        )
    }

    /// Declare `link_pool` when the configuration limits link jobs.
    fn link_pool(&self, rules: &mut RuleSetBuilder) -> Result<Option<PoolRef>, SynthesisError> {
        let Some(link_jobs) = self.config.link.link_jobs else {
            return Ok(None);
        };
        let depth = link_pool_depth(link_jobs, self.parallelism);
        info!("tunes the parallel link jobs to be {depth}");
        rules.declare_pool(LINK_POOL, depth.get()).map(Some)
    }
}

/// Rules that record which headers a translation unit includes.
fn header_rules(
    rules: &mut RuleSetBuilder,
    compilers: &Compilers,
    flags: &CompileFlags,
) -> Result<(), SynthesisError> {
    let preprocess = |compiler: &str, lang_flags: &str| {
        join_words([
            compiler,
            "-o /dev/null -E -H",
            lang_flags,
            flags.cppflags.as_str(),
            "-w ${cppflags}",
            flags.includes.as_str(),
            "${includes} ${in} 2>${out}",
        ])
    };
    rules.define_rule(
        Rule::builder("cchdrs", preprocess(&compilers.cc, &flags.cflags))
            .description("CC HDRS ${in}")
            .build(),
    )?;
    rules.define_rule(
        Rule::builder("cxxhdrs", preprocess(&compilers.cxx, &flags.cxxflags))
            .description("CXX HDRS ${in}")
            .build(),
    )
}
