//! Per-family configuration sections.

use std::num::NonZeroUsize;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Out-of-process helper used for delegated steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperConfig {
    /// Directory holding the helper's library code.
    pub library_path: Utf8PathBuf,
    /// Environment variable the helper reads its search path from.
    pub search_path_var: String,
    /// Program and leading arguments that start the helper.
    pub launcher: Vec<String>,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            library_path: Utf8PathBuf::from("."),
            search_path_var: "PYTHONPATH".into(),
            launcher: vec!["python3".into(), "-m".into(), "kumihimo_toolchain".into()],
        }
    }
}

/// Link step tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Limit concurrent link jobs. Unset leaves links to Ninja's `-j`.
    pub link_jobs: Option<NonZeroUsize>,
}

/// Compilation caching proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Use the proxy when it is installed.
    pub enabled: bool,
    /// Proxy binary.
    pub program: Utf8PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: Utf8PathBuf::from("ccache"),
        }
    }
}

/// Native C/C++ toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CcConfig {
    /// Flags for C sources only.
    pub cflags: Vec<String>,
    /// Flags for C++ sources only.
    pub cxxflags: Vec<String>,
    /// Preprocessor flags shared by C and C++.
    pub cppflags: Vec<String>,
    /// Flags passed to every link.
    pub linkflags: Vec<String>,
    /// Extra include directories, searched before `.` and the build dir.
    pub extra_incs: Vec<String>,
    /// `ar` modifier letters; concatenated into one argument.
    pub arflags: Vec<String>,
    /// Warnings shared by C and C++.
    pub warnings: Vec<String>,
    /// Warnings for C only.
    pub c_warnings: Vec<String>,
    /// Warnings for C++ only.
    pub cxx_warnings: Vec<String>,
    /// Emit rules that record header inclusion stacks.
    pub header_inclusion_dependencies: bool,
    /// Secure-compile wrapper. Unset skips the secure-compile rules.
    pub securecc: Option<Utf8PathBuf>,
    /// Caching proxy settings.
    pub cache: CacheConfig,
    /// Track header dependencies through compiler-written depfiles.
    pub dependency_tracking: bool,
}

impl Default for CcConfig {
    fn default() -> Self {
        Self {
            cflags: Vec::new(),
            cxxflags: Vec::new(),
            cppflags: Vec::new(),
            linkflags: Vec::new(),
            extra_incs: Vec::new(),
            arflags: vec!["rcs".into()],
            warnings: Vec::new(),
            c_warnings: Vec::new(),
            cxx_warnings: Vec::new(),
            header_inclusion_dependencies: false,
            securecc: None,
            cache: CacheConfig::default(),
            dependency_tracking: true,
        }
    }
}

/// Protocol buffer compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtoConfig {
    /// `protoc` binary.
    pub protoc: Utf8PathBuf,
    /// Separate `protoc` for Java output.
    pub protoc_java: Option<Utf8PathBuf>,
    /// Import directories.
    pub protobuf_incs: Vec<String>,
    /// Import directories for Java output; defaults to `protobuf_incs`.
    pub protobuf_java_incs: Vec<String>,
    /// `protoc-gen-go` plugin. When set it must exist.
    pub protoc_go_plugin: Option<Utf8PathBuf>,
    /// Go generator sub-plugins such as `grpc`.
    pub protoc_go_subplugins: Vec<String>,
    /// Output directory for Go sources in module mode.
    pub protobuf_go_path: Utf8PathBuf,
}

impl Default for ProtoConfig {
    fn default() -> Self {
        Self {
            protoc: Utf8PathBuf::from("protoc"),
            protoc_java: None,
            protobuf_incs: Vec::new(),
            protobuf_java_incs: Vec::new(),
            protoc_go_plugin: None,
            protoc_go_subplugins: Vec::new(),
            protobuf_go_path: Utf8PathBuf::new(),
        }
    }
}

/// Java compiler and archiver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JavaConfig {
    /// JDK root; binaries resolve under `bin/`.
    pub java_home: Option<Utf8PathBuf>,
    /// Language level used when source/target are unset.
    pub version: Option<String>,
    /// `-source` level.
    pub source_version: Option<String>,
    /// `-target` level.
    pub target_version: Option<String>,
}

/// Java test runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JavaTestConfig {
    /// JaCoCo installation for coverage.
    pub jacoco_home: Option<Utf8PathBuf>,
}

/// Java binary packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JavaBinaryConfig {
    /// One-JAR boot loader. Unset skips the `onejar` rule.
    pub one_jar_boot_jar: Option<Utf8PathBuf>,
}

/// Scala toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScalaConfig {
    /// Scala root; binaries resolve under `bin/`.
    pub scala_home: Option<Utf8PathBuf>,
}

/// Thrift IDL compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThriftConfig {
    /// Binary path, or a `//dir:name` label of a target built in-tree.
    pub thrift: String,
    /// Include directories.
    pub thrift_incs: Vec<String>,
    /// Generator parameters passed to `--gen`.
    pub thrift_gen_params: String,
}

impl Default for ThriftConfig {
    fn default() -> Self {
        Self {
            thrift: "thrift".into(),
            thrift_incs: Vec::new(),
            thrift_gen_params: "cpp:include_prefix,pure_enums".into(),
        }
    }
}

/// Go toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoConfig {
    /// `GOPATH` root in workspace mode; `src/` holds generated sources.
    pub go_home: Option<Utf8PathBuf>,
    /// `go` binary.
    pub go: Option<Utf8PathBuf>,
    /// Resolve packages through `go.mod` instead of `GOPATH`.
    pub go_module_enabled: bool,
    /// Module root relative to the workspace root.
    pub go_module_relpath: Option<Utf8PathBuf>,
}

/// SWIG wrapper generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwigConfig {
    /// `swig` binary. Unset skips the SWIG rules.
    pub swig: Option<Utf8PathBuf>,
    /// Include directories.
    pub swig_incs: Vec<String>,
}

/// Version-control metadata stamped into binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionConfig {
    /// Source revision.
    pub revision: String,
    /// Repository URL.
    pub url: String,
    /// Compiler name and version, recorded verbatim.
    pub compiler: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            revision: "unknown".into(),
            url: "unknown".into(),
            compiler: "unknown".into(),
        }
    }
}
