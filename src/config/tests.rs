//! Tests for configuration loading.

use super::*;
use rstest::rstest;

#[rstest]
fn empty_text_yields_defaults() {
    let config = ToolchainConfig::from_str("").expect("empty config");
    assert_eq!(config, ToolchainConfig::default());
    assert!(config.cc.dependency_tracking);
    assert_eq!(config.cc.arflags, vec!["rcs".to_owned()]);
    assert!(config.link.link_jobs.is_none());
}

#[rstest]
fn sections_merge_with_defaults() {
    let yaml = concat!(
        "build_dir: build64_debug\n",
        "cc:\n",
        "  cxxflags: [-std=c++17]\n",
        "  cache:\n",
        "    enabled: false\n",
        "go:\n",
        "  go_home: go\n",
        "  go: /usr/local/go/bin/go\n",
        "  go_module_enabled: true\n",
        "  go_module_relpath: src/service\n",
    );
    let config = ToolchainConfig::from_str(yaml).expect("parse");
    assert_eq!(config.build_dir, "build64_debug");
    assert_eq!(config.cc.cxxflags, vec!["-std=c++17".to_owned()]);
    assert!(!config.cc.cache.enabled);
    assert_eq!(config.cc.cache.program, "ccache");
    assert_eq!(
        config.go.go_module_relpath.as_deref().map(Utf8Path::as_str),
        Some("src/service")
    );
    assert_eq!(config.thrift, ThriftConfig::default());
}

#[rstest]
#[case("1.7", Version::new(1, 7, 0))]
#[case("1.10.2", Version::new(1, 10, 2))]
#[case("2", Version::new(2, 0, 0))]
fn ninja_versions_are_padded(#[case] raw: &str, #[case] expected: Version) {
    assert_eq!(parse_ninja_version(raw).expect("version"), expected);
}

#[rstest]
#[case("1.2", false)]
#[case("1.3", true)]
#[case("1.7", true)]
fn deps_log_support_follows_version(#[case] raw: &str, #[case] supported: bool) {
    let yaml = format!("ninja_required_version: \"{raw}\"\n");
    let config = ToolchainConfig::from_str(&yaml).expect("parse");
    assert_eq!(config.supports_deps_log(), supported);
}

#[rstest]
#[case("cc:\n  cflag: [-O2]\n")]
#[case("link:\n  link_jobs: 0\n")]
#[case("unknown_section: {}\n")]
fn invalid_configuration_is_rejected(#[case] yaml: &str) {
    let err = ToolchainConfig::from_str(yaml).expect_err("invalid");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[rstest]
#[case("profile: \"release\\ndebug\"\n", "profile")]
#[case("version:\n  revision: \"r1\\rr2\"\n", "version.revision")]
#[case("version:\n  url: |\n    https://scm.example/repo\n    build x: phony\n", "version.url")]
#[case("version:\n  compiler: \"gcc\\n\"\n", "version.compiler")]
fn stamp_values_must_fit_on_one_line(#[case] yaml: &str, #[case] expected: &str) {
    let err = ToolchainConfig::from_str(yaml).expect_err("line break");
    assert!(
        matches!(err, ConfigError::LineBreak { field, .. } if field == expected),
        "{err}"
    );
}

#[rstest]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.yml")).expect("utf8 path");
    let err = ToolchainConfig::from_path(&path).expect_err("missing file");
    assert!(err.to_string().contains("absent.yml"));
}
