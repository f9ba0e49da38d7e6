//! Integration tests for CLI execution using `assert_cmd`.
//!
//! These tests invoke the compiled binary inside a scratch workspace with an
//! empty `PATH`, so no host compiler cache or helper tool leaks into the
//! generated manifest.

use std::fs;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use test_support::Workspace;

fn kumihimo(workspace: &Workspace) -> Result<Command> {
    let mut cmd = Command::cargo_bin("kumihimo").context("locate kumihimo binary")?;
    cmd.current_dir(workspace.path())
        .env("PATH", "")
        .env_remove("CC")
        .env_remove("CXX")
        .env_remove("LD");
    Ok(cmd)
}

#[test]
fn default_command_writes_build_ninja() -> Result<()> {
    let workspace = Workspace::new();
    kumihimo(&workspace)?.assert().success();
    let ninja = workspace.read("build.ninja");
    ensure!(
        ninja.starts_with("# build.ninja generated by kumihimo\n"),
        "unexpected manifest head:\n{ninja}"
    );
    ensure!(ninja.contains("rule cxx\n"), "cxx rule missing:\n{ninja}");
    Ok(())
}

#[test]
fn dash_streams_manifest_to_stdout() -> Result<()> {
    let workspace = Workspace::new();
    kumihimo(&workspace)?
        .args(["generate", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule stamp\n"));
    ensure!(
        !workspace.join("-").exists(),
        "generate - should not create a file named '-'"
    );
    ensure!(
        !workspace.join("build.ninja").exists(),
        "generate - should not write build.ninja"
    );
    Ok(())
}

#[test]
fn directory_option_relocates_config_and_output() -> Result<()> {
    let outer = Workspace::new();
    outer.write("project/kumihimo.yml", "build_dir: out\n");
    kumihimo(&outer)?
        .args(["-C", "project", "generate", "gen/build.ninja"])
        .assert()
        .success();
    let ninja = outer.read("project/gen/build.ninja");
    ensure!(ninja.contains("builddir = out\n"), "config not applied:\n{ninja}");
    Ok(())
}

#[test]
fn rules_lists_declared_names() -> Result<()> {
    let workspace = Workspace::new();
    let output = kumihimo(&workspace)?
        .arg("rules")
        .output()
        .context("run kumihimo rules")?;
    ensure!(output.status.success(), "rules should succeed");
    let stdout = String::from_utf8(output.stdout).context("utf8 stdout")?;
    let names: Vec<&str> = stdout.lines().collect();
    for name in ["cc", "cxx", "link", "stamp", "scm"] {
        ensure!(names.contains(&name), "{name} missing from {names:?}");
    }
    let mut sorted = names.clone();
    sorted.sort_unstable();
    ensure!(sorted == names, "rule names should be sorted");
    Ok(())
}

#[test]
fn compiler_override_reaches_manifest() -> Result<()> {
    let workspace = Workspace::new();
    kumihimo(&workspace)?
        .env("CXX", "/opt/clang/bin/clang++")
        .args(["generate", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "command = /opt/clang/bin/clang++ -o ${out}",
        ));
    Ok(())
}

#[test]
fn edges_file_is_appended() -> Result<()> {
    let workspace = Workspace::new();
    workspace.write(
        "edges.yml",
        "edges:\n  - rule: cxx\n    outputs: [build64_release/a.o]\n    inputs: [a.cc]\n",
    );
    kumihimo(&workspace)?
        .args(["generate", "--edges", "edges.yml", "-"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "build build64_release/a.o: cxx a.cc\n\n",
        ));
    Ok(())
}

#[test]
fn unknown_edge_rule_fails() -> Result<()> {
    let workspace = Workspace::new();
    workspace.write(
        "edges.yml",
        "edges:\n  - rule: nosuch\n    outputs: [a.o]\n",
    );
    kumihimo(&workspace)?
        .args(["generate", "--edges", "edges.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rule 'nosuch'"));
    ensure!(
        !workspace.join("build.ninja").exists(),
        "no manifest should be written when edges are invalid"
    );
    Ok(())
}

#[test]
fn missing_explicit_config_fails() -> Result<()> {
    let workspace = Workspace::new();
    kumihimo(&workspace)?
        .args(["-c", "absent.yml", "rules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn unchanged_manifest_is_not_rewritten() -> Result<()> {
    let workspace = Workspace::new();
    kumihimo(&workspace)?.assert().success();
    let path = workspace.join("build.ninja");
    let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(past))
        .context("backdate manifest")?;

    kumihimo(&workspace)?.assert().success();

    let modified = fs::metadata(&path)
        .and_then(|meta| meta.modified())
        .context("read manifest mtime")?;
    ensure!(modified == past, "identical manifest should be left untouched");
    Ok(())
}

#[cfg(unix)]
#[test]
fn relative_go_plugin_resolves_against_workspace_root() -> Result<()> {
    let workspace = Workspace::new();
    workspace.executable("tools/protoc-gen-go");
    workspace.write(
        "kumihimo.yml",
        "proto:\n  protoc_go_plugin: tools/protoc-gen-go\ngo:\n  go_home: go\n",
    );
    kumihimo(&workspace)?
        .args(["generate", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule protogo\n"));
    Ok(())
}

#[test]
fn missing_go_plugin_is_a_configuration_error() -> Result<()> {
    let workspace = Workspace::new();
    workspace.write(
        "kumihimo.yml",
        "proto:\n  protoc_go_plugin: tools/protoc-gen-go\ngo:\n  go_home: go\n",
    );
    kumihimo(&workspace)?
        .args(["generate", "-"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("protoc_go_plugin"));
    Ok(())
}
