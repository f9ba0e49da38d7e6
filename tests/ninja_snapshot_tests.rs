//! Snapshot tests for the Ninja serialiser.
//!
//! A small rule set is assembled by hand, external edges are appended, and
//! the full manifest text is compared with `insta` so layout regressions
//! show up as a readable diff.

use camino::Utf8PathBuf;
use insta::assert_snapshot;
use kumihimo::edges::BuildEdge;
use kumihimo::rules::{Header, Rule, RuleSetBuilder, Variable};
use rstest::rstest;
use semver::Version;

#[rstest]
fn manifest_layout_is_stable() {
    let mut builder = RuleSetBuilder::new(Header {
        required_version: Version::new(1, 7, 0),
        build_dir: Utf8PathBuf::from("out"),
    });
    builder.define_variables([
        Variable::new("cppflags", ""),
        Variable::new("c_warnings", "-Wall"),
    ]);
    builder
        .define_rule(
            Rule::builder("cc", "gcc -o ${out} -MMD -MF ${out}.d -c ${c_warnings} ${in}")
                .description("CC ${in}")
                .gcc_depfile(true)
                .build(),
        )
        .expect("define cc");
    let link_pool = builder.declare_pool("link_pool", 2).expect("declare pool");
    builder
        .define_rule(
            Rule::builder("link", "g++ -o ${out} ${in}")
                .description("LINK ${out}")
                .pool(&link_pool)
                .build(),
        )
        .expect("define link");
    builder
        .add_build(
            BuildEdge::new("cc", ["out/a.o"])
                .with_inputs(["a.c"])
                .with_variable("cppflags", "-DX"),
        )
        .expect("internal edge");
    let set = builder.finish();
    let edges = [BuildEdge::new("link", ["out/app"]).with_inputs(["out/a.o"])];

    let ninja = set.render_with_edges(&edges).expect("render");

    assert_snapshot!(ninja, @r#"
# build.ninja generated by kumihimo
ninja_required_version = 1.7
builddir = out

pool heavy_pool
  depth = 1

cppflags =
c_warnings = -Wall

rule cc
  command = gcc -o ${out} -MMD -MF ${out}.d -c ${c_warnings} ${in}
  description = CC ${in}
  depfile = ${out}.d
  deps = gcc

pool link_pool
  depth = 2

rule link
  command = g++ -o ${out} ${in}
  description = LINK ${out}
  pool = link_pool

build out/a.o: cc a.c
  cppflags = -DX

build out/app: link out/a.o
"#);
}
