//! Kumihimo core library.
//!
//! Kumihimo synthesises the rule section of a Ninja manifest from a
//! resolved toolchain configuration: compiler discovery, caching and
//! secure-compile wrappers, dependency tracking, pools, and the rules for
//! C/C++, protocol buffers, Java, Scala, Thrift, SWIG, Python, Go, shell
//! tests, lex/yacc, packaging and version stamping. Externally produced
//! build edges are validated against the synthesised rules before being
//! appended.
//!
//! ```
//! use kumihimo::config::ToolchainConfig;
//! use kumihimo::toolchain::{CommandBuilder, PathProbe};
//! use mockable::DefaultEnv;
//!
//! let config = ToolchainConfig::default();
//! let env = DefaultEnv::new();
//! let probe = PathProbe::new(Vec::new());
//! let rules = CommandBuilder::new(&config, &env, &probe)
//!     .synthesize()
//!     .expect("default configuration synthesises");
//! assert!(rules.rule_names().contains("cxx"));
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod edges;
pub mod error;
pub mod hasher;
pub mod ninja_gen;
pub mod rules;
pub mod runner;
pub mod toolchain;
