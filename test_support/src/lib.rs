//! Test utilities shared by the kumihimo integration tests.
//!
//! This crate provides scripted environments and probes for driving the
//! synthesis without touching the host, plus a scratch workspace for the
//! command-line tests.

pub mod env;
pub mod probe;
pub mod workspace;

pub use env::{compiler_env, scripted_env};
pub use probe::FixedProbe;
pub use workspace::Workspace;
