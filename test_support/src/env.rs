//! Scripted environments for synthesis tests.
//!
//! The synthesis reads compiler overrides through [`mockable::Env`]; these
//! helpers answer those lookups from a fixed table so tests never depend on
//! the caller's shell.

use std::env::VarError;

use mockable::MockEnv;
use toolchain_env::COMPILER_OVERRIDES;

/// Build a [`MockEnv`] that answers from `vars` and reports every other
/// variable as unset.
#[must_use]
pub fn scripted_env(vars: &[(&str, &str)]) -> MockEnv {
    let table: Vec<(String, String)> = vars
        .iter()
        .map(|&(key, value)| (key.to_owned(), value.to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_raw().returning(move |key| {
        table
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .ok_or(VarError::NotPresent)
    });
    env
}

/// Build a [`MockEnv`] overriding every compiler variable with `prefix`
/// followed by the default binary name, e.g. `/opt/gcc/bin/g++`.
#[must_use]
pub fn compiler_env(prefix: &str) -> MockEnv {
    let owned: Vec<(String, String)> = COMPILER_OVERRIDES
        .iter()
        .map(|&(key, default)| (key.to_owned(), format!("{prefix}{default}")))
        .collect();
    let borrowed: Vec<(&str, &str)> = owned
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    scripted_env(&borrowed)
}
