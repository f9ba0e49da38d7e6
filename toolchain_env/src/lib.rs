#![forbid(unsafe_code)]

//! Environment variable names consulted by kumihimo when resolving
//! toolchain binaries. Shared by the library, its tests, and helpers.
//!
//! Every variable is an optional override: when it is unset the synthesis
//! falls back to a conventional binary name.

/// Override for the C compiler.
///
/// # Examples
///
/// ```
/// use toolchain_env::CC_ENV;
/// assert_eq!(CC_ENV, "CC");
/// ```
pub const CC_ENV: &str = "CC";

/// Override for the C++ compiler.
pub const CXX_ENV: &str = "CXX";

/// Override for the linker driver.
pub const LD_ENV: &str = "LD";

/// Compiler used when [`CC_ENV`] is unset.
pub const DEFAULT_CC: &str = "gcc";

/// Compiler used when [`CXX_ENV`] is unset.
pub const DEFAULT_CXX: &str = "g++";

/// Linker driver used when [`LD_ENV`] is unset.
pub const DEFAULT_LD: &str = "g++";

/// Every compiler override variable paired with its fallback binary.
pub const COMPILER_OVERRIDES: [(&str, &str); 3] = [
    (CC_ENV, DEFAULT_CC),
    (CXX_ENV, DEFAULT_CXX),
    (LD_ENV, DEFAULT_LD),
];
