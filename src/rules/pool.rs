//! Concurrency pools.
//!
//! Pools bound how many jobs of one class Ninja runs at once, independent
//! of `-j`. They are a contract for the execution engine; synthesis itself is
//! single-threaded.

use std::cmp;
use std::num::NonZeroUsize;

use indexmap::IndexMap;

use crate::error::SynthesisError;

/// Singleton pool for the most resource-hungry steps.
pub const HEAVY_POOL: &str = "heavy_pool";
/// Pool limiting concurrent link steps.
pub const LINK_POOL: &str = "link_pool";
/// Pool serialising Go toolchain invocations sharing one workspace.
pub const GOLANG_POOL: &str = "golang_pool";

/// A declared pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Pool identifier.
    pub name: String,
    /// Maximum number of concurrent jobs.
    pub depth: NonZeroUsize,
}

/// Handle to a declared pool.
///
/// Only [`PoolManager`] hands these out, so a rule can only bind to a pool
/// that exists in the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolRef(String);

impl PoolRef {
    /// Name of the referenced pool.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Registry of pools declared during one session.
#[derive(Debug, Default)]
pub struct PoolManager {
    pools: IndexMap<String, NonZeroUsize>,
}

impl PoolManager {
    /// Create a manager holding one depth-1 pool.
    pub(super) fn with_singleton(name: &str) -> (Self, Pool) {
        let mut pools = IndexMap::new();
        pools.insert(name.to_owned(), NonZeroUsize::MIN);
        let pool = Pool {
            name: name.to_owned(),
            depth: NonZeroUsize::MIN,
        };
        (Self { pools }, pool)
    }

    /// Declare `name` with `depth`.
    ///
    /// Returns the handle and, when the pool is new, the record to emit.
    /// Repeating a declaration with the same depth yields the existing handle
    /// and no record.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::InvalidPoolDepth`] for a zero depth and
    /// [`SynthesisError::ConflictingPool`] when the name already carries a
    /// different depth.
    pub fn declare(
        &mut self,
        name: &str,
        depth: usize,
    ) -> Result<(PoolRef, Option<Pool>), SynthesisError> {
        let Some(depth) = NonZeroUsize::new(depth) else {
            return Err(SynthesisError::InvalidPoolDepth {
                name: name.to_owned(),
            });
        };
        if let Some(existing) = self.pools.get(name) {
            if *existing != depth {
                return Err(SynthesisError::ConflictingPool {
                    name: name.to_owned(),
                    existing: existing.get(),
                    requested: depth.get(),
                });
            }
            return Ok((PoolRef(name.to_owned()), None));
        }
        self.pools.insert(name.to_owned(), depth);
        let pool = Pool {
            name: name.to_owned(),
            depth,
        };
        Ok((PoolRef(name.to_owned()), Some(pool)))
    }

    /// Look up the depth of a declared pool.
    #[must_use]
    pub fn depth(&self, name: &str) -> Option<NonZeroUsize> {
        self.pools.get(name).copied()
    }

    /// Names of all declared pools in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }
}

/// Depth of the link pool: the configured job count, clamped to the
/// parallelism available to the execution engine.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use kumihimo::rules::link_pool_depth;
///
/// let four = NonZeroUsize::new(4).expect("non-zero");
/// let two = NonZeroUsize::new(2).expect("non-zero");
/// assert_eq!(link_pool_depth(four, two), two);
/// ```
#[must_use]
pub fn link_pool_depth(link_jobs: NonZeroUsize, parallelism: NonZeroUsize) -> NonZeroUsize {
    cmp::min(link_jobs, parallelism)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[rstest]
    fn redeclaring_with_same_depth_is_idempotent() {
        let mut pools = PoolManager::default();
        let (first, record) = pools.declare("link_pool", 4).expect("declare");
        assert!(record.is_some());
        let (second, again) = pools.declare("link_pool", 4).expect("redeclare");
        assert_eq!(first, second);
        assert!(again.is_none());
    }

    #[rstest]
    fn conflicting_depth_is_rejected() {
        let mut pools = PoolManager::default();
        pools.declare("golang_pool", 1).expect("declare");
        let err = pools.declare("golang_pool", 2).expect_err("conflict");
        assert!(matches!(
            err,
            SynthesisError::ConflictingPool {
                existing: 1,
                requested: 2,
                ..
            }
        ));
        assert_eq!(pools.depth("golang_pool"), Some(nz(1)));
    }

    #[rstest]
    fn zero_depth_is_rejected() {
        let mut pools = PoolManager::default();
        let err = pools.declare("empty", 0).expect_err("zero depth");
        assert!(matches!(err, SynthesisError::InvalidPoolDepth { .. }));
        assert_eq!(pools.names().count(), 0);
    }

    #[rstest]
    #[case(4, 8, 4)]
    #[case(4, 2, 2)]
    #[case(1, 1, 1)]
    fn link_depth_is_clamped(#[case] jobs: usize, #[case] parallelism: usize, #[case] expected: usize) {
        assert_eq!(link_pool_depth(nz(jobs), nz(parallelism)), nz(expected));
    }
}
