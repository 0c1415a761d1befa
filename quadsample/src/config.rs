use crate::{error::QuadTreeError, quadtree::COARSEN_LIMIT, tree::SplitPolicy};

/// Construction parameters of a [`QuadTree`](crate::QuadTree), shared by all of its nodes.
///
/// # Example
///
/// ```
/// use quadsample::{QuadTreeConfig, SplitPolicy};
///
/// let config = QuadTreeConfig::default()
///     .with_capacity(64)
///     .with_split_policy(SplitPolicy::Theoretical);
///
/// assert!(config.validate().is_ok());
/// assert!(config.with_capacity(3).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadTreeConfig {
    /// Leaf capacity. A leaf holds at most `capacity - 1` elements: the insertion that would
    /// fill the last slot splits it instead.
    pub capacity: usize,
    /// How full leaves choose their split point.
    pub split_policy: SplitPolicy,
    /// Identifiers must stay strictly below this bound.
    pub id_limit: u64,
}

impl QuadTreeConfig {
    /// Default leaf capacity.
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Default sanity bound on identifiers.
    pub const DEFAULT_ID_LIMIT: u64 = 10_000_000_000_000_000;

    const LARGE_CAPACITY: usize = 100_000;

    /// Sets the leaf capacity.
    #[inline]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the split policy.
    #[inline]
    pub const fn with_split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }

    /// Sets the sanity bound on identifiers.
    #[inline]
    pub const fn with_id_limit(mut self, id_limit: u64) -> Self {
        self.id_limit = id_limit;
        self
    }

    /// Checks that the configuration can build a working tree.
    ///
    /// The capacity must be at least [`COARSEN_LIMIT`], so that a coarsened subtree always fits
    /// in a single leaf.
    pub fn validate(&self) -> Result<(), QuadTreeError> {
        if self.capacity < COARSEN_LIMIT {
            return Err(QuadTreeError::InvalidCapacity(self.capacity));
        }

        if self.capacity > Self::LARGE_CAPACITY {
            log::warn!(
                "Leaf capacity of {} is very large, leaf scans will dominate query time",
                self.capacity
            );
        }

        Ok(())
    }
}

impl Default for QuadTreeConfig {
    #[inline]
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            split_policy: SplitPolicy::default(),
            id_limit: Self::DEFAULT_ID_LIMIT,
        }
    }
}
