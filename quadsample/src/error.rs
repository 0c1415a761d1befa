use thiserror::Error;

/// Errors reported by [`QuadTree`](crate::QuadTree) construction and checked insertion.
///
/// [`QuadTreeError::InvariantViolation`] is never returned: it is the message carried by the
/// panic raised when a precondition of an unchecked operation does not hold.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum QuadTreeError {
    /// Leaf capacity below the coarsening limit.
    #[error(
        "leaf capacity must be at least {limit}, got {0}",
        limit = crate::quadtree::COARSEN_LIMIT
    )]
    InvalidCapacity(usize),

    /// Region with an empty or inverted extent on at least one axis.
    #[error("degenerate region [{min_x}, {max_x}) x [{min_y}, {max_y})")]
    DegenerateRegion {
        /// Lower x bound.
        min_x: f64,
        /// Lower y bound.
        min_y: f64,
        /// Upper x bound.
        max_x: f64,
        /// Upper y bound.
        max_y: f64,
    },

    /// Coordinate that is NaN or infinite.
    #[error("non-finite coordinate ({0}, {1})")]
    NonFinite(f64, f64),

    /// Position outside the region of the tree.
    #[error("position ({0}, {1}) lies outside the tree region")]
    OutOfRegion(f64, f64),

    /// Identifier above the configured sanity bound.
    #[error("identifier {id} exceeds the sanity bound {limit}")]
    IdentifierOutOfBounds {
        /// Offending identifier.
        id: u64,
        /// Configured bound.
        limit: u64,
    },

    /// Identifier and position slices of different lengths.
    #[error("{ids} identifiers given for {positions} positions")]
    LengthMismatch {
        /// Number of identifiers.
        ids: usize,
        /// Number of positions.
        positions: usize,
    },

    /// Bulk construction from no points, which leaves the region undefined.
    #[error("cannot compute a region from an empty set of points")]
    EmptyInput,

    /// Broken structural invariant or precondition.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Aborts the current operation after a broken invariant.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violation(what: &'static str) -> ! {
    let error = QuadTreeError::InvariantViolation(what);
    log::error!("{error}");
    panic!("{error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            QuadTreeError::InvalidCapacity(1).to_string(),
            "leaf capacity must be at least 4, got 1"
        );
        assert_eq!(
            QuadTreeError::OutOfRegion(2.0, -1.0).to_string(),
            "position (2, -1) lies outside the tree region"
        );
        assert_eq!(
            QuadTreeError::InvariantViolation("no responsible child").to_string(),
            "invariant violation: no responsible child"
        );
    }

    #[test]
    #[should_panic(expected = "invariant violation: broken")]
    fn violation_panics() {
        violation("broken");
    }
}
