/// Trait for two-dimensional points that can be stored in a [`QuadTree`](crate::QuadTree).
///
/// Implemented for `[f64; 2]` and `(f64, f64)`, and for the 2D double precision vectors of
/// `glam`, `ultraviolet` and `nalgebra` when the corresponding features are enabled.
///
/// # Example
///
/// ```
/// use quadsample::Point;
///
/// let a = [0.0, 0.0];
/// let b = [3.0, 4.0];
///
/// assert_eq!(a.distance(&b), 5.0);
/// assert_eq!((1.0, 2.0).y(), 2.0);
/// ```
pub trait Point: Copy {
    /// The x coordinate.
    fn x(&self) -> f64;

    /// The y coordinate.
    fn y(&self) -> f64;

    /// Squared Euclidean distance between two points.
    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx * dx + dy * dy
    }

    /// Euclidean distance between two points.
    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are neither NaN nor infinite.
    #[inline]
    fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }
}

impl Point for [f64; 2] {
    #[inline]
    fn x(&self) -> f64 {
        self[0]
    }

    #[inline]
    fn y(&self) -> f64 {
        self[1]
    }
}

impl Point for (f64, f64) {
    #[inline]
    fn x(&self) -> f64 {
        self.0
    }

    #[inline]
    fn y(&self) -> f64 {
        self.1
    }
}

/// Trait for types that can be located in the plane.
///
/// You can derive this trait if your type has a field named `position` whose type implements
/// [`Point`].
///
/// ```
/// use quadsample::prelude::*;
///
/// #[derive(Position)]
/// struct Vertex {
///     degree: usize,
///     position: [f64; 2],
/// }
///
/// let vertex = Vertex { degree: 3, position: [0.5, 0.25] };
/// assert_eq!(vertex.position(), [0.5, 0.25]);
/// ```
pub trait Position {
    /// The type used to represent the position.
    type Point: Point;

    /// Returns the position of the object.
    fn position(&self) -> Self::Point;
}

impl<P: Position> Position for &P {
    type Point = P::Point;

    #[inline]
    fn position(&self) -> Self::Point {
        (**self).position()
    }
}

impl<P: Point, T> Position for (P, T) {
    type Point = P;

    #[inline]
    fn position(&self) -> Self::Point {
        self.0
    }
}

/// Trait for the opaque element identifiers stored in a [`QuadTree`](crate::QuadTree).
///
/// Identifiers are compared for equality on removal, bounded by a sanity limit on insertion and
/// regenerated from contiguous integers by [`QuadTree::reindex`](crate::QuadTree::reindex).
pub trait Identifier: Copy + PartialEq + std::fmt::Debug {
    /// Creates the identifier with the given index.
    ///
    /// Panics if the index does not fit in the identifier type.
    fn from_index(index: usize) -> Self;

    /// Returns the identifier as an integer, used for the sanity bound check.
    fn to_u64(self) -> u64;
}

macro_rules! impl_identifier {
    ($($t: ty),*) => {$(
        impl Identifier for $t {
            #[inline]
            fn from_index(index: usize) -> Self {
                match <$t>::try_from(index) {
                    Ok(id) => id,
                    Err(_) => crate::error::violation(concat!(
                        "index does not fit in `",
                        stringify!($t),
                        "` identifier"
                    )),
                }
            }

            #[inline]
            #[allow(clippy::unnecessary_cast)]
            fn to_u64(self) -> u64 {
                self as u64
            }
        }
    )*};
}

impl_identifier!(u8, u16, u32, u64, usize);
