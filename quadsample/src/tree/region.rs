use crate::{error::QuadTreeError, Point};

/// Strategy used to choose the point at which a full leaf is split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Split at the geometric midpoint of the region.
    Theoretical,
    /// Split at the per-axis median of the buffered coordinates.
    #[default]
    Adaptive,
}

/// An axis-aligned rectangle, closed at its minimum corner and open at its maximum corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    /// Minimum corner of the region.
    pub min: [f64; 2],
    /// Maximum corner of the region.
    pub max: [f64; 2],
}

impl Region {
    /// Creates a new [`Region`] with the given min and max corners.
    #[inline]
    pub const fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Creates a new [`Region`] from its corners, checking that it has a positive finite extent
    /// on both axes.
    pub fn checked(min: [f64; 2], max: [f64; 2]) -> Result<Self, QuadTreeError> {
        let region = Self::new(min, max);
        if let Some(corner) = [min, max].into_iter().find(|corner| !corner.is_finite()) {
            return Err(QuadTreeError::NonFinite(corner[0], corner[1]));
        }
        if !(min[0] < max[0] && min[1] < max[1]) {
            return Err(region.degenerate());
        }
        Ok(region)
    }

    /// Smallest region containing all the given points.
    ///
    /// The maximum corner is padded so that the half-open region contains the points lying on
    /// it. Returns `None` if there are no points.
    pub fn bounding<P, I>(points: I) -> Option<Self>
    where
        P: Point,
        I: IntoIterator<Item = P>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut min = [first.x(), first.y()];
        let mut max = min;

        for point in points {
            min[0] = min[0].min(point.x());
            min[1] = min[1].min(point.y());
            max[0] = max[0].max(point.x());
            max[1] = max[1].max(point.y());
        }

        for i in 0..2 {
            let extent = max[i] - min[i];
            let pad = (if extent > 0.0 { extent } else { 1.0 }) * 1e-9;
            max[i] += pad.max(max[i].abs() * f64::EPSILON * 4.0);
        }

        Some(Self::new(min, max))
    }

    #[inline]
    fn degenerate(&self) -> QuadTreeError {
        QuadTreeError::DegenerateRegion {
            min_x: self.min[0],
            min_y: self.min[1],
            max_x: self.max[0],
            max_y: self.max[1],
        }
    }

    /// Returns `true` if the coordinates fall inside the region.
    #[inline]
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && y >= self.min[1] && x < self.max[0] && y < self.max[1]
    }

    /// Returns `true` if the point falls inside the region.
    #[inline]
    pub fn contains<P: Point>(&self, point: &P) -> bool {
        self.contains_xy(point.x(), point.y())
    }

    /// Returns the center of the region.
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// Returns the size of the region.
    #[inline]
    pub fn size(&self) -> [f64; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Returns the area of the region.
    #[inline]
    pub fn area(&self) -> f64 {
        let [width, height] = self.size();
        width * height
    }

    /// Point at which this region is split according to the given policy.
    ///
    /// The adaptive policy takes element `n / 2` of the sorted coordinates on each axis. When that
    /// median lies on the region boundary, it takes the smallest buffered coordinate above the
    /// lower edge instead, and the midpoint if there is none. With no positions it falls back to
    /// the midpoint.
    pub fn split_point<P: Point>(&self, policy: SplitPolicy, positions: &[P]) -> [f64; 2] {
        let center = self.center();
        match policy {
            SplitPolicy::Adaptive if !positions.is_empty() => std::array::from_fn(|axis| {
                let mut coordinates: Vec<f64> = positions
                    .iter()
                    .map(|p| if axis == 0 { p.x() } else { p.y() })
                    .collect();
                let inside = |c: f64| c > self.min[axis] && c < self.max[axis];

                let middle = coordinates.len() / 2;
                let median = *coordinates.select_nth_unstable_by(middle, f64::total_cmp).1;
                if inside(median) {
                    return median;
                }

                coordinates
                    .into_iter()
                    .filter(|&c| inside(c))
                    .min_by(f64::total_cmp)
                    .unwrap_or(center[axis])
            }),
            _ => center,
        }
    }

    /// Returns `true` if the point lies strictly inside the region on both axes.
    #[inline]
    pub fn is_interior(&self, point: [f64; 2]) -> bool {
        point[0] > self.min[0]
            && point[0] < self.max[0]
            && point[1] > self.min[1]
            && point[1] < self.max[1]
    }

    /// Subdivides this region at the given point into the south-west, south-east, north-west and
    /// north-east quadrants.
    #[inline]
    pub fn subdivide(&self, split: [f64; 2]) -> [Self; 4] {
        std::array::from_fn(|i| {
            let mut min = self.min;
            let mut max = self.max;

            for axis in 0..2 {
                if i & (1 << axis) == 0 {
                    max[axis] = split[axis];
                } else {
                    min[axis] = split[axis];
                }
            }

            Self::new(min, max)
        })
    }

    /// Minimum and maximum Euclidean distance from `query` to any point of the region.
    ///
    /// The minimum is 0 when the region contains the query. Otherwise the extrema lie on the
    /// corners or on the projections of the query onto the edges whose extent it falls within.
    pub fn distance_bounds<P: Point>(&self, query: &P) -> (f64, f64) {
        let (qx, qy) = (query.x(), query.y());

        let mut min_distance = if self.contains_xy(qx, qy) {
            0.0
        } else {
            f64::MAX
        };
        let mut max_distance = 0.0f64;

        let mut update = |x: f64, y: f64| {
            let distance = [x, y].distance(&[qx, qy]);
            min_distance = min_distance.min(distance);
            max_distance = max_distance.max(distance);
        };

        // Horizontal edges.
        if qx > self.min[0] && qx < self.max[0] {
            update(qx, self.max[1]);
            update(qx, self.min[1]);
        }

        // Vertical edges.
        if qy > self.min[1] && qy < self.max[1] {
            update(self.max[0], qy);
            update(self.min[0], qy);
        }

        update(self.min[0], self.min[1]);
        update(self.min[0], self.max[1]);
        update(self.max[0], self.min[1]);
        update(self.max[0], self.max[1]);

        (min_distance, max_distance)
    }

    /// Returns `true` if every point of the region is farther than `radius` from `center`.
    #[inline]
    pub fn out_of_reach<P: Point>(&self, center: &P, radius: f64) -> bool {
        self.distance_bounds(center).0 > radius
    }
}
