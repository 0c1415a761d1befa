use nalgebra::{Point2, Vector2};

impl crate::Point for Point2<f64> {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        nalgebra::distance_squared(self, other)
    }
}

impl crate::Point for Vector2<f64> {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        (self - other).norm_squared()
    }
}
