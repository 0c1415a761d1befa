#[cfg(feature = "glam")]
mod glam;
#[cfg(feature = "nalgebra")]
mod nalgebra;
#[cfg(feature = "ultraviolet")]
mod ultraviolet;

/// Implements [`Point`](crate::Point) for a vector type with public `x` and `y` fields of type
/// `f64`.
macro_rules! impl_point {
    ($($vector: ty),*) => {$(
        impl $crate::Point for $vector {
            #[inline]
            fn x(&self) -> f64 {
                self.x
            }

            #[inline]
            fn y(&self) -> f64 {
                self.y
            }
        }
    )*};
}

#[allow(unused_imports)]
pub(crate) use impl_point;

#[cfg(test)]
macro_rules! tests_point {
    ($($name: ident: $vector: ty => $new: expr),*) => {$(
        paste::paste! {
            #[test]
            fn [<$name _coordinates>]() {
                let point: $vector = $new(1.5, -2.0);
                assert_eq!($crate::Point::x(&point), 1.5);
                assert_eq!($crate::Point::y(&point), -2.0);
            }

            #[test]
            fn [<$name _distance>]() {
                let a: $vector = $new(0.0, 0.0);
                let b: $vector = $new(3.0, 4.0);
                assert_eq!($crate::Point::distance(&a, &b), 5.0);
            }

            #[test]
            fn [<$name _tree>]() {
                let positions: Vec<$vector> = (0..64)
                    .map(|i| $new((i % 8) as f64 + 0.5, (i / 8) as f64 + 0.5))
                    .collect();
                let ids: Vec<u32> = (0..64).collect();
                let config = $crate::QuadTreeConfig::default()
                    .with_capacity(4)
                    .with_split_policy($crate::SplitPolicy::Theoretical);
                let tree = $crate::QuadTree::from_points(&ids, &positions, config).unwrap();

                let mut found = Vec::new();
                tree.query_circle(&$new(0.5, 0.5), 1.1, &mut found);
                found.sort_unstable();
                assert_eq!(found, [0, 1, 8]);
            }
        }
    )*};
}

#[cfg(test)]
#[allow(unused_imports)]
pub(crate) use tests_point;
