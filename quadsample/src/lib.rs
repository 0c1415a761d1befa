#![warn(missing_docs)]
//! # Quadsample
//!
//! Quadsample is a crate providing a dynamic two-dimensional region quadtree, built to generate
//! random spatial graphs in which the likelihood of an edge decays with the distance between its
//! endpoints.
//!
//! ## Goals
//!
//! The tree stores opaque element identifiers at positions in the plane and answers two kinds of
//! queries:
//!
//! - [`QuadTree::query_circle`] returns every element strictly inside a disc.
//! - [`QuadTree::query_probabilistic`] returns a random subset of all elements, each element
//!   included independently with a probability that only depends on its distance to the query
//!   point. Subtrees with a small inclusion probability are skipped over with geometric jumps, so
//!   the expected cost depends on the number of elements returned rather than on the size of the
//!   tree.
//!
//! Elements can be inserted and removed at any time. Full leaves split into four quadrants and
//! internal nodes that become sparse are coarsened back into leaves.
//!
//! Quadsample uses [rayon](https://github.com/rayon-rs/rayon) for parallelization. Enable the
//! `parallel` feature to access the batched queries and the parallel maintenance operations.
//!
//! ## Using Quadsample
//!
//! Any type implementing [`Point`] can be stored in a tree. Arrays `[f64; 2]` and tuples
//! `(f64, f64)` implement it, as well as the double precision 2D vectors of `glam`,
//! `ultraviolet` and `nalgebra` when the corresponding features are enabled.
//!
//! ```
//! use quadsample::prelude::*;
//! use rand::{rngs::StdRng, Rng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let positions: Vec<[f64; 2]> = (0..1000).map(|_| [rng.gen(), rng.gen()]).collect();
//! let ids: Vec<u32> = (0..1000).collect();
//!
//! let config = QuadTreeConfig::default().with_capacity(16);
//! let tree = QuadTree::from_points(&ids, &positions, config).unwrap();
//!
//! // Exact neighbours of the first element.
//! let mut neighbours = Vec::new();
//! tree.query_circle(&positions[0], 0.05, &mut neighbours);
//! assert!(neighbours.contains(&0));
//!
//! // Random neighbours, with a probability decaying exponentially with the distance.
//! let mut sample = Vec::new();
//! tree.query_probabilistic(&positions[0], |d| (-50.0 * d).exp(), &mut rng, &mut sample);
//! ```
//!
//! When your type has a field named `position`, you can derive [`Position`] and build a tree
//! directly from a slice of it, identifying each item by its index.
//!
//! ```
//! use quadsample::prelude::*;
//!
//! #[derive(Position)]
//! struct Vertex {
//!     position: (f64, f64),
//! }
//!
//! let vertices: Vec<Vertex> = (0..10)
//!     .map(|i| Vertex { position: (i as f64, (i * i) as f64) })
//!     .collect();
//!
//! let tree = QuadTree::<u16, _>::from_positions(&vertices, QuadTreeConfig::default()).unwrap();
//! assert_eq!(tree.len(), 10);
//! ```
//!
//! ### Maintenance
//!
//! Once a tree is built, [`QuadTree::trim`] releases spare buffer memory,
//! [`QuadTree::assign_stable_ids`] numbers the leaves so that positions can be mapped to cells
//! with [`QuadTree::cell_id`], and [`QuadTree::reindex`] together with
//! [`QuadTree::sort_leaf_contents`] renumber the elements so that elements close in the plane
//! get close identifiers.

/// Construction parameters of a tree.
pub mod config;
/// Errors reported by the tree.
pub mod error;
/// Traits for points, located items and element identifiers.
pub mod point;
/// Dynamic quadtree and its operations.
pub mod quadtree;
/// Arena and regions the quadtree is built from.
pub mod tree;

mod impls;
#[cfg(feature = "parallel")]
mod parallel;
mod query;

pub use config::QuadTreeConfig;
pub use error::QuadTreeError;
pub use point::{Identifier, Point, Position};
pub use quadtree::QuadTree;
pub use tree::{Region, SplitPolicy};

/// Most commonly used traits, types and derive macros.
pub mod prelude {
    pub use crate::{
        Identifier, Point, Position, QuadTree, QuadTreeConfig, QuadTreeError, Region, SplitPolicy,
    };

    pub use quadsample_derive::Position;
}
