use crate::{
    error::violation,
    tree::{Node, NodeID},
    Identifier, Point, QuadTree,
};
use rand::Rng;

/// Expected number of accepted candidates below which an internal node samples its subtree
/// directly instead of recursing.
const DIRECT_SELECTION_YIELD: f64 = 4.0;

/// Probability bound below which an internal node always samples its subtree directly.
const DIRECT_SELECTION_PROBABILITY: f64 = 0.001;

/// Upper probability bounds above this are rounded up to 1, so that every element is evaluated.
const CLAMP_PROBABILITY: f64 = 0.5;

impl<T: Identifier, P: Point> QuadTree<T, P> {
    /// Appends to `results` the identifiers of all elements strictly closer than `radius` to
    /// `center`.
    ///
    /// Subtrees whose region lies entirely farther than `radius` are skipped. The order of the
    /// appended identifiers is unspecified.
    pub fn query_circle(&self, center: &P, radius: f64, results: &mut Vec<T>) {
        self.query_circle_at(self.root(), center, radius, results);
    }

    fn query_circle_at(&self, node: NodeID, center: &P, radius: f64, results: &mut Vec<T>) {
        let tree = self.get();
        let cell = &tree.data[node as usize];
        if cell.region.out_of_reach(center, radius) {
            return;
        }

        match &tree.nodes[node as usize] {
            Node::External => {
                let radius_squared = radius * radius;
                results.extend(
                    cell.content
                        .iter()
                        .zip(&cell.positions)
                        .filter(|(_, position)| position.distance_squared(center) < radius_squared)
                        .map(|(&id, _)| id),
                );
            }
            Node::Internal(quadrant) => {
                for &child in &quadrant.children {
                    self.query_circle_at(child, center, radius, results);
                }
            }
        }
    }

    /// Appends to `results` a random subset of the stored elements in which each element at
    /// distance `d` from `query` is included independently with probability `prob(d)`.
    ///
    /// `prob` must be non-increasing in the distance and return values in `[0, 1]`. Subtrees
    /// with a small probability bound are sampled by geometric jumps over their elements, so the
    /// expected cost is proportional to the number of accepted elements plus the depth of the
    /// tree rather than to its size. Cached subtree sizes must be current, see
    /// [`QuadTree::recount`].
    ///
    /// Returns the number of candidates evaluated, a measure of the work done.
    ///
    /// ```
    /// use quadsample::prelude::*;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let positions: Vec<[f64; 2]> = (0..100).map(|i| [i as f64 / 100.0, 0.5]).collect();
    /// let ids: Vec<u32> = (0..100).collect();
    /// let tree = QuadTree::from_points(&ids, &positions, QuadTreeConfig::default()).unwrap();
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let mut sample = Vec::new();
    /// tree.query_probabilistic(&[0.0, 0.5], |d| (-10.0 * d).exp(), &mut rng, &mut sample);
    /// assert!(sample.len() < 100);
    /// ```
    pub fn query_probabilistic<F, R>(
        &self,
        query: &P,
        prob: F,
        rng: &mut R,
        results: &mut Vec<T>,
    ) -> usize
    where
        F: Fn(f64) -> f64,
        R: Rng + ?Sized,
    {
        self.query_probabilistic_at(self.root(), query, &prob, rng, results)
    }

    fn query_probabilistic_at<F, R>(
        &self,
        node: NodeID,
        query: &P,
        prob: &F,
        rng: &mut R,
        results: &mut Vec<T>,
    ) -> usize
    where
        F: Fn(f64) -> f64,
        R: Rng + ?Sized,
    {
        let tree = self.get();
        let cell = &tree.data[node as usize];

        let (min_distance, max_distance) = cell.region.distance_bounds(query);
        let mut upper = prob(min_distance);
        debug_assert!(
            prob(max_distance) <= upper,
            "probability must not increase with the distance"
        );

        if upper > CLAMP_PROBABILITY {
            upper = 1.0;
        }
        if upper.is_nan() || upper <= 0.0 {
            return 0;
        }

        let denominator = (-upper).ln_1p();
        if denominator == 0.0 {
            return 0;
        }

        match &tree.nodes[node as usize] {
            Node::External => {
                let len = cell.content.len();
                let mut candidates = 0;
                let mut i = 0;

                while i < len {
                    if upper < 1.0 {
                        i = i.saturating_add(jump(rng, denominator));
                        if i >= len {
                            break;
                        }
                    }

                    candidates += 1;
                    let acceptance = prob(cell.positions[i].distance(query)) / upper;
                    if rng.gen::<f64>() < acceptance {
                        results.push(cell.content[i]);
                    }
                    i += 1;
                }

                candidates
            }
            Node::Internal(quadrant) => {
                let size = cell.size;
                let expected = upper * size as f64;

                if upper < 1.0
                    && (expected < DIRECT_SELECTION_YIELD || upper < DIRECT_SELECTION_PROBABILITY)
                {
                    log::trace!(
                        "Direct selection below node {node}: {size} elements, bound {upper}"
                    );

                    let mut candidates = 0;
                    let mut k = 0usize;
                    loop {
                        k = k.saturating_add(jump(rng, denominator));
                        if k >= size {
                            break;
                        }

                        candidates += 1;
                        self.maybe_get_kth(node, k, upper, query, prob, rng, results);
                        k += 1;
                    }

                    candidates
                } else {
                    quadrant
                        .children
                        .iter()
                        .map(|&child| self.query_probabilistic_at(child, query, prob, rng, results))
                        .sum()
                }
            }
        }
    }

    /// Descends to the `k`-th element below `node`, counting leaves in traversal order, and
    /// accepts it with probability `prob(d) / upper`.
    #[allow(clippy::too_many_arguments)]
    fn maybe_get_kth<F, R>(
        &self,
        mut node: NodeID,
        mut k: usize,
        upper: f64,
        query: &P,
        prob: &F,
        rng: &mut R,
        results: &mut Vec<T>,
    ) where
        F: Fn(f64) -> f64,
        R: Rng + ?Sized,
    {
        let tree = self.get();

        loop {
            match &tree.nodes[node as usize] {
                Node::External => {
                    let cell = &tree.data[node as usize];
                    let (Some(&id), Some(position)) = (cell.content.get(k), cell.positions.get(k))
                    else {
                        violation("virtual index beyond subtree size");
                    };

                    let acceptance = prob(position.distance(query)) / upper;
                    if rng.gen::<f64>() < acceptance {
                        results.push(id);
                    }
                    return;
                }
                Node::Internal(quadrant) => {
                    let mut next = None;
                    for &child in &quadrant.children {
                        let child_size = self.size(child);
                        if k < child_size {
                            next = Some(child);
                            break;
                        }
                        k -= child_size;
                    }

                    match next {
                        Some(child) => node = child,
                        None => violation("virtual index beyond subtree size"),
                    }
                }
            }
        }
    }
}

/// Number of elements skipped before the next candidate when every element is a candidate
/// independently with probability `p`, where `denominator` is `ln(1 - p)`.
#[inline]
fn jump<R: Rng + ?Sized>(rng: &mut R, denominator: f64) -> usize {
    let u: f64 = rng.gen();
    // Saturating cast: u = 0 yields an infinite jump past every element.
    (u.ln() / denominator) as usize
}
