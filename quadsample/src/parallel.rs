use crate::{tree::Node, Identifier, Point, QuadTree};
use rand::{rngs::StdRng, SeedableRng};
use rayon::iter::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator,
    IntoParallelRefMutIterator, ParallelIterator,
};

impl<T, P> QuadTree<T, P>
where
    T: Identifier + Send + Sync,
    P: Point + Send + Sync,
{
    /// Parallel version of [`QuadTree::reindex`]: leaf offsets are computed sequentially, then
    /// every leaf is renumbered on its own thread. Returns the end of the range.
    pub fn par_reindex(&mut self, offset: usize) -> usize {
        let mut starts = vec![None; self.get().data.len()];
        let mut next = offset;
        for (leaf, start) in self.leaf_offsets(offset) {
            starts[leaf as usize] = Some(start);
            next = start + self.get().data[leaf as usize].content.len();
        }

        self.tree_mut()
            .data
            .par_iter_mut()
            .zip(starts.into_par_iter())
            .for_each(|(cell, start)| {
                if let Some(start) = start {
                    cell.reindex_from(start);
                }
            });

        next
    }

    /// Parallel version of [`QuadTree::sort_leaf_contents`].
    pub fn par_sort_leaf_contents(&mut self) {
        let tree = self.tree_mut();
        tree.nodes
            .par_iter()
            .zip(tree.data.par_iter_mut())
            .filter(|(node, _)| node.is_external())
            .for_each(|(_, cell)| cell.sort_by_x());
    }

    /// Runs [`QuadTree::query_circle`] for every center in parallel.
    pub fn par_query_circle(&self, centers: &[P], radius: f64) -> Vec<Vec<T>> {
        centers
            .par_iter()
            .map(|center| {
                let mut results = Vec::new();
                self.query_circle(center, radius, &mut results);
                results
            })
            .collect()
    }

    /// Runs [`QuadTree::query_probabilistic`] for every query point in parallel.
    ///
    /// Query `i` draws from its own generator seeded with `seed + i`, so the results only depend
    /// on the inputs and not on the scheduling.
    pub fn par_query_probabilistic<F>(&self, queries: &[P], prob: F, seed: u64) -> Vec<Vec<T>>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        queries
            .par_iter()
            .enumerate()
            .map(|(i, query)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let mut results = Vec::new();
                self.query_probabilistic(query, &prob, &mut rng, &mut results);
                results
            })
            .collect()
    }
}
