use crate::{
    config::QuadTreeConfig,
    error::{violation, QuadTreeError},
    tree::{Cell, Node, NodeID, Quadrant, Region, SplitPolicy, Tree},
    Identifier, Point, Position,
};

/// Internal nodes whose subtree shrinks below this many elements are merged back into a leaf
/// once all their children are leaves.
pub const COARSEN_LIMIT: usize = 4;

/// Arena storing the nodes of a [`QuadTree`].
pub type QuadArena<T, P> = Tree<Node<Quadrant>, Cell<T, P>>;

/// Dynamic region quadtree storing identifiers of type `T` at positions of type `P`.
///
/// Every node is either a leaf buffering at most `capacity - 1` elements or an internal node
/// owning four children that partition its region. Full leaves split, and internal nodes whose
/// subtree falls below [`COARSEN_LIMIT`] elements collapse back into leaves.
///
/// # Example
///
/// ```
/// use quadsample::prelude::*;
///
/// let mut tree = QuadTree::<u32, [f64; 2]>::with_config(
///     Region::new([0.0, 0.0], [1.0, 1.0]),
///     QuadTreeConfig::default().with_capacity(4),
/// )
/// .unwrap();
///
/// for (id, position) in [[0.1, 0.1], [0.2, 0.2], [0.8, 0.8], [0.9, 0.9]].into_iter().enumerate() {
///     tree.insert(id as u32, position);
/// }
///
/// let mut found = Vec::new();
/// tree.query_circle(&[0.15, 0.15], 0.1, &mut found);
/// found.sort();
/// assert_eq!(found, [0, 1]);
///
/// assert!(tree.remove(1, [0.2, 0.2]));
/// assert!(!tree.remove(1, [0.2, 0.2]));
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree<T, P> {
    root: NodeID,
    tree: QuadArena<T, P>,
    config: QuadTreeConfig,
}

impl<T: Identifier, P: Point> QuadTree<T, P> {
    /// Creates an empty [`QuadTree`] covering the given region with the default configuration.
    #[inline]
    pub fn new(region: Region) -> Result<Self, QuadTreeError> {
        Self::with_config(region, QuadTreeConfig::default())
    }

    /// Creates an empty [`QuadTree`] covering the given region.
    pub fn with_config(region: Region, config: QuadTreeConfig) -> Result<Self, QuadTreeError> {
        config.validate()?;
        let region = Region::checked(region.min, region.max)?;

        let mut tree = Tree::new();
        let root = tree.push(Node::External, Cell::new(region));

        Ok(Self { root, tree, config })
    }

    /// Creates a [`QuadTree`] covering the bounding region of the given positions and inserts
    /// every identifier at its position.
    ///
    /// The tree is trimmed and recounted before it is returned.
    pub fn from_points(
        ids: &[T],
        positions: &[P],
        config: QuadTreeConfig,
    ) -> Result<Self, QuadTreeError> {
        if ids.len() != positions.len() {
            return Err(QuadTreeError::LengthMismatch {
                ids: ids.len(),
                positions: positions.len(),
            });
        }

        if let Some(point) = positions.iter().find(|p| !p.is_finite()) {
            return Err(QuadTreeError::NonFinite(point.x(), point.y()));
        }

        let region = Region::bounding(positions.iter().copied()).ok_or(QuadTreeError::EmptyInput)?;
        let mut tree = Self::with_config(region, config)?;

        for (&id, &position) in ids.iter().zip(positions) {
            tree.try_insert(id, position)?;
        }

        tree.trim();
        tree.recount();
        log::debug!(
            "Built quadtree of {} elements with {} leaves and height {}",
            tree.len(),
            tree.count_leaves(),
            tree.height()
        );

        Ok(tree)
    }

    /// Creates a [`QuadTree`] from located items, identified by their index in the slice.
    ///
    /// ```
    /// use quadsample::prelude::*;
    ///
    /// #[derive(Position)]
    /// struct Vertex {
    ///     position: [f64; 2],
    /// }
    ///
    /// let vertices = [Vertex { position: [0.0, 0.0] }, Vertex { position: [2.0, 1.0] }];
    /// let tree = QuadTree::<usize, _>::from_positions(&vertices, QuadTreeConfig::default()).unwrap();
    ///
    /// let mut near = Vec::new();
    /// tree.query_circle(&[1.9, 1.0], 0.5, &mut near);
    /// assert_eq!(near, [1]);
    /// ```
    pub fn from_positions<I>(items: &[I], config: QuadTreeConfig) -> Result<Self, QuadTreeError>
    where
        I: Position<Point = P>,
    {
        let positions: Vec<P> = items.iter().map(|item| item.position()).collect();
        let ids: Vec<T> = (0..items.len()).map(T::from_index).collect();
        Self::from_points(&ids, &positions, config)
    }

    /// Returns the root of the tree.
    #[inline]
    pub const fn root(&self) -> NodeID {
        self.root
    }

    /// Returns a reference to the node arena.
    #[inline]
    pub const fn get(&self) -> &QuadArena<T, P> {
        &self.tree
    }

    #[cfg(feature = "parallel")]
    #[inline]
    pub(crate) fn tree_mut(&mut self) -> &mut QuadArena<T, P> {
        &mut self.tree
    }

    /// Returns the configuration the tree was built with.
    #[inline]
    pub const fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Returns the leaf capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the split policy.
    #[inline]
    pub const fn split_policy(&self) -> SplitPolicy {
        self.config.split_policy
    }

    /// Returns the region covered by the tree.
    #[inline]
    pub fn region(&self) -> Region {
        self.tree.data[self.root as usize].region
    }

    /// Number of elements below the given node: the buffer length of a leaf or the cached
    /// subtree size of an internal node.
    #[inline]
    pub fn size(&self, node: NodeID) -> usize {
        let cell = &self.tree.data[node as usize];
        match self.tree.nodes[node as usize] {
            Node::External => cell.content.len(),
            Node::Internal(_) => cell.size,
        }
    }

    /// Number of elements stored in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Returns `true` if the tree stores no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `id` at `position`, splitting full leaves on the way.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the tree region or the identifier is not below the
    /// configured bound. Use [`QuadTree::try_insert`] to check these conditions instead.
    pub fn insert(&mut self, id: T, position: P) {
        if id.to_u64() >= self.config.id_limit {
            violation("identifier exceeds the sanity bound");
        }
        if !self.region().contains(&position) {
            violation("position outside the tree region");
        }

        self.insert_at(self.root, id, position);
    }

    /// Inserts `id` at `position` after checking the preconditions of [`QuadTree::insert`].
    pub fn try_insert(&mut self, id: T, position: P) -> Result<(), QuadTreeError> {
        if !position.is_finite() {
            return Err(QuadTreeError::NonFinite(position.x(), position.y()));
        }
        if !self.region().contains(&position) {
            return Err(QuadTreeError::OutOfRegion(position.x(), position.y()));
        }
        if id.to_u64() >= self.config.id_limit {
            return Err(QuadTreeError::IdentifierOutOfBounds {
                id: id.to_u64(),
                limit: self.config.id_limit,
            });
        }

        self.insert_at(self.root, id, position);
        Ok(())
    }

    fn insert_at(&mut self, node: NodeID, id: T, position: P) {
        let index = node as usize;

        match self.tree.nodes[index] {
            Node::External => {
                let cell = &mut self.tree.data[index];
                // One slot is always left free: the insertion that would fill it splits instead.
                if cell.content.len() + 1 < self.config.capacity {
                    cell.content.push(id);
                    cell.positions.push(position);
                } else {
                    self.split(node);
                    self.insert_at(node, id, position);
                }
            }
            Node::Internal(quadrant) => {
                let child = quadrant.children[quadrant.child_index(position.x(), position.y())];
                if !self.tree.data[child as usize].region.contains(&position) {
                    violation("no child responsible for position");
                }

                self.insert_at(child, id, position);
                self.tree.data[index].size += 1;
            }
        }
    }

    fn split(&mut self, node: NodeID) {
        let index = node as usize;
        let cell = &mut self.tree.data[index];
        let content = std::mem::take(&mut cell.content);
        let positions = std::mem::take(&mut cell.positions);
        let region = cell.region;
        cell.size = 0;
        cell.stable_id = None;

        let split = region.split_point(self.config.split_policy, &positions);
        if !region.is_interior(split) {
            violation("split point not strictly inside the region");
        }

        log::debug!(
            "Splitting leaf {node} of {} elements covering {:?} at {split:?}",
            content.len(),
            region
        );

        let children = region
            .subdivide(split)
            .map(|region| self.tree.push(Node::External, Cell::new(region)));
        self.tree.nodes[index] = Node::Internal(Quadrant { children, split });

        let count = content.len();
        for (id, position) in content.into_iter().zip(positions) {
            self.insert_at(node, id, position);
        }
        self.tree.data[index].size = count;
    }

    /// Removes `id` stored at `position`.
    ///
    /// Returns `false`, leaving the tree unchanged, if no such element is stored.
    pub fn remove(&mut self, id: T, position: P) -> bool {
        self.remove_at(self.root, id, position)
    }

    fn remove_at(&mut self, node: NodeID, id: T, position: P) -> bool {
        let index = node as usize;
        if !self.tree.data[index].region.contains(&position) {
            return false;
        }

        match self.tree.nodes[index] {
            Node::External => {
                let cell = &mut self.tree.data[index];
                let found = cell
                    .content
                    .iter()
                    .zip(&cell.positions)
                    .position(|(&c, p)| c == id && p.distance_squared(&position) == 0.0);

                match found {
                    Some(i) => {
                        cell.content.remove(i);
                        cell.positions.remove(i);
                        true
                    }
                    None => false,
                }
            }
            Node::Internal(quadrant) => {
                let mut removed = false;
                for child in quadrant.children {
                    if self.remove_at(child, id, position) {
                        if removed {
                            violation("element removed from two sibling regions");
                        }
                        removed = true;
                    }
                }

                if removed {
                    self.tree.data[index].size -= 1;

                    let all_leaves = quadrant
                        .children
                        .iter()
                        .all(|&child| self.tree.nodes[child as usize].is_external());
                    if all_leaves && self.tree.data[index].size < COARSEN_LIMIT {
                        self.coarsen(node, quadrant);
                    }
                }

                removed
            }
        }
    }

    fn coarsen(&mut self, node: NodeID, quadrant: Quadrant) {
        let index = node as usize;
        let mut content = Vec::with_capacity(COARSEN_LIMIT);
        let mut positions = Vec::with_capacity(COARSEN_LIMIT);

        for child in quadrant.children {
            let cell = &mut self.tree.data[child as usize];
            content.append(&mut std::mem::take(&mut cell.content));
            positions.append(&mut std::mem::take(&mut cell.positions));
            cell.stable_id = None;
            self.tree.release(child);
        }

        log::debug!(
            "Coarsening node {node} covering {:?} into a leaf of {} elements",
            self.tree.data[index].region,
            content.len()
        );

        self.tree.nodes[index] = Node::External;
        let cell = &mut self.tree.data[index];
        cell.content = content;
        cell.positions = positions;
        cell.size = 0;
        cell.stable_id = None;
    }

    /// Returns an iterator over the leaves of the tree, in stable traversal order.
    #[inline]
    pub fn leaves(&self) -> Leaves<'_, T, P> {
        Leaves {
            tree: &self.tree,
            stack: vec![self.root],
        }
    }

    /// Number of leaves in the tree.
    #[inline]
    pub fn count_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// Number of levels of the tree, 1 for a single leaf.
    pub fn height(&self) -> usize {
        self.height_at(self.root)
    }

    fn height_at(&self, node: NodeID) -> usize {
        match &self.tree.nodes[node as usize] {
            Node::External => 1,
            Node::Internal(quadrant) => {
                1 + quadrant
                    .children
                    .iter()
                    .map(|&child| self.height_at(child))
                    .max()
                    .unwrap_or_default()
            }
        }
    }

    /// All stored identifiers, in leaf traversal order.
    pub fn elements(&self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.len());
        for (_, cell) in self.leaves() {
            result.extend_from_slice(&cell.content);
        }
        result
    }

    /// All stored positions, in leaf traversal order.
    pub fn coordinates(&self) -> Vec<P> {
        let mut result = Vec::with_capacity(self.len());
        for (_, cell) in self.leaves() {
            result.extend_from_slice(&cell.positions);
        }
        result
    }

    /// Shrinks every buffer to its content. Call once construction is complete for better memory
    /// usage and cache efficiency.
    pub fn trim(&mut self) {
        for cell in &mut self.tree.data {
            cell.content.shrink_to_fit();
            cell.positions.shrink_to_fit();
        }
        self.tree.shrink_to_fit();
    }

    /// Recomputes the cached size of every internal node from its children.
    pub fn recount(&mut self) {
        self.recount_at(self.root);
    }

    fn recount_at(&mut self, node: NodeID) -> usize {
        let index = node as usize;
        match self.tree.nodes[index] {
            Node::External => self.tree.data[index].content.len(),
            Node::Internal(quadrant) => {
                let size = quadrant
                    .children
                    .iter()
                    .map(|&child| self.recount_at(child))
                    .sum();
                self.tree.data[index].size = size;
                size
            }
        }
    }

    /// Numbers the leaves sequentially in traversal order and clears the identifiers of internal
    /// nodes. Returns the number of leaves.
    ///
    /// Identifiers go stale as soon as a leaf splits or coarsens.
    pub fn assign_stable_ids(&mut self) -> usize {
        for cell in &mut self.tree.data {
            cell.stable_id = None;
        }

        let leaves: Vec<NodeID> = self.leaves().map(|(id, _)| id).collect();
        for (stable_id, &leaf) in leaves.iter().enumerate() {
            self.tree.data[leaf as usize].stable_id = Some(stable_id);
        }

        leaves.len()
    }

    /// Stable identifier of the leaf responsible for the given position.
    ///
    /// Returns `None` if the position is outside the tree or identifiers were not assigned.
    pub fn cell_id(&self, position: &P) -> Option<usize> {
        let mut node = self.root;
        if !self.region().contains(position) {
            return None;
        }

        while let Node::Internal(quadrant) = &self.tree.nodes[node as usize] {
            node = quadrant.children[quadrant.child_index(position.x(), position.y())];
        }

        self.tree.data[node as usize].stable_id
    }

    /// Largest stable identifier assigned to a leaf.
    #[inline]
    pub fn max_stable_id(&self) -> Option<usize> {
        self.leaves().filter_map(|(_, cell)| cell.stable_id).max()
    }

    /// Replaces the stored identifiers with the contiguous range starting at `offset`, in leaf
    /// traversal order. Returns the end of the range.
    pub fn reindex(&mut self, offset: usize) -> usize {
        let mut next = offset;
        for (leaf, start) in self.leaf_offsets(offset) {
            let cell = &mut self.tree.data[leaf as usize];
            cell.reindex_from(start);
            next = start + cell.content.len();
        }
        next
    }

    /// Offset of the first element of every leaf when elements are numbered from `offset` in
    /// traversal order.
    pub(crate) fn leaf_offsets(&self, offset: usize) -> Vec<(NodeID, usize)> {
        let mut next = offset;
        self.leaves()
            .map(|(leaf, cell)| {
                let start = next;
                next += cell.content.len();
                (leaf, start)
            })
            .collect()
    }

    /// Sorts the elements of every leaf by their x coordinate.
    pub fn sort_leaf_contents(&mut self) {
        let leaves: Vec<NodeID> = self.leaves().map(|(id, _)| id).collect();
        for leaf in leaves {
            self.tree.data[leaf as usize].sort_by_x();
        }
    }
}

impl<T: Identifier, P: Point> Cell<T, P> {
    /// Replaces the buffered identifiers with the contiguous range starting at `start`.
    #[inline]
    pub(crate) fn reindex_from(&mut self, start: usize) {
        for (i, id) in self.content.iter_mut().enumerate() {
            *id = T::from_index(start + i);
        }
    }

    /// Stable sort of the buffered elements by x coordinate.
    #[inline]
    pub(crate) fn sort_by_x(&mut self) {
        let mut pairs: Vec<(T, P)> = self.content.drain(..).zip(self.positions.drain(..)).collect();
        pairs.sort_by(|(_, a), (_, b)| a.x().total_cmp(&b.x()));
        (self.content, self.positions) = pairs.into_iter().unzip();
    }
}

/// Iterator over the leaves of a [`QuadTree`] in traversal order, children visited south-west,
/// south-east, north-west, north-east.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Leaves<'a, T, P> {
    tree: &'a QuadArena<T, P>,
    stack: Vec<NodeID>,
}

impl<'a, T, P> Iterator for Leaves<'a, T, P> {
    type Item = (NodeID, &'a Cell<T, P>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match &self.tree.nodes[node as usize] {
                Node::Internal(quadrant) => self.stack.extend(quadrant.children.iter().rev()),
                Node::External => return Some((node, &self.tree.data[node as usize])),
            }
        }
        None
    }
}
