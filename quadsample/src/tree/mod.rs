/// Rectangular regions and their subdivision.
pub mod region;

pub use region::*;

/// Index of a node in a [`Tree`].
pub type NodeID = u32;

/// Arena storing the nodes of a tree.
///
/// Slots released by [`Tree::release`] are recycled by later calls to [`Tree::push`], so a
/// [`NodeID`] stays valid for as long as its node is reachable.
#[derive(Clone, Debug)]
pub struct Tree<Node, Data> {
    /// Vector of `Node` objects that define the structure of the tree.
    pub nodes: Vec<Node>,

    /// Vector of generic `Data` objects that contain information about the associated `Node`.
    ///
    /// The `data` vector is parallel to the `nodes` vector, so the `i`-th element of the `data`
    /// vector corresponds to the `i`-th element of the `nodes` vector.
    pub data: Vec<Data>,

    free: Vec<NodeID>,
}

impl<Node, Data> Tree<Node, Data> {
    /// Creates a new empty [`Tree`].
    #[inline]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            data: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a node and its data, reusing a released slot if there is one.
    #[inline]
    pub fn push(&mut self, node: Node, data: Data) -> NodeID {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = node;
                self.data[id as usize] = data;
                id
            }
            None => {
                let id = NodeID::try_from(self.nodes.len())
                    .unwrap_or_else(|_| crate::error::violation("node arena exhausted"));
                self.nodes.push(node);
                self.data.push(data);
                id
            }
        }
    }

    /// Marks the slot as unused. The caller must not reach it through any node afterwards.
    #[inline]
    pub fn release(&mut self, id: NodeID) {
        self.free.push(id);
    }

    /// Number of slots currently in use.
    #[inline]
    pub fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Shrinks the backing vectors as much as possible.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.data.shrink_to_fit();
        self.free.shrink_to_fit();
    }
}

impl<Node, Data> Default for Tree<Node, Data> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Node that can either be internal and containing children or external and containing none.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Node<N> {
    /// Node with child nodes.
    Internal(N),
    /// Node without children.
    External,
}

impl<N> Node<N> {
    /// Returns `true` if the node has no children.
    #[inline]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }
}

/// The four children of an internal node and the point its region was split at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quadrant {
    /// Children ordered south-west, south-east, north-west, north-east.
    pub children: [NodeID; 4],
    /// Corner shared by the four child regions.
    pub split: [f64; 2],
}

impl Quadrant {
    /// Index in [`Quadrant::children`] of the child responsible for the given coordinates.
    #[inline]
    pub fn child_index(&self, x: f64, y: f64) -> usize {
        usize::from(x >= self.split[0]) | usize::from(y >= self.split[1]) << 1
    }
}

/// Per-node data: region, cached subtree size, stable identifier and leaf buffers.
#[derive(Clone, Debug)]
pub struct Cell<T, P> {
    /// Region the node is responsible for.
    pub region: Region,
    /// Cached number of elements below an internal node. Unused for leaves.
    pub size: usize,
    /// Identifier assigned to leaves by a stable traversal.
    pub stable_id: Option<usize>,
    /// Buffered element identifiers of a leaf.
    pub content: Vec<T>,
    /// Positions parallel to `content`.
    pub positions: Vec<P>,
}

impl<T, P> Cell<T, P> {
    /// Creates an empty cell for the given region.
    #[inline]
    pub const fn new(region: Region) -> Self {
        Self {
            region,
            size: 0,
            stable_id: None,
            content: Vec::new(),
            positions: Vec::new(),
        }
    }
}
