//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices; a node refers to its parent and
//! children by [`NodeId`] only.

use std::collections::BTreeMap;
use tactica_core::Action;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Using indices instead of pointers avoids Rc/RefCell overhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a single MCTS node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStats {
    /// Number of times this node was visited during search.
    pub visit_count: u32,

    /// Sum of values from all visits (for computing the mean value).
    pub value_sum: f64,
}

impl NodeStats {
    /// Mean value for this node.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }
}

/// A node in the MCTS tree.
///
/// Each node represents a decision point of the searching player. Its action
/// space is generated once, at creation, so child indices stay valid for the
/// lifetime of the node.
#[derive(Clone, Debug)]
pub struct Node<S> {
    /// Game state this node represents.
    pub state: S,

    /// Node statistics (visits, value).
    pub stats: NodeStats,

    /// Distance from the root.
    pub depth: usize,

    /// Non-owning back-reference; `None` for the root.
    pub parent: Option<NodeId>,

    /// Legal actions of the searching player at `state`.
    pub actions: Vec<Action>,

    /// Expanded children keyed by their index into `actions`.
    pub children: BTreeMap<usize, NodeId>,

    /// Whether `state` is terminal.
    pub terminal: bool,
}

impl<S> Node<S> {
    pub fn new(state: S, actions: Vec<Action>, terminal: bool, depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            state,
            stats: NodeStats::default(),
            depth,
            parent,
            actions,
            children: BTreeMap::new(),
            terminal,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether every action already has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() >= self.actions.len()
    }

    /// Lowest action index without a child.
    pub fn next_unexpanded(&self) -> Option<usize> {
        (0..self.actions.len()).find(|i| !self.children.contains_key(i))
    }

    /// Terminal nodes and nodes without actions end selection.
    pub fn is_leaf(&self) -> bool {
        self.terminal || self.actions.is_empty()
    }
}
