//! Arena-allocated MCTS tree.
//!
//! The tree exclusively owns every node. Re-rooting onto a child copies the
//! surviving subtree into a fresh arena and drops the rest, so ownership is
//! never shared.

use crate::node::{Node, NodeId};
use rand::Rng;

/// Arena-allocated MCTS tree.
///
/// Nodes are stored in a contiguous vector and referenced by index.
/// The root is always [`NodeId::ROOT`].
#[derive(Clone, Debug)]
pub struct Tree<S> {
    nodes: Vec<Node<S>>,
}

impl<S> Tree<S> {
    /// Create a tree holding only `root`.
    pub fn new(mut root: Node<S>) -> Self {
        root.parent = None;
        root.depth = 0;
        Self { nodes: vec![root] }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node<S> {
        self.get(NodeId::ROOT)
    }

    /// Attach `child` under `parent` for the action at `action_index`.
    pub fn add_child(&mut self, parent: NodeId, action_index: usize, mut child: Node<S>) -> NodeId {
        let id = NodeId(self.nodes.len());
        child.parent = Some(parent);
        child.depth = self.get(parent).depth + 1;
        self.nodes.push(child);
        self.get_mut(parent).children.insert(action_index, id);
        id
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists for the lifetime of the tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Add one visit and `value` to `leaf` and every ancestor.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.stats.visit_count += 1;
            node.stats.value_sum += value;
            current = node.parent;
        }
    }

    /// Action index of the most visited root child.
    ///
    /// Ties are broken uniformly at random. Returns `None` when the root has
    /// no children.
    pub fn most_visited_action<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let root = self.root();
        let best = root
            .children
            .values()
            .map(|id| self.get(*id).stats.visit_count)
            .max()?;

        let tied: Vec<usize> = root
            .children
            .iter()
            .filter(|(_, id)| self.get(**id).stats.visit_count == best)
            .map(|(index, _)| *index)
            .collect();

        match tied.len() {
            1 => Some(tied[0]),
            n => Some(tied[rng.gen_range(0..n)]),
        }
    }

    /// Promote the root child reached by `action_index` to a new root.
    ///
    /// The subtree is moved into a fresh arena: its parent link is cleared and
    /// depths restart at 0. The old root and all siblings are dropped.
    /// Returns `None` if no such child exists.
    pub fn reroot(self, action_index: usize) -> Option<Tree<S>> {
        let new_root = *self.root().children.get(&action_index)?;

        let mut slots: Vec<Option<Node<S>>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes: Vec<Node<S>> = Vec::new();
        // (old id, new parent, action index under new parent)
        let mut stack: Vec<(NodeId, Option<NodeId>, usize)> = vec![(new_root, None, action_index)];

        while let Some((old_id, new_parent, index)) = stack.pop() {
            let Some(mut node) = slots[old_id.0].take() else {
                continue;
            };
            let new_id = NodeId(nodes.len());
            let old_children = std::mem::take(&mut node.children);

            node.parent = new_parent;
            node.depth = match new_parent {
                Some(parent) => nodes[parent.0].depth + 1,
                None => 0,
            };
            nodes.push(node);
            if let Some(parent) = new_parent {
                nodes[parent.0].children.insert(index, new_id);
            }

            // Reverse so lower action indices are laid out first
            for (child_index, child_id) in old_children.into_iter().rev() {
                stack.push((child_id, Some(new_id), child_index));
            }
        }

        Some(Tree { nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tactica_core::Action;

    fn leaf(label: u32) -> Node<u32> {
        Node::new(label, vec![Action::EndTurn, Action::EndTurn], false, 0, None)
    }

    /// root(0) -> a(1) -> c(3)
    ///         -> b(2)
    fn sample_tree() -> Tree<u32> {
        let mut tree = Tree::new(leaf(0));
        let a = tree.add_child(NodeId::ROOT, 0, leaf(1));
        tree.add_child(NodeId::ROOT, 1, leaf(2));
        let c = tree.add_child(a, 1, leaf(3));
        tree.backpropagate(c, 1.0);
        tree.backpropagate(a, 0.5);
        tree
    }

    #[test]
    fn test_tree_creation() {
        let tree = Tree::new(leaf(0));
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert!(tree.root().is_root());
    }

    #[test]
    fn test_add_child_sets_depth_and_parent() {
        let tree = sample_tree();
        let a = tree.root().children[&0];
        let c = tree.get(a).children[&1];
        assert_eq!(tree.get(a).depth, 1);
        assert_eq!(tree.get(c).depth, 2);
        assert_eq!(tree.get(c).parent, Some(a));
    }

    #[test]
    fn test_backpropagate_updates_ancestors() {
        let tree = sample_tree();
        assert_eq!(tree.root().stats.visit_count, 2);
        assert!((tree.root().stats.value_sum - 1.5).abs() < 1e-9);
        let b = tree.root().children[&1];
        assert_eq!(tree.get(b).stats.visit_count, 0);
    }

    #[test]
    fn test_most_visited_action() {
        let tree = sample_tree();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tree.most_visited_action(&mut rng), Some(0));
    }

    #[test]
    fn test_most_visited_breaks_ties_randomly() {
        let mut tree = Tree::new(leaf(0));
        let a = tree.add_child(NodeId::ROOT, 0, leaf(1));
        let b = tree.add_child(NodeId::ROOT, 1, leaf(2));
        tree.backpropagate(a, 0.0);
        tree.backpropagate(b, 0.0);

        let mut seen = [false; 2];
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            if let Some(index) = tree.most_visited_action(&mut rng) {
                seen[index] = true;
            }
        }
        assert!(seen[0] && seen[1], "tie-break always picked the same child");
    }

    #[test]
    fn test_most_visited_without_children() {
        let tree = Tree::new(leaf(0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tree.most_visited_action(&mut rng), None);
    }

    #[test]
    fn test_reroot_moves_subtree() {
        let tree = sample_tree();
        let rerooted = tree.reroot(0).expect("child 0 exists");

        assert_eq!(rerooted.len(), 2);
        let root = rerooted.root();
        assert_eq!(root.state, 1);
        assert_eq!(root.depth, 0);
        assert!(root.is_root());
        assert_eq!(root.stats.visit_count, 2);

        let c = root.children[&1];
        assert_eq!(rerooted.get(c).state, 3);
        assert_eq!(rerooted.get(c).depth, 1);
        assert_eq!(rerooted.get(c).parent, Some(NodeId::ROOT));
    }

    #[test]
    fn test_reroot_missing_child() {
        let tree = Tree::new(leaf(0));
        assert!(tree.reroot(0).is_none());
    }
}
