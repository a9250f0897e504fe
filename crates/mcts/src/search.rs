//! Monte Carlo Tree Search routine.
//!
//! Implements the four-phase loop (selection, expansion, rollout,
//! backpropagation) with UCB selection. The tree only holds decision points
//! of the searching player; opponents are simulated with the configured
//! opponent model whenever play passes to them.

use crate::{
    budget::Budget,
    config::MctsParameters,
    node::{Node, NodeId},
    portfolio::ActionScript,
    tree::Tree,
};
use rand::Rng;
use tactica_core::{Action, ForwardModel, GameState, PlayerId, StateHeuristic};
use tracing::debug;

/// Guard against division by zero and magnitude of the tie-breaking noise.
const EPSILON: f64 = 1e-6;

/// Consecutive iterations without a forward-model call after which the
/// reachable tree is considered exhausted.
const MAX_IDLE_ITERATIONS: usize = 1_000;

/// Build a node for `state`, generating the searching player's action space.
pub fn new_node<F: ForwardModel>(forward_model: &F, state: F::State, player: PlayerId) -> Node<F::State> {
    let terminal = forward_model.is_terminal(&state);
    let actions = if terminal {
        Vec::new()
    } else {
        forward_model.generate_actions(&state, player)
    };
    Node::new(state, actions, terminal, 0, None)
}

/// One search invocation over a tree.
///
/// Borrows everything it needs for the duration of the search; the budget
/// is consumed in place so the caller can inspect it afterwards.
pub struct Search<'a, F: ForwardModel, R: Rng> {
    forward_model: &'a F,
    params: &'a MctsParameters,
    heuristic: &'a dyn StateHeuristic<F::State>,
    player: PlayerId,
    budget: &'a mut Budget,
    rng: &'a mut R,
}

impl<'a, F, R> Search<'a, F, R>
where
    F: ForwardModel,
    R: Rng,
{
    pub fn new(
        forward_model: &'a F,
        params: &'a MctsParameters,
        heuristic: &'a dyn StateHeuristic<F::State>,
        player: PlayerId,
        budget: &'a mut Budget,
        rng: &'a mut R,
    ) -> Self {
        Self {
            forward_model,
            params,
            heuristic,
            player,
            budget,
            rng,
        }
    }

    /// Run iterations until the budget is exhausted. Returns the number of
    /// completed iterations.
    pub fn run(&mut self, tree: &mut Tree<F::State>) -> usize {
        if tree.root().is_leaf() {
            return 0;
        }

        let mut iterations = 0;
        let mut idle = 0;
        while !self.budget.is_exhausted() && idle < MAX_IDLE_ITERATIONS {
            let before = self.budget.consumed();

            let (leaf, detached) = self.tree_policy(tree);
            let value = match detached {
                Some(state) => self.rollout(&state),
                None => self.rollout(&tree.get(leaf).state),
            };
            tree.backpropagate(leaf, value);

            iterations += 1;
            idle = if self.budget.consumed() == before { idle + 1 } else { 0 };
        }

        debug!(
            player = self.player,
            iterations,
            fm_calls = self.budget.consumed(),
            nodes = tree.len(),
            "search finished"
        );
        iterations
    }

    /// SELECT down the tree and EXPAND one child where possible.
    ///
    /// Returns the node to backpropagate from, and the state to roll out
    /// from when it is not that node's own state.
    fn tree_policy(&mut self, tree: &mut Tree<F::State>) -> (NodeId, Option<F::State>) {
        let mut current = NodeId::ROOT;
        loop {
            let node = tree.get(current);
            if node.is_leaf() {
                return (current, None);
            }
            if !node.is_fully_expanded() {
                if self.budget.is_exhausted() {
                    return (current, None);
                }
                return self.expand(tree, current);
            }
            match self.select_child(tree, current) {
                Some(child) => current = child,
                None => return (current, None),
            }
        }
    }

    /// Create the child for the lowest unexpanded action of `parent`.
    ///
    /// A child is only attached once play is back with the searching player
    /// or the game is over. If the opponents' turn is cut short, the action
    /// stays unexpanded and the intermediate state is handed back for the
    /// rollout, credited to `parent`.
    fn expand(&mut self, tree: &mut Tree<F::State>, parent: NodeId) -> (NodeId, Option<F::State>) {
        let node = tree.get(parent);
        let Some(index) = node.next_unexpanded() else {
            return (parent, None);
        };

        let state = self.forward_model.advance(&node.state, &node.actions[index]);
        self.budget.consume();
        let state = self.play_opponents(state);

        if state.current_player() != self.player && !self.forward_model.is_terminal(&state) {
            debug!(player = self.player, index, "opponent turn cut short, child not attached");
            return (parent, Some(state));
        }

        let child = new_node(self.forward_model, state, self.player);
        (tree.add_child(parent, index, child), None)
    }

    /// UCB: mean value plus `K * sqrt(ln(parent visits) / child visits)`.
    fn select_child(&mut self, tree: &Tree<F::State>, id: NodeId) -> Option<NodeId> {
        let node = tree.get(id);
        let ln_parent = f64::from(node.stats.visit_count.max(1)).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for child_id in node.children.values() {
            let stats = &tree.get(*child_id).stats;
            let visits = f64::from(stats.visit_count).max(EPSILON);
            let ucb = stats.mean_value() + self.params.k * (ln_parent / visits).sqrt();
            // Random tie-break between identical-looking branches
            let ucb = ucb + self.rng.gen::<f64>() * EPSILON;

            if best.map_or(true, |(_, b)| ucb > b) {
                best = Some((*child_id, ucb));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Let opponents act until it is the searching player's turn again.
    fn play_opponents(&mut self, mut state: F::State) -> F::State {
        while !self.forward_model.is_terminal(&state)
            && state.current_player() != self.player
            && !self.budget.is_exhausted()
        {
            let player = state.current_player();
            let actions = self.forward_model.generate_actions(&state, player);
            let Some(index) = self.opponent_choice(&state, player, &actions) else {
                break;
            };
            state = self.forward_model.advance(&state, &actions[index]);
            self.budget.consume();
        }
        state
    }

    /// Simulate up to `rollout_length` steps and score the final state.
    fn rollout(&mut self, from: &F::State) -> f64 {
        let mut state = from.clone();
        for _ in 0..self.params.rollout_length {
            if self.forward_model.is_terminal(&state) || self.budget.is_exhausted() {
                break;
            }

            let player = state.current_player();
            let actions = self.forward_model.generate_actions(&state, player);
            let choice = if player == self.player {
                let script = self.params.portfolio.sample(self.rng);
                script.choose(&state, player, &actions, self.rng)
            } else {
                self.opponent_choice(&state, player, &actions)
            };
            let Some(index) = choice else {
                break;
            };

            state = self.forward_model.advance(&state, &actions[index]);
            self.budget.consume();
        }

        self.heuristic.evaluate(&state, self.player)
    }

    fn opponent_choice(&mut self, state: &F::State, player: PlayerId, actions: &[Action]) -> Option<usize> {
        self.params
            .opponent_model
            .unwrap_or(ActionScript::Random)
            .choose(state, player, actions, self.rng)
    }
}
