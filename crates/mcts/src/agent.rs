//! MCTS agent with cross-turn tree reuse.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactica_core::{ActionAssignment, Agent, ForwardModel, PlayerId, Result, StateHeuristic, TacticaError};
use tracing::{debug, warn};

use crate::{
    budget::Budget,
    config::MctsParameters,
    heuristic::MaterialHeuristic,
    preprocess::PrunedForwardModel,
    search::{new_node, Search},
    tree::Tree,
};

/// Agent that picks actions with a portfolio-guided MCTS.
///
/// Between decisions within one turn the agent keeps the subtree below the
/// action it played and continues searching from there. Ending the turn
/// discards it.
pub struct MctsAgent<F: ForwardModel> {
    name: String,
    params: MctsParameters,
    player: PlayerId,
    heuristic: Option<Arc<dyn StateHeuristic<F::State>>>,
    tree: Option<Tree<F::State>>,
    previous_action_index: Option<usize>,
    rng: ChaCha8Rng,
    last_fm_calls: usize,
}

impl<F: ForwardModel> MctsAgent<F> {
    pub fn new(params: MctsParameters) -> Self {
        Self {
            name: "mcts".to_string(),
            params,
            player: 0,
            heuristic: None,
            tree: None,
            previous_action_index: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            last_fm_calls: 0,
        }
    }

    /// Use `heuristic` to score rollouts instead of the health balance.
    pub fn with_heuristic(mut self, heuristic: Arc<dyn StateHeuristic<F::State>>) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    /// The tree left by the last search, if any.
    pub fn tree(&self) -> Option<&Tree<F::State>> {
        self.tree.as_ref()
    }

    /// Root action index that the next decision will continue from.
    pub fn previous_action_index(&self) -> Option<usize> {
        self.previous_action_index
    }

    /// Forward-model calls spent by the last decision.
    pub fn last_forward_model_calls(&self) -> usize {
        self.last_fm_calls
    }

    fn reset_search(&mut self) {
        self.tree = None;
        self.previous_action_index = None;
    }
}

impl<F: ForwardModel> Agent<F> for MctsAgent<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn player_id(&self) -> PlayerId {
        self.player
    }

    fn set_player_id(&mut self, player: PlayerId) {
        self.player = player;
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn init(&mut self, initial_state: &F::State, _forward_model: &F, _time_budget: Option<Duration>) {
        self.reset_search();
        if self.heuristic.is_none() {
            self.heuristic = Some(Arc::new(MaterialHeuristic::from_initial_state(initial_state)));
        }
    }

    fn compute_action(
        &mut self,
        state: F::State,
        forward_model: &F,
        time_budget: Option<Duration>,
    ) -> Result<ActionAssignment> {
        let mut actions = forward_model.generate_actions(&state, self.player);
        if actions.is_empty() {
            return Err(TacticaError::NoLegalActions { player: self.player });
        }

        if actions.len() == 1 || !self.params.continue_previous_search {
            self.reset_search();
            self.last_fm_calls = 0;
            return Ok(ActionAssignment::from_single_action(actions.swap_remove(0)));
        }

        let heuristic = Arc::clone(
            self.heuristic
                .get_or_insert_with(|| Arc::new(MaterialHeuristic::from_initial_state(&state))),
        );
        let processed = PrunedForwardModel::new(forward_model, &self.params.pruned_actions);

        let reused = match (self.tree.take(), self.previous_action_index.take()) {
            (Some(tree), Some(index)) => tree.reroot(index),
            _ => None,
        };
        let mut tree = match reused {
            Some(tree) => {
                debug!(player = self.player, nodes = tree.len(), "continuing previous search");
                tree
            }
            None => Tree::new(new_node(&processed, state, self.player)),
        };

        let mut budget = Budget::new(self.params.max_fm_calls);
        if let Some(limit) = time_budget {
            budget = budget.with_time_limit(limit);
        }
        Search::new(
            &processed,
            &self.params,
            heuristic.as_ref(),
            self.player,
            &mut budget,
            &mut self.rng,
        )
        .run(&mut tree);
        self.last_fm_calls = budget.consumed();

        let best = tree
            .most_visited_action(&mut self.rng)
            .and_then(|index| tree.root().actions.get(index).cloned().map(|a| (index, a)));
        let action = match best {
            Some((index, action)) => {
                self.previous_action_index = (!action.ends_turn()).then_some(index);
                action
            }
            None => {
                warn!(player = self.player, "search produced no root statistics, playing first legal action");
                self.previous_action_index = None;
                actions.swap_remove(0)
            }
        };

        debug!(
            player = self.player,
            %action,
            fm_calls = self.last_fm_calls,
            nodes = tree.len(),
            "mcts decision"
        );
        self.tree = Some(tree);
        Ok(ActionAssignment::from_single_action(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Skirmish, SkirmishState, UnitKind};
    use tactica_core::{Action, ActionCategory, GameState, Position, UnitId};

    fn agent(params: MctsParameters, seed: u64) -> MctsAgent<Skirmish> {
        let mut agent = MctsAgent::new(params);
        agent.set_player_id(0);
        agent.set_seed(seed);
        agent
    }

    #[test]
    fn test_single_action_skips_search() {
        // The only unit has already moved, so ending the turn is all that is left
        let state = SkirmishState::new(3, 1, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(2, 0));
        let state = Skirmish.advance(&state, &Action::Move { unit: UnitId(0), to: Position::new(1, 0) });

        let mut agent = agent(MctsParameters::default().with_max_fm_calls(100), 1);
        let chosen = agent.compute_action(state, &Skirmish, None).unwrap();
        assert_eq!(chosen.action(), &Action::EndTurn);
        assert!(agent.tree().is_none());
        assert_eq!(agent.last_forward_model_calls(), 0);
    }

    #[test]
    fn test_no_legal_actions_is_an_error() {
        let mut agent = agent(MctsParameters::default(), 1);
        let state = SkirmishState::standard();
        agent.set_player_id(1);
        let err = agent.compute_action(state, &Skirmish, None).unwrap_err();
        assert_eq!(err, TacticaError::NoLegalActions { player: 1 });
    }

    #[test]
    fn test_disabled_continuation_plays_first_action() {
        let state = SkirmishState::standard();
        let mut agent = agent(MctsParameters::default().with_continue_previous_search(false), 1);
        let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();

        assert_eq!(chosen.action(), &Skirmish.generate_actions(&state, 0)[0]);
        assert!(agent.tree().is_none());
        assert_eq!(agent.last_forward_model_calls(), 0);
    }

    #[test]
    fn test_search_uses_budget_and_keeps_tree() {
        let state = SkirmishState::standard();
        let mut agent = agent(MctsParameters::default().with_max_fm_calls(200), 7);
        let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();

        assert!(Skirmish.generate_actions(&state, 0).contains(chosen.action()));
        assert_eq!(agent.last_forward_model_calls(), 200);
        assert!(agent.tree().is_some());
        match agent.previous_action_index() {
            Some(index) => assert_eq!(&agent.tree().unwrap().root().actions[index], chosen.action()),
            None => assert!(chosen.action().ends_turn()),
        }
    }

    #[test]
    fn test_tree_is_reused_within_a_turn() {
        // Without end turn in the action space the first decision keeps a subtree
        let params = MctsParameters::default()
            .with_max_fm_calls(400)
            .with_pruned_actions(vec![ActionCategory::EndTurn]);
        let mut agent = agent(params, 3);
        let state = SkirmishState::standard();

        let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();
        let index = agent.previous_action_index().unwrap();
        let kept_visits = {
            let tree = agent.tree().unwrap();
            tree.get(tree.root().children[&index]).stats.visit_count
        };

        let next = Skirmish.advance(&state, chosen.action());
        agent.compute_action(next.clone(), &Skirmish, None).unwrap();
        let root = agent.tree().unwrap().root();
        assert_eq!(root.state, next);
        assert!(root.stats.visit_count > kept_visits);
    }

    #[test]
    fn test_reused_tree_holds_only_own_decisions() {
        for seed in 0..12 {
            let mut agent = agent(MctsParameters::default().with_max_fm_calls(122), seed);
            let mut state = SkirmishState::standard();

            for _ in 0..4 {
                if state.current_player() != 0 || Skirmish.is_terminal(&state) {
                    break;
                }
                let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();
                if let Some(tree) = agent.tree() {
                    for id in tree.ids() {
                        let node = tree.get(id);
                        assert!(node.terminal || node.state.current_player() == 0);
                        assert!(node.terminal || !node.actions.is_empty());
                    }
                }
                state = Skirmish.advance(&state, chosen.action());
            }
        }
    }

    #[test]
    fn test_ending_turn_clears_previous_index() {
        let mut state = SkirmishState::new(4, 1, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(3, 0));
        let mut agent = agent(MctsParameters::default().with_max_fm_calls(300), 5);

        while state.current_player() == 0 {
            let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();
            if chosen.action().ends_turn() {
                assert_eq!(agent.previous_action_index(), None);
            } else {
                assert!(agent.previous_action_index().is_some());
            }
            state = Skirmish.advance(&state, chosen.action());
        }
    }

    #[test]
    fn test_same_seed_same_decision() {
        let params = MctsParameters::default().with_max_fm_calls(300);
        let state = SkirmishState::standard();
        let a = agent(params.clone(), 42).compute_action(state.clone(), &Skirmish, None).unwrap();
        let b = agent(params, 42).compute_action(state, &Skirmish, None).unwrap();
        assert_eq!(a, b);
    }
}
