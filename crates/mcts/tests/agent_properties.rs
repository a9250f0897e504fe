//! Property-based tests for the MCTS agent.
//!
//! - The search never spends more forward-model calls than allowed
//! - Parent visit counts cover their children
//! - Seeded agents are deterministic
//! - Chosen actions are always legal

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tactica_core::{Action, Agent, ForwardModel, GameState, PlayerId};
use tactica_mcts::{
    games::{Skirmish, SkirmishState},
    search::new_node,
    ActionScript, Budget, MaterialHeuristic, MctsAgent, MctsParameters, Portfolio, Search, Tree,
};

/// Skirmish rules that count every `advance` call.
#[derive(Clone, Default)]
struct CountingSkirmish {
    calls: Arc<AtomicUsize>,
}

impl CountingSkirmish {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ForwardModel for CountingSkirmish {
    type State = SkirmishState;

    fn generate_actions(&self, state: &SkirmishState, player: PlayerId) -> Vec<Action> {
        Skirmish.generate_actions(state, player)
    }

    fn advance(&self, state: &SkirmishState, action: &Action) -> SkirmishState {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Skirmish.advance(state, action)
    }

    fn is_terminal(&self, state: &SkirmishState) -> bool {
        Skirmish.is_terminal(state)
    }

    fn winner(&self, state: &SkirmishState) -> Option<PlayerId> {
        Skirmish.winner(state)
    }
}

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_script() -> impl Strategy<Value = ActionScript> {
    prop_oneof![
        Just(ActionScript::AttackClosest),
        Just(ActionScript::AttackWeakest),
        Just(ActionScript::RunAway),
        Just(ActionScript::RunToFriends),
        Just(ActionScript::UseSpecialAbility),
        Just(ActionScript::Random),
    ]
}

fn arb_params() -> impl Strategy<Value = MctsParameters> {
    (
        0.1f64..3.0,
        1usize..12,
        20usize..300,
        proptest::collection::vec(arb_script(), 0..4),
        proptest::option::of(arb_script()),
    )
        .prop_map(|(k, rollout_length, max_fm_calls, scripts, opponent)| {
            MctsParameters::default()
                .with_k(k)
                .with_rollout_length(rollout_length)
                .with_max_fm_calls(max_fm_calls)
                .with_portfolio(Portfolio::new(scripts))
                .with_opponent_model(opponent)
        })
}

/// A standard game after a few random plies, with player 0 to act.
fn arb_position() -> impl Strategy<Value = SkirmishState> {
    (0usize..12, any::<u64>()).prop_map(|(plies, seed)| {
        let mut state = SkirmishState::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..plies {
            let player = state.current_player();
            let actions = Skirmish.generate_actions(&state, player);
            if actions.is_empty() {
                break;
            }
            let index = rand::Rng::gen_range(&mut rng, 0..actions.len());
            state = Skirmish.advance(&state, &actions[index]);
        }
        while state.current_player() != 0 && !Skirmish.is_terminal(&state) {
            state = Skirmish.advance(&state, &Action::EndTurn);
        }
        state
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_search_respects_budget(params in arb_params(), state in arb_position(), seed in any::<u64>()) {
        let fm = CountingSkirmish::default();
        let heuristic = MaterialHeuristic::from_initial_state(&SkirmishState::standard());
        let mut tree = Tree::new(new_node(&fm, state, 0));
        let before = fm.calls();

        let mut budget = Budget::new(params.max_fm_calls);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Search::new(&fm, &params, &heuristic, 0, &mut budget, &mut rng).run(&mut tree);

        prop_assert!(fm.calls() - before <= params.max_fm_calls);
        prop_assert_eq!(fm.calls() - before, budget.consumed());
    }

    #[test]
    fn prop_visit_counts_are_conserved(params in arb_params(), state in arb_position(), seed in any::<u64>()) {
        let heuristic = MaterialHeuristic::from_initial_state(&SkirmishState::standard());
        let mut tree = Tree::new(new_node(&Skirmish, state, 0));
        let mut budget = Budget::new(params.max_fm_calls);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Search::new(&Skirmish, &params, &heuristic, 0, &mut budget, &mut rng).run(&mut tree);

        for id in tree.ids() {
            let node = tree.get(id);
            let child_visits: u32 = node.children.values().map(|c| tree.get(*c).stats.visit_count).sum();
            prop_assert!(node.stats.visit_count >= child_visits);
            let mean = node.stats.mean_value();
            prop_assert!((-1.0..=1.0).contains(&mean));
        }
    }

    #[test]
    fn prop_agent_is_deterministic(params in arb_params(), state in arb_position(), seed in any::<u64>()) {
        prop_assume!(!Skirmish.is_terminal(&state));

        let mut a = MctsAgent::<Skirmish>::new(params.clone());
        let mut b = MctsAgent::<Skirmish>::new(params);
        a.set_seed(seed);
        b.set_seed(seed);

        let first = a.compute_action(state.clone(), &Skirmish, None).unwrap();
        let second = b.compute_action(state, &Skirmish, None).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_agent_plays_legal_actions(params in arb_params(), state in arb_position(), seed in any::<u64>()) {
        prop_assume!(!Skirmish.is_terminal(&state));

        let mut agent = MctsAgent::<Skirmish>::new(params);
        agent.set_seed(seed);
        let chosen = agent.compute_action(state.clone(), &Skirmish, None).unwrap();
        prop_assert!(Skirmish.generate_actions(&state, 0).contains(chosen.action()));
    }
}
