//! MCTS agent parameters.
//!
//! These parameters control the search loop, the rollout policy and tree
//! reuse. They are plain data so that tuning code can build them from a
//! point in a search space and configuration files can deserialize them.

use crate::portfolio::{ActionScript, OpponentModel, Portfolio};
use serde::{Deserialize, Serialize};
use tactica_core::ActionCategory;

/// MCTS agent parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsParameters {
    /// UCB exploration constant `K`.
    pub k: f64,

    /// Maximum number of simulated steps after expansion.
    pub rollout_length: usize,

    /// Forward-model calls available to one search.
    pub max_fm_calls: usize,

    /// Keep the subtree of the last played action for the next decision.
    /// When disabled the agent plays the first legal action without searching.
    pub continue_previous_search: bool,

    /// Script assumed for opponents during search; `None` plays them randomly.
    pub opponent_model: OpponentModel,

    /// Scripts sampled for the searching player's rollout steps.
    pub portfolio: Portfolio,

    /// Action categories removed from the search's action space.
    /// Ignored for a state where pruning would leave no action.
    pub pruned_actions: Vec<ActionCategory>,
}

impl Default for MctsParameters {
    fn default() -> Self {
        Self {
            k: std::f64::consts::SQRT_2,
            rollout_length: 10,
            max_fm_calls: 2000,
            continue_previous_search: true,
            opponent_model: None,
            portfolio: Portfolio::default(),
            pruned_actions: Vec::new(),
        }
    }
}

impl MctsParameters {
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_rollout_length(mut self, rollout_length: usize) -> Self {
        self.rollout_length = rollout_length;
        self
    }

    pub fn with_max_fm_calls(mut self, max_fm_calls: usize) -> Self {
        self.max_fm_calls = max_fm_calls;
        self
    }

    pub fn with_opponent_model(mut self, opponent_model: Option<ActionScript>) -> Self {
        self.opponent_model = opponent_model;
        self
    }

    pub fn with_portfolio(mut self, portfolio: Portfolio) -> Self {
        self.portfolio = portfolio;
        self
    }

    pub fn with_continue_previous_search(mut self, enabled: bool) -> Self {
        self.continue_previous_search = enabled;
        self
    }

    pub fn with_pruned_actions(mut self, pruned: Vec<ActionCategory>) -> Self {
        self.pruned_actions = pruned;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = MctsParameters::default();
        assert!((params.k - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert_eq!(params.rollout_length, 10);
        assert_eq!(params.max_fm_calls, 2000);
        assert!(params.continue_previous_search);
        assert_eq!(params.opponent_model, None);
        assert_eq!(params.portfolio.scripts(), &[ActionScript::Random]);
        assert!(params.pruned_actions.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let params = MctsParameters::default()
            .with_k(0.5)
            .with_rollout_length(3)
            .with_max_fm_calls(100)
            .with_opponent_model(Some(ActionScript::AttackWeakest));

        assert_eq!(params.k, 0.5);
        assert_eq!(params.rollout_length, 3);
        assert_eq!(params.max_fm_calls, 100);
        assert_eq!(params.opponent_model, Some(ActionScript::AttackWeakest));
    }

    #[test]
    fn test_serialization_round_trip() {
        let params = MctsParameters::default()
            .with_portfolio(Portfolio::new(vec![ActionScript::RunAway]))
            .with_pruned_actions(vec![ActionCategory::Ability]);
        let json = serde_json::to_string(&params).unwrap();
        let restored: MctsParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, restored);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let params: MctsParameters = serde_json::from_str(r#"{ "k": 2.0 }"#).unwrap();
        assert_eq!(params.k, 2.0);
        assert_eq!(params.max_fm_calls, 2000);
    }
}
