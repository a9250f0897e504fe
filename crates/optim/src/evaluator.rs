//! Evaluators map a search-space point to a configured agent and score it.

use serde::{Deserialize, Serialize};
use tactica_core::{Agent, ForwardModel};
use tactica_mcts::{ActionScript, MctsAgent, MctsParameters, Portfolio, PortfolioFlags};
use tracing::{debug, info};

use crate::{
    arena::{AgentFactory, Arena, Score},
    error::Result,
    search_space::SearchSpace,
};

/// Scores points of a discrete search space.
pub trait Evaluator {
    fn name(&self) -> &str;

    fn search_space(&self) -> &SearchSpace;

    /// Score `point`; `n_samples` is a hint an evaluator may override.
    fn evaluate(&self, point: &[usize], n_samples: usize) -> Result<Score>;

    /// Human-readable description of `point`.
    fn print_point(&self, point: &[usize]) -> Result<String>;
}

/// Candidate values for each dimension of the MCTS search space.
///
/// The search space has one dimension per table, in field order; a point
/// picks one entry from each.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsValueTables {
    pub k_values: Vec<f64>,
    pub rollout_lengths: Vec<usize>,
    /// Size of the opponent-model dimension. The point's index selects the
    /// model: 0 attack-closest, 1 attack-weakest, 2 random, anything else none.
    pub opponent_model_count: usize,
    pub attack_closest: Vec<bool>,
    pub attack_weakest: Vec<bool>,
    pub run_away: Vec<bool>,
    pub run_to_friends: Vec<bool>,
    pub use_special_ability: Vec<bool>,
    pub random: Vec<bool>,
}

impl Default for MctsValueTables {
    fn default() -> Self {
        Self {
            k_values: vec![0.1, 1.0, 10.0],
            rollout_lengths: vec![3, 10],
            opponent_model_count: 3,
            attack_closest: vec![false, true],
            attack_weakest: vec![false, true],
            run_away: vec![false, true],
            run_to_friends: vec![false, true],
            use_special_ability: vec![false, true],
            random: vec![false, true],
        }
    }
}

impl MctsValueTables {
    pub fn search_space(&self) -> SearchSpace {
        SearchSpace::new(vec![
            self.k_values.len(),
            self.rollout_lengths.len(),
            self.opponent_model_count,
            self.attack_closest.len(),
            self.attack_weakest.len(),
            self.run_away.len(),
            self.run_to_friends.len(),
            self.use_special_ability.len(),
            self.random.len(),
        ])
    }

    /// Scripts enabled by a validated point.
    fn flags(&self, point: &[usize]) -> PortfolioFlags {
        PortfolioFlags {
            attack_closest: self.attack_closest[point[3]],
            attack_weakest: self.attack_weakest[point[4]],
            run_away: self.run_away[point[5]],
            run_to_friends: self.run_to_friends[point[6]],
            use_special_ability: self.use_special_ability[point[7]],
            random: self.random[point[8]],
        }
    }
}

/// Tunes the MCTS agent's exploration constant, rollout length, opponent
/// model and rollout portfolio.
///
/// Each evaluation plays one game per arena level: a fresh [`MctsAgent`]
/// built from the point takes seat 0, the baseline agents fill the rest.
pub struct ActionAbstractingMctsEvaluator<F: ForwardModel, A> {
    name: String,
    values: MctsValueTables,
    space: SearchSpace,
    template: MctsParameters,
    baseline: Box<dyn AgentFactory<F>>,
    arena: A,
}

impl<F, A> ActionAbstractingMctsEvaluator<F, A>
where
    F: ForwardModel + 'static,
    A: Arena<F>,
{
    /// `template` provides every parameter the point does not set, such as
    /// the forward-model budget.
    pub fn new(
        values: MctsValueTables,
        template: MctsParameters,
        baseline: impl AgentFactory<F> + 'static,
        arena: A,
    ) -> Self {
        let space = values.search_space();
        info!(size = space.size(), dims = ?space.dims(), "search space ready");
        Self {
            name: "ActionAbstractingMctsEvaluator".to_string(),
            values,
            space,
            template,
            baseline: Box::new(baseline),
            arena,
        }
    }

    pub fn arena(&self) -> &A {
        &self.arena
    }

    pub fn values(&self) -> &MctsValueTables {
        &self.values
    }

    /// Agent parameters encoded by `point`.
    pub fn parameters_for(&self, point: &[usize]) -> Result<MctsParameters> {
        self.space.validate(point)?;
        Ok(self
            .template
            .clone()
            .with_k(self.values.k_values[point[0]])
            .with_rollout_length(self.values.rollout_lengths[point[1]])
            .with_opponent_model(ActionScript::opponent_model(point[2]))
            .with_portfolio(Portfolio::from_flags(self.values.flags(point))))
    }
}

impl<F, A> Evaluator for ActionAbstractingMctsEvaluator<F, A>
where
    F: ForwardModel + 'static,
    A: Arena<F>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn search_space(&self) -> &SearchSpace {
        &self.space
    }

    fn evaluate(&self, point: &[usize], n_samples: usize) -> Result<Score> {
        let params = self.parameters_for(point)?;
        let levels = self.arena.num_levels();
        if n_samples != levels {
            debug!(requested = n_samples, levels, "one game per level, sample count overridden");
        }

        let baseline = &self.baseline;
        let factory = move || -> Vec<Box<dyn Agent<F>>> {
            let mut agents = baseline.create_agents();
            let candidate: Box<dyn Agent<F>> = Box::new(MctsAgent::<F>::new(params.clone()));
            match agents.first_mut() {
                Some(seat) => *seat = candidate,
                None => agents.push(candidate),
            }
            agents
        };

        let score = self.arena.run_games(&factory, 2, 0, 1, levels)?;
        info!(
            point = %self.print_point(point)?,
            mean_value = score.mean_value,
            win_rate = score.win_rate,
            "point evaluated"
        );
        Ok(score)
    }

    fn print_point(&self, point: &[usize]) -> Result<String> {
        self.space.validate(point)?;
        let scripts: String = self
            .values
            .flags(point)
            .enabled()
            .map(|script| format!("{} ", script.tag()))
            .collect();
        Ok(format!(
            "K={:.6}, RL={}, OS={}, Scripts={{{}}}",
            self.values.k_values[point[0]], self.values.rollout_lengths[point[1]], point[2], scripts
        ))
    }
}
