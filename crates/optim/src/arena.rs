//! Self-play engine.
//!
//! An [`Arena`] plays one game per level between agents built by an
//! [`AgentFactory`] and reports `(mean value, win rate)` for player 0.
//! Every game gets its own freshly built agents, so games share no state and
//! [`LocalArena`] can run them in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tactica_core::{Agent, ForwardModel, GameState, PlayerId};
use tracing::debug;

use crate::error::{OptimError, Result};

/// Aggregate outcome of a batch of games, from player 0's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Mean of +1 (win), 0 (draw), -1 (loss).
    pub mean_value: f64,
    /// Fraction of games won.
    pub win_rate: f64,
}

impl Score {
    pub fn to_vec(self) -> Vec<f64> {
        vec![self.mean_value, self.win_rate]
    }

    fn from_outcomes(outcomes: &[GameOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::default();
        }
        let games = outcomes.len() as f64;
        let value: f64 = outcomes.iter().map(GameOutcome::value).sum();
        let wins = outcomes.iter().filter(|o| o.winner == Some(0)).count();
        Self {
            mean_value: value / games,
            win_rate: wins as f64 / games,
        }
    }
}

/// Result of a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub level: usize,
    pub winner: Option<PlayerId>,
    pub steps: usize,
}

impl GameOutcome {
    /// +1 if player 0 won, -1 if somebody else won, 0 for a draw.
    pub fn value(&self) -> f64 {
        match self.winner {
            Some(0) => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

/// Builds a fresh set of agents for one game.
pub trait AgentFactory<F: ForwardModel>: Sync {
    fn create_agents(&self) -> Vec<Box<dyn Agent<F>>>;
}

impl<F, T> AgentFactory<F> for T
where
    F: ForwardModel,
    T: Fn() -> Vec<Box<dyn Agent<F>>> + Sync,
{
    fn create_agents(&self) -> Vec<Box<dyn Agent<F>>> {
        self()
    }
}

/// Self-play engine consumed by evaluators.
pub trait Arena<F: ForwardModel>: Sync {
    /// Number of level definitions available.
    fn num_levels(&self) -> usize;

    /// Play levels `0..num_levels`, seating factory agent `first_agent_index`
    /// as player 0 and `second_agent_index` as player 1.
    fn run_games(
        &self,
        factory: &dyn AgentFactory<F>,
        num_players: usize,
        first_agent_index: usize,
        second_agent_index: usize,
        num_levels: usize,
    ) -> Result<Score>;
}

/// In-process arena over a fixed list of starting states.
pub struct LocalArena<F: ForwardModel> {
    forward_model: F,
    levels: Vec<F::State>,
    seed: u64,
    max_steps: usize,
    parallel: bool,
    time_budget: Option<Duration>,
    games_played: AtomicUsize,
}

impl<F: ForwardModel> LocalArena<F> {
    pub fn new(forward_model: F, levels: Vec<F::State>) -> Self {
        Self {
            forward_model,
            levels,
            seed: 0,
            max_steps: 1000,
            parallel: true,
            time_budget: None,
            games_played: AtomicUsize::new(0),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Maximum number of actions in one game; a capped game without a
    /// winner is a draw.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Wall-clock budget passed to agents for every decision.
    pub fn with_time_budget(mut self, time_budget: Option<Duration>) -> Self {
        self.time_budget = time_budget;
        self
    }

    pub fn forward_model(&self) -> &F {
        &self.forward_model
    }

    pub fn levels(&self) -> &[F::State] {
        &self.levels
    }

    /// Number of games finished by this arena so far.
    pub fn games_played(&self) -> usize {
        self.games_played.load(Ordering::Relaxed)
    }

    /// Play one level with freshly built agents.
    pub fn play_level(
        &self,
        level: usize,
        factory: &dyn AgentFactory<F>,
        first_agent_index: usize,
        second_agent_index: usize,
    ) -> Result<GameOutcome> {
        let initial = self.levels.get(level).ok_or(OptimError::NotEnoughLevels {
            requested: level + 1,
            available: self.levels.len(),
        })?;

        let mut pool: Vec<Option<Box<dyn Agent<F>>>> = factory.create_agents().into_iter().map(Some).collect();
        let available = pool.len();
        let mut seats = Vec::with_capacity(2);
        for index in [first_agent_index, second_agent_index] {
            let agent = pool
                .get_mut(index)
                .and_then(Option::take)
                .ok_or(OptimError::MissingAgent { index, available })?;
            seats.push(agent);
        }

        let mut seeds = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(level as u64 * 1000));
        for (player, agent) in seats.iter_mut().enumerate() {
            agent.set_player_id(player);
            agent.set_seed(seeds.gen());
            agent.init(initial, &self.forward_model, self.time_budget);
        }

        let mut state = initial.clone();
        let mut steps = 0;
        while !self.forward_model.is_terminal(&state) && steps < self.max_steps {
            let player = state.current_player();
            let available = seats.len();
            let agent = seats.get_mut(player).ok_or(OptimError::MissingAgent {
                index: player,
                available,
            })?;

            let legal = self.forward_model.generate_actions(&state, player);
            let assignment = agent.compute_action(state.clone(), &self.forward_model, self.time_budget)?;
            if !legal.contains(assignment.action()) {
                return Err(OptimError::IllegalAction {
                    level,
                    player,
                    action: assignment.action().to_string(),
                });
            }

            state = self.forward_model.advance(&state, assignment.action());
            steps += 1;
        }

        let winner = self.forward_model.winner(&state);
        self.games_played.fetch_add(1, Ordering::Relaxed);
        debug!(
            level,
            steps,
            ?winner,
            player0 = seats[0].name(),
            player1 = seats[1].name(),
            "game finished"
        );
        Ok(GameOutcome { level, winner, steps })
    }
}

impl<F: ForwardModel> Arena<F> for LocalArena<F> {
    fn num_levels(&self) -> usize {
        self.levels.len()
    }

    fn run_games(
        &self,
        factory: &dyn AgentFactory<F>,
        num_players: usize,
        first_agent_index: usize,
        second_agent_index: usize,
        num_levels: usize,
    ) -> Result<Score> {
        if num_levels == 0 || self.levels.is_empty() {
            return Err(OptimError::NoLevels);
        }
        if num_levels > self.levels.len() {
            return Err(OptimError::NotEnoughLevels {
                requested: num_levels,
                available: self.levels.len(),
            });
        }
        let expected = self.levels[0].num_players();
        if num_players != expected || num_players != 2 {
            return Err(OptimError::PlayerCountMismatch {
                expected,
                requested: num_players,
            });
        }

        let play = |level| self.play_level(level, factory, first_agent_index, second_agent_index);
        let outcomes: Vec<GameOutcome> = if self.parallel {
            (0..num_levels).into_par_iter().map(play).collect::<Result<_>>()?
        } else {
            (0..num_levels).map(play).collect::<Result<_>>()?
        };

        Ok(Score::from_outcomes(&outcomes))
    }
}
