use std::time::Duration;

use crate::{ActionAssignment, ForwardModel, PlayerId, Result};

/// A per-seat controller driven by the game runner.
///
/// Agents are stateful across the turns of one game and must not share state
/// with other agents; the runner builds a fresh set for every game.
pub trait Agent<F: ForwardModel>: Send {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    fn player_id(&self) -> PlayerId;

    fn set_player_id(&mut self, player: PlayerId);

    /// Reseeds the agent's private random generator.
    fn set_seed(&mut self, seed: u64);

    /// One-time setup before the first decision of a game.
    fn init(&mut self, _initial_state: &F::State, _forward_model: &F, _time_budget: Option<Duration>) {}

    /// Chooses the next action for this agent's player.
    fn compute_action(
        &mut self,
        state: F::State,
        forward_model: &F,
        time_budget: Option<Duration>,
    ) -> Result<ActionAssignment>;
}
