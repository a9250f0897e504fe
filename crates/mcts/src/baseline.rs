//! Baseline agents used as opponents in arena games.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactica_core::{ActionAssignment, Agent, ForwardModel, PlayerId, Result, TacticaError};

use crate::portfolio::ActionScript;

/// Agent that plays one fixed script every decision.
///
/// `ScriptedAgent::random()` gives the uniform random baseline.
#[derive(Clone, Debug)]
pub struct ScriptedAgent {
    name: String,
    script: ActionScript,
    player: PlayerId,
    rng: ChaCha8Rng,
}

impl ScriptedAgent {
    pub fn new(script: ActionScript) -> Self {
        Self {
            name: format!("scripted-{}", script.tag()),
            script,
            player: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn random() -> Self {
        Self::new(ActionScript::Random)
    }

    pub fn script(&self) -> ActionScript {
        self.script
    }
}

impl<F: ForwardModel> Agent<F> for ScriptedAgent {
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

    fn compute_action(
        &mut self,
        state: F::State,
        forward_model: &F,
        _time_budget: Option<Duration>,
    ) -> Result<ActionAssignment> {
        let mut actions = forward_model.generate_actions(&state, self.player);
        let index = self
            .script
            .choose(&state, self.player, &actions, &mut self.rng)
            .ok_or(TacticaError::NoLegalActions { player: self.player })?;
        Ok(ActionAssignment::from_single_action(actions.swap_remove(index)))
    }
}
