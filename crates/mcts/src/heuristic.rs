//! Default state heuristic.
//!
//! Scores a state by the health balance between a player and its enemies,
//! normalized by the total health on the board at the start of the game.

use tactica_core::{GameState, PlayerId, StateHeuristic};

/// Health-balance heuristic.
///
/// - 1.0 when every enemy unit is gone and the player still has units
/// - -1.0 when the player has no units left
/// - otherwise `(own health - enemy health) / initial total health`, clamped
#[derive(Clone, Debug)]
pub struct MaterialHeuristic {
    initial_total_health: f64,
}

impl MaterialHeuristic {
    /// Build the heuristic from the opening state of a game.
    pub fn from_initial_state<S: GameState>(state: &S) -> Self {
        let total: i32 = state.units().iter().map(|u| u.health.max(0)).sum();
        Self {
            initial_total_health: f64::from(total.max(1)),
        }
    }
}

impl<S: GameState> StateHeuristic<S> for MaterialHeuristic {
    fn evaluate(&self, state: &S, player: PlayerId) -> f64 {
        let mut own = 0i64;
        let mut own_units = 0usize;
        let mut enemy = 0i64;
        let mut enemy_units = 0usize;
        for unit in state.units() {
            if unit.owner == player {
                own += i64::from(unit.health.max(0));
                own_units += 1;
            } else {
                enemy += i64::from(unit.health.max(0));
                enemy_units += 1;
            }
        }

        if own_units == 0 {
            return -1.0;
        }
        if enemy_units == 0 {
            return 1.0;
        }
        ((own - enemy) as f64 / self.initial_total_health).clamp(-1.0, 1.0)
    }
}
