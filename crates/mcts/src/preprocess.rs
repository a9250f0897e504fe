//! Forward-model preprocessing applied before a search.

use tactica_core::{Action, ActionCategory, ForwardModel, PlayerId};

/// Forward model that hides some action categories from the search.
///
/// Pruning never empties an action list: if every legal action falls in a
/// pruned category, the unfiltered list is returned.
#[derive(Clone, Debug)]
pub struct PrunedForwardModel<'a, F> {
    inner: &'a F,
    pruned: &'a [ActionCategory],
}

impl<'a, F: ForwardModel> PrunedForwardModel<'a, F> {
    pub fn new(inner: &'a F, pruned: &'a [ActionCategory]) -> Self {
        Self { inner, pruned }
    }
}

impl<F: ForwardModel> ForwardModel for PrunedForwardModel<'_, F> {
    type State = F::State;

    fn generate_actions(&self, state: &F::State, player: PlayerId) -> Vec<Action> {
        let actions = self.inner.generate_actions(state, player);
        if self.pruned.is_empty() {
            return actions;
        }

        let kept: Vec<Action> = actions
            .iter()
            .filter(|a| !self.pruned.contains(&a.category()))
            .cloned()
            .collect();
        if kept.is_empty() {
            actions
        } else {
            kept
        }
    }

    fn advance(&self, state: &F::State, action: &Action) -> F::State {
        self.inner.advance(state, action)
    }

    fn is_terminal(&self, state: &F::State) -> bool {
        self.inner.is_terminal(state)
    }

    fn winner(&self, state: &F::State) -> Option<PlayerId> {
        self.inner.winner(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Skirmish, SkirmishState, UnitKind};
    use tactica_core::{Position, UnitId};

    fn duel() -> SkirmishState {
        SkirmishState::new(4, 4, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(1, 0))
    }

    #[test]
    fn test_no_pruning_is_identity() {
        let state = duel();
        let pruned = PrunedForwardModel::new(&Skirmish, &[]);
        assert_eq!(pruned.generate_actions(&state, 0), Skirmish.generate_actions(&state, 0));
    }

    #[test]
    fn test_pruning_removes_categories() {
        let state = duel();
        let categories = [ActionCategory::Move];
        let pruned = PrunedForwardModel::new(&Skirmish, &categories);
        let actions = pruned.generate_actions(&state, 0);
        assert_eq!(
            actions,
            vec![Action::Attack { unit: UnitId(0), target: UnitId(1) }, Action::EndTurn]
        );
    }

    #[test]
    fn test_pruning_never_empties() {
        let state = duel();
        let categories = [ActionCategory::Move, ActionCategory::Attack, ActionCategory::EndTurn];
        let pruned = PrunedForwardModel::new(&Skirmish, &categories);
        assert_eq!(pruned.generate_actions(&state, 0).len(), Skirmish.generate_actions(&state, 0).len());
    }
}
