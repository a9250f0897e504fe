use crate::PlayerId;

/// Scores a state from the point of view of one player.
///
/// Values are expected in `[-1, 1]`, higher meaning better for `player`.
pub trait StateHeuristic<S>: Send + Sync {
    fn evaluate(&self, state: &S, player: PlayerId) -> f64;
}

impl<S, F> StateHeuristic<S> for F
where
    F: Fn(&S, PlayerId) -> f64 + Send + Sync,
{
    fn evaluate(&self, state: &S, player: PlayerId) -> f64 {
        self(state, player)
    }
}
