use crate::{Action, PlayerId, Unit};

/// A snapshot of the world at one point in time.
///
/// States have value semantics: agents receive clones and may advance them
/// freely without touching the authoritative state held by the game runner.
pub trait GameState: Clone + Send + Sync {
    /// The player whose turn it is.
    fn current_player(&self) -> PlayerId;

    /// Number of seats in the game.
    fn num_players(&self) -> usize;

    /// All units still on the board.
    fn units(&self) -> Vec<Unit>;
}

/// The rules engine used by search and by the game runner.
///
/// A forward model enumerates legal actions for a player and advances a
/// state by an action. It never mutates its input state.
pub trait ForwardModel: Clone + Send + Sync {
    /// The game state this model operates on
    type State: GameState;

    /// Returns all legal actions for `player` in `state`.
    ///
    /// Players that are not allowed to act in `state` get an empty list.
    fn generate_actions(&self, state: &Self::State, player: PlayerId) -> Vec<Action>;

    /// Applies an action, returning the resulting state (immutable operation)
    fn advance(&self, state: &Self::State, action: &Action) -> Self::State;

    /// Returns true if the game has ended
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// The winning player of a finished game, `None` for draws and running games.
    fn winner(&self, state: &Self::State) -> Option<PlayerId>;
}
