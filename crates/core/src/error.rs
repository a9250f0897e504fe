use thiserror::Error;

use crate::PlayerId;

/// Errors raised while driving a game through its forward model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TacticaError {
    #[error("no legal actions available for player {player}")]
    NoLegalActions { player: PlayerId },
}

/// Convenience Result type for Tactica operations
pub type Result<T> = std::result::Result<T, TacticaError>;
