use tactica_core::{PlayerId, TacticaError};
use thiserror::Error;

/// Errors that can occur while evaluating points of a search space
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimError {
    #[error("point has {actual} coordinates, search space has {expected} dimensions")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("coordinate {dimension} is {value}, dimension size is {size}")]
    PointOutOfRange { dimension: usize, value: usize, size: usize },

    #[error("search space has no points")]
    EmptySearchSpace,

    #[error("no levels defined")]
    NoLevels,

    #[error("{requested} levels requested, only {available} defined")]
    NotEnoughLevels { requested: usize, available: usize },

    #[error("game needs {expected} players, {requested} requested")]
    PlayerCountMismatch { expected: usize, requested: usize },

    #[error("agent index {index} not available, factory built {available} agents")]
    MissingAgent { index: usize, available: usize },

    #[error("level {level}: player {player} submitted an illegal action: {action}")]
    IllegalAction { level: usize, player: PlayerId, action: String },

    #[error(transparent)]
    Game(#[from] TacticaError),
}

/// Convenience Result type for optimization operations
pub type Result<T> = std::result::Result<T, OptimError>;
