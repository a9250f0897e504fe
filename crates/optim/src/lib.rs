//! Tactica Optim - Hyperparameter tuning through self-play
//!
//! This crate turns points of a discrete search space into configured MCTS
//! agents and scores them by playing games against baseline agents.
//!
//! # Types
//!
//! - [`SearchSpace`] - Ordered dimension sizes; a point is one index per dimension
//! - [`Evaluator`] - Scores a point; [`ActionAbstractingMctsEvaluator`] tunes the MCTS agent
//! - [`Arena`] - Self-play engine; [`LocalArena`] runs games in-process with rayon
//! - [`AgentFactory`] - Builds a fresh set of agents for every game
//! - [`RandomSearch`] - Samples, evaluates and ranks points

pub mod arena;
pub mod error;
pub mod evaluator;
pub mod optimizer;
pub mod search_space;

pub use arena::{AgentFactory, Arena, GameOutcome, LocalArena, Score};
pub use error::{OptimError, Result};
pub use evaluator::{ActionAbstractingMctsEvaluator, Evaluator, MctsValueTables};
pub use optimizer::{RandomSearch, Trial};
pub use search_space::SearchSpace;
