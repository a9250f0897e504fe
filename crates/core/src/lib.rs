//! Tactica Core - Game and agent abstractions
//!
//! This crate provides the traits that connect rules engines, search agents
//! and game runners.
//!
//! # Types
//!
//! - [`ForwardModel`] - Rules engine: legal actions, state advance, terminality
//! - [`GameState`] - Value-semantics snapshot of a game
//! - [`Agent`] - Per-seat controller that turns a state into an action
//! - [`StateHeuristic`] - Pluggable state scoring
//! - [`Action`] / [`ActionAssignment`] - Units of play

mod agent;
mod error;
mod game;
mod heuristic;
mod types;

pub use agent::Agent;
pub use error::{Result, TacticaError};
pub use game::{ForwardModel, GameState};
pub use heuristic::StateHeuristic;
pub use types::{Action, ActionAssignment, ActionCategory, PlayerId, Position, Unit, UnitId};
