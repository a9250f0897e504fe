//! Reference game implementations for search validation.
//!
//! These games are used to exercise the agent and the tuning loop
//! end to end without an external rules engine.

pub mod skirmish;

pub use skirmish::{Skirmish, SkirmishState, Soldier, UnitKind};
