//! Portfolio-guided Monte Carlo Tree Search for turn-based strategy games.
//!
//! This crate provides an MCTS agent that works with any rules engine
//! implementing `tactica_core::ForwardModel`.
//!
//! # Features
//!
//! - **Generic**: Works with any `ForwardModel` implementation
//! - **UCB Selection**: Mean value plus a `K`-weighted exploration term
//! - **Scripted Rollouts**: Rollout steps sampled from a [`Portfolio`] of scripts
//! - **Opponent Modelling**: Opponents simulated with a fixed script or randomly
//! - **Tree Reuse**: The subtree below the played action survives until the turn ends
//! - **Strict Budget**: Every forward-model advance is counted against `max_fm_calls`
//!
//! # Example
//!
//! ```
//! use tactica_core::{Agent, ForwardModel};
//! use tactica_mcts::{games::{Skirmish, SkirmishState}, ActionScript, MctsAgent, MctsParameters, Portfolio};
//!
//! let state = SkirmishState::standard();
//! let params = MctsParameters::default()
//!     .with_max_fm_calls(200)
//!     .with_portfolio(Portfolio::new(vec![ActionScript::AttackClosest, ActionScript::Random]));
//!
//! let mut agent = MctsAgent::<Skirmish>::new(params);
//! agent.set_seed(42);
//! let chosen = agent.compute_action(state.clone(), &Skirmish, None).expect("player 0 can act");
//! assert!(Skirmish.generate_actions(&state, 0).contains(chosen.action()));
//! println!("Chosen: {}", chosen.action());
//! ```

pub mod agent;
pub mod baseline;
pub mod budget;
pub mod config;
pub mod games;
pub mod heuristic;
mod node;
pub mod portfolio;
pub mod preprocess;
pub mod search;
mod tree;

pub use agent::MctsAgent;
pub use baseline::ScriptedAgent;
pub use budget::Budget;
pub use config::MctsParameters;
pub use heuristic::MaterialHeuristic;
pub use node::{Node, NodeId, NodeStats};
pub use portfolio::{ActionScript, OpponentModel, Portfolio, PortfolioFlags};
pub use preprocess::PrunedForwardModel;
pub use search::Search;
pub use tree::Tree;
