//! Domain types shared by forward models, scripts and agents.
//!
//! Actions are a closed set of unit orders plus an explicit end-of-turn
//! marker. Scripts reason about them through the [`Unit`] view exposed by
//! every [`GameState`](crate::GameState).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a player (seat) in a game.
pub type PlayerId = usize;

/// Stable identifier of a unit within one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell on a rectangular grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two cells.
    pub fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours, in a fixed order.
    pub fn neighbours(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x - 1, self.y),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Read-only view of a unit, as seen by scripts and heuristics.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Coarse classification of actions, used for pruning and scripting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Move,
    Attack,
    Ability,
    EndTurn,
}

/// A unit of legal play.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move `unit` to an adjacent free cell.
    Move { unit: UnitId, to: Position },
    /// `unit` attacks the enemy `target`.
    Attack { unit: UnitId, target: UnitId },
    /// `unit` uses its special ability on `target`.
    Ability { unit: UnitId, target: UnitId },
    /// Hand control to the next player.
    EndTurn,
}

impl Action {
    /// Whether playing this action ends the acting player's turn.
    pub fn ends_turn(&self) -> bool {
        matches!(self, Action::EndTurn)
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            Action::Move { .. } => ActionCategory::Move,
            Action::Attack { .. } => ActionCategory::Attack,
            Action::Ability { .. } => ActionCategory::Ability,
            Action::EndTurn => ActionCategory::EndTurn,
        }
    }

    /// The unit performing the action, if any.
    pub fn source(&self) -> Option<UnitId> {
        match self {
            Action::Move { unit, .. } | Action::Attack { unit, .. } | Action::Ability { unit, .. } => {
                Some(*unit)
            }
            Action::EndTurn => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { unit, to } => write!(f, "move {unit} to {to}"),
            Action::Attack { unit, target } => write!(f, "{unit} attacks {target}"),
            Action::Ability { unit, target } => write!(f, "{unit} uses ability on {target}"),
            Action::EndTurn => write!(f, "end turn"),
        }
    }
}

/// The output of an agent for one decision point: exactly one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionAssignment {
    action: Action,
}

impl ActionAssignment {
    pub fn from_single_action(action: Action) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn into_action(self) -> Action {
        self.action
    }
}
