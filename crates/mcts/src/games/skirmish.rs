//! Skirmish: a small two-player grid tactics game for search validation.
//!
//! Each player commands a handful of units. On their turn a player may give
//! every unit one order (move, attack or ability) and then ends the turn
//! explicitly. A player with no units left loses; reaching the turn limit is
//! a draw.
//!
//! ```text
//! W . . . . .      uppercase: player 0
//! A . . . . h      lowercase: player 1
//! H . . . . a
//! . . . . . w
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tactica_core::{Action, ForwardModel, GameState, PlayerId, Position, Unit, UnitId};

/// Unit archetypes with fixed statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Warrior,
    Archer,
    Healer,
}

impl UnitKind {
    pub fn max_health(self) -> i32 {
        match self {
            UnitKind::Warrior => 10,
            UnitKind::Archer => 6,
            UnitKind::Healer => 6,
        }
    }

    pub fn attack_damage(self) -> i32 {
        match self {
            UnitKind::Warrior => 3,
            UnitKind::Archer => 2,
            UnitKind::Healer => 1,
        }
    }

    pub fn attack_range(self) -> u32 {
        match self {
            UnitKind::Archer => 3,
            UnitKind::Warrior | UnitKind::Healer => 1,
        }
    }

    /// Healing amount of the special ability, if the kind has one.
    pub fn heal_amount(self) -> Option<i32> {
        match self {
            UnitKind::Healer => Some(3),
            UnitKind::Warrior | UnitKind::Archer => None,
        }
    }

    pub fn ability_range(self) -> u32 {
        2
    }

    fn symbol(self) -> char {
        match self {
            UnitKind::Warrior => 'W',
            UnitKind::Archer => 'A',
            UnitKind::Healer => 'H',
        }
    }
}

/// A unit on the board together with its per-turn bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Soldier {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub position: Position,
    pub health: i32,
    pub has_acted: bool,
}

impl Soldier {
    fn view(&self) -> Unit {
        Unit {
            id: self.id,
            owner: self.owner,
            position: self.position,
            health: self.health,
            max_health: self.kind.max_health(),
        }
    }
}

/// Skirmish board state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SkirmishState {
    width: i32,
    height: i32,
    soldiers: Vec<Soldier>,
    current: PlayerId,
    turn: u32,
    max_turns: u32,
    next_id: u32,
}

impl SkirmishState {
    /// Empty board with player 0 to move.
    pub fn new(width: i32, height: i32, max_turns: u32) -> Self {
        Self {
            width,
            height,
            soldiers: Vec::new(),
            current: 0,
            turn: 0,
            max_turns,
            next_id: 0,
        }
    }

    /// Place a full-health unit. Placements outside the board or on an
    /// occupied cell are ignored.
    pub fn with_unit(mut self, owner: PlayerId, kind: UnitKind, position: Position) -> Self {
        if self.in_bounds(position) && self.soldier_at(position).is_none() {
            self.soldiers.push(Soldier {
                id: UnitId(self.next_id),
                owner,
                kind,
                position,
                health: kind.max_health(),
                has_acted: false,
            });
            self.next_id += 1;
        }
        self
    }

    /// Symmetric 6x6 opening with a warrior, an archer and a healer per side.
    pub fn standard() -> Self {
        Self::new(6, 6, 30)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 2))
            .with_unit(0, UnitKind::Archer, Position::new(0, 3))
            .with_unit(0, UnitKind::Healer, Position::new(0, 4))
            .with_unit(1, UnitKind::Warrior, Position::new(5, 3))
            .with_unit(1, UnitKind::Archer, Position::new(5, 2))
            .with_unit(1, UnitKind::Healer, Position::new(5, 1))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    pub fn soldier(&self, id: UnitId) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.id == id)
    }

    pub fn soldier_at(&self, position: Position) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.position == position)
    }

    fn in_bounds(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index_of(&self, id: UnitId) -> Option<usize> {
        self.soldiers.iter().position(|s| s.id == id)
    }

    /// Number of distinct players that still have units.
    fn players_alive(&self) -> Vec<PlayerId> {
        let mut alive: Vec<PlayerId> = self.soldiers.iter().map(|s| s.owner).collect();
        alive.sort_unstable();
        alive.dedup();
        alive
    }

    fn end_turn(&mut self) {
        for soldier in &mut self.soldiers {
            soldier.has_acted = false;
        }
        self.current = (self.current + 1) % GameState::num_players(self);
        if self.current == 0 {
            self.turn += 1;
        }
    }
}

impl GameState for SkirmishState {
    fn current_player(&self) -> PlayerId {
        self.current
    }

    fn num_players(&self) -> usize {
        2
    }

    fn units(&self) -> Vec<Unit> {
        self.soldiers.iter().map(Soldier::view).collect()
    }
}

impl fmt::Display for SkirmishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "turn {}/{}, player {} to move", self.turn, self.max_turns, self.current)?;
        for y in 0..self.height {
            for x in 0..self.width {
                if x > 0 {
                    write!(f, " ")?;
                }
                match self.soldier_at(Position::new(x, y)) {
                    Some(s) if s.owner == 0 => write!(f, "{}", s.kind.symbol())?,
                    Some(s) => write!(f, "{}", s.kind.symbol().to_ascii_lowercase())?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Skirmish rules engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Skirmish;

impl ForwardModel for Skirmish {
    type State = SkirmishState;

    fn generate_actions(&self, state: &SkirmishState, player: PlayerId) -> Vec<Action> {
        if player != state.current || self.is_terminal(state) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        for soldier in state.soldiers.iter().filter(|s| s.owner == player && !s.has_acted) {
            for to in soldier.position.neighbours() {
                if state.in_bounds(to) && state.soldier_at(to).is_none() {
                    actions.push(Action::Move { unit: soldier.id, to });
                }
            }

            for enemy in state.soldiers.iter().filter(|s| s.owner != player) {
                if soldier.position.distance(enemy.position) <= soldier.kind.attack_range() {
                    actions.push(Action::Attack {
                        unit: soldier.id,
                        target: enemy.id,
                    });
                }
            }

            if soldier.kind.heal_amount().is_some() {
                for ally in state.soldiers.iter().filter(|s| s.owner == player && s.id != soldier.id) {
                    if ally.health < ally.kind.max_health()
                        && soldier.position.distance(ally.position) <= soldier.kind.ability_range()
                    {
                        actions.push(Action::Ability {
                            unit: soldier.id,
                            target: ally.id,
                        });
                    }
                }
            }
        }
        actions.push(Action::EndTurn);
        actions
    }

    fn advance(&self, state: &SkirmishState, action: &Action) -> SkirmishState {
        let mut next = state.clone();
        match *action {
            Action::Move { unit, to } => {
                if let Some(i) = next.index_of(unit) {
                    next.soldiers[i].position = to;
                    next.soldiers[i].has_acted = true;
                }
            }
            Action::Attack { unit, target } => {
                if let (Some(i), Some(t)) = (next.index_of(unit), next.index_of(target)) {
                    next.soldiers[t].health -= next.soldiers[i].kind.attack_damage();
                    next.soldiers[i].has_acted = true;
                    if next.soldiers[t].health <= 0 {
                        next.soldiers.remove(t);
                    }
                }
            }
            Action::Ability { unit, target } => {
                if let (Some(i), Some(t)) = (next.index_of(unit), next.index_of(target)) {
                    let heal = next.soldiers[i].kind.heal_amount().unwrap_or(0);
                    let max = next.soldiers[t].kind.max_health();
                    next.soldiers[t].health = (next.soldiers[t].health + heal).min(max);
                    next.soldiers[i].has_acted = true;
                }
            }
            Action::EndTurn => next.end_turn(),
        }
        next
    }

    fn is_terminal(&self, state: &SkirmishState) -> bool {
        state.players_alive().len() <= 1 || state.turn >= state.max_turns
    }

    fn winner(&self, state: &SkirmishState) -> Option<PlayerId> {
        match state.players_alive().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}
