//! Scripted action policies used to bias rollouts.
//!
//! A script looks at the state and the legal action list of one player and
//! picks one action. The [`Portfolio`] is the ordered set of scripts the
//! searching player samples from during rollouts; an [`OpponentModel`] is the
//! single script assumed for everybody else.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tactica_core::{Action, GameState, PlayerId, Position, Unit, UnitId};

/// Stateless scripted policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionScript {
    /// Attack the closest enemy in range, otherwise approach the closest enemy.
    AttackClosest,
    /// Attack the weakest enemy in range, otherwise approach the weakest enemy.
    AttackWeakest,
    /// Move away from the nearest threat.
    RunAway,
    /// Move towards the nearest friendly unit.
    RunToFriends,
    /// Use a special ability when one is available.
    UseSpecialAbility,
    /// Uniformly random legal action.
    Random,
}

/// Script assumed for non-searching players; `None` means uniform random.
pub type OpponentModel = Option<ActionScript>;

impl ActionScript {
    /// Opponent model for a tuning index: 0 attack-closest, 1 attack-weakest,
    /// 2 random, anything else none.
    pub fn opponent_model(index: usize) -> OpponentModel {
        match index {
            0 => Some(ActionScript::AttackClosest),
            1 => Some(ActionScript::AttackWeakest),
            2 => Some(ActionScript::Random),
            _ => None,
        }
    }

    /// Short tag used when rendering configurations.
    pub fn tag(self) -> &'static str {
        match self {
            ActionScript::AttackClosest => "AC",
            ActionScript::AttackWeakest => "AW",
            ActionScript::RunAway => "RA",
            ActionScript::RunToFriends => "RF",
            ActionScript::UseSpecialAbility => "SA",
            ActionScript::Random => "RND",
        }
    }

    /// Pick the index of one action from `actions`.
    ///
    /// Returns `None` only when `actions` is empty.
    pub fn choose<S: GameState, R: Rng>(
        self,
        state: &S,
        player: PlayerId,
        actions: &[Action],
        rng: &mut R,
    ) -> Option<usize> {
        if actions.is_empty() {
            return None;
        }

        let units = state.units();
        let picked = match self {
            ActionScript::Random => None,
            ActionScript::AttackClosest => attack_closest(&units, player, actions),
            ActionScript::AttackWeakest => attack_weakest(&units, player, actions),
            ActionScript::RunAway => run_away(&units, player, actions),
            ActionScript::RunToFriends => run_to_friends(&units, player, actions),
            ActionScript::UseSpecialAbility => {
                let abilities: Vec<usize> = indices_where(actions, |a| matches!(a, Action::Ability { .. }));
                if abilities.is_empty() {
                    None
                } else {
                    Some(abilities[rng.gen_range(0..abilities.len())])
                }
            }
        };

        picked.or_else(|| Some(rng.gen_range(0..actions.len())))
    }
}

impl fmt::Display for ActionScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn indices_where(actions: &[Action], pred: impl Fn(&Action) -> bool) -> Vec<usize> {
    actions
        .iter()
        .enumerate()
        .filter(|(_, a)| pred(a))
        .map(|(i, _)| i)
        .collect()
}

fn end_turn(actions: &[Action]) -> Option<usize> {
    actions.iter().position(Action::ends_turn)
}

fn find_unit(units: &[Unit], id: UnitId) -> Option<&Unit> {
    units.iter().find(|u| u.id == id)
}

fn nearest_distance<'a>(from: Position, others: impl Iterator<Item = &'a Unit>) -> Option<u32> {
    others.map(|u| from.distance(u.position)).min()
}

/// Index of the move minimising `score`, first one on ties.
fn best_move(actions: &[Action], mut score: impl FnMut(UnitId, Position) -> Option<i64>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, action) in actions.iter().enumerate() {
        if let Action::Move { unit, to } = action {
            if let Some(s) = score(*unit, *to) {
                if best.map_or(true, |(_, b)| s < b) {
                    best = Some((i, s));
                }
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the attack minimising `score`, first one on ties.
fn best_attack(actions: &[Action], units: &[Unit], score: impl Fn(&Unit, &Unit) -> i64) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, action) in actions.iter().enumerate() {
        if let Action::Attack { unit, target } = action {
            if let (Some(attacker), Some(victim)) = (find_unit(units, *unit), find_unit(units, *target)) {
                let s = score(attacker, victim);
                if best.map_or(true, |(_, b)| s < b) {
                    best = Some((i, s));
                }
            }
        }
    }
    best.map(|(i, _)| i)
}

fn attack_closest(units: &[Unit], player: PlayerId, actions: &[Action]) -> Option<usize> {
    best_attack(actions, units, |attacker, victim| {
        attacker.position.distance(victim.position) as i64
    })
    .or_else(|| {
        best_move(actions, |_, to| {
            nearest_distance(to, units.iter().filter(|u| u.owner != player)).map(i64::from)
        })
    })
    .or_else(|| end_turn(actions))
}

fn attack_weakest(units: &[Unit], player: PlayerId, actions: &[Action]) -> Option<usize> {
    best_attack(actions, units, |attacker, victim| {
        // Weakest first, closer target on equal health
        i64::from(victim.health) * 1_000 + attacker.position.distance(victim.position) as i64
    })
    .or_else(|| {
        let weakest = units
            .iter()
            .filter(|u| u.owner != player)
            .min_by_key(|u| (u.health, u.id))?;
        best_move(actions, |_, to| Some(to.distance(weakest.position) as i64))
    })
    .or_else(|| end_turn(actions))
}

fn run_away(units: &[Unit], player: PlayerId, actions: &[Action]) -> Option<usize> {
    best_move(actions, |_, to| {
        nearest_distance(to, units.iter().filter(|u| u.owner != player)).map(|d| -i64::from(d))
    })
    .or_else(|| end_turn(actions))
}

fn run_to_friends(units: &[Unit], player: PlayerId, actions: &[Action]) -> Option<usize> {
    best_move(actions, |mover, to| {
        nearest_distance(to, units.iter().filter(|u| u.owner == player && u.id != mover)).map(i64::from)
    })
    .or_else(|| end_turn(actions))
}

/// Which scripts a portfolio should contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioFlags {
    pub attack_closest: bool,
    pub attack_weakest: bool,
    pub run_away: bool,
    pub run_to_friends: bool,
    pub use_special_ability: bool,
    pub random: bool,
}

impl PortfolioFlags {
    /// Enabled scripts in canonical order: AC AW RA RF SA RND.
    pub fn enabled(self) -> impl Iterator<Item = ActionScript> {
        [
            (self.attack_closest, ActionScript::AttackClosest),
            (self.attack_weakest, ActionScript::AttackWeakest),
            (self.run_away, ActionScript::RunAway),
            (self.run_to_friends, ActionScript::RunToFriends),
            (self.use_special_ability, ActionScript::UseSpecialAbility),
            (self.random, ActionScript::Random),
        ]
        .into_iter()
        .filter_map(|(on, script)| on.then_some(script))
    }
}

/// Ordered, non-empty set of scripts used for the searching player's rollouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ActionScript>", into = "Vec<ActionScript>")]
pub struct Portfolio {
    scripts: Vec<ActionScript>,
}

impl Portfolio {
    /// Build a portfolio; an empty list becomes `[Random]`.
    pub fn new(scripts: Vec<ActionScript>) -> Self {
        if scripts.is_empty() {
            Self {
                scripts: vec![ActionScript::Random],
            }
        } else {
            Self { scripts }
        }
    }

    /// Build a portfolio from inclusion flags in canonical order.
    ///
    /// Random is appended when requested or when no other script is enabled.
    pub fn from_flags(flags: PortfolioFlags) -> Self {
        Self::new(flags.enabled().collect())
    }

    pub fn scripts(&self) -> &[ActionScript] {
        &self.scripts
    }

    /// Always false: portfolios hold at least one script.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Pick the script for the next rollout step.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ActionScript {
        match self.scripts.as_slice() {
            [only] => *only,
            scripts => scripts[rng.gen_range(0..scripts.len())],
        }
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<ActionScript>> for Portfolio {
    fn from(scripts: Vec<ActionScript>) -> Self {
        Self::new(scripts)
    }
}

impl From<Portfolio> for Vec<ActionScript> {
    fn from(portfolio: Portfolio) -> Self {
        portfolio.scripts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Skirmish, SkirmishState, UnitKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tactica_core::ForwardModel;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn pick(script: ActionScript, state: &SkirmishState) -> Action {
        let actions = Skirmish.generate_actions(state, state.current_player());
        let index = script.choose(state, state.current_player(), &actions, &mut rng()).unwrap();
        actions[index].clone()
    }

    #[test]
    fn test_all_flags_false_yields_random() {
        let portfolio = Portfolio::from_flags(PortfolioFlags::default());
        assert_eq!(portfolio.scripts(), &[ActionScript::Random]);
    }

    #[test]
    fn test_flags_keep_canonical_order() {
        let portfolio = Portfolio::from_flags(PortfolioFlags {
            random: true,
            attack_weakest: true,
            run_away: true,
            ..Default::default()
        });
        assert_eq!(
            portfolio.scripts(),
            &[ActionScript::AttackWeakest, ActionScript::RunAway, ActionScript::Random]
        );
    }

    #[test]
    fn test_empty_portfolio_deserializes_to_random() {
        let portfolio: Portfolio = serde_json::from_str("[]").unwrap();
        assert_eq!(portfolio.scripts(), &[ActionScript::Random]);
        assert!(!portfolio.is_empty());
    }

    #[test]
    fn test_opponent_model_indices() {
        assert_eq!(ActionScript::opponent_model(0), Some(ActionScript::AttackClosest));
        assert_eq!(ActionScript::opponent_model(1), Some(ActionScript::AttackWeakest));
        assert_eq!(ActionScript::opponent_model(2), Some(ActionScript::Random));
        assert_eq!(ActionScript::opponent_model(3), None);
        assert_eq!(ActionScript::opponent_model(99), None);
    }

    #[test]
    fn test_choose_on_empty_list() {
        let state = SkirmishState::standard();
        assert_eq!(ActionScript::Random.choose(&state, 0, &[], &mut rng()), None);
    }

    #[test]
    fn test_attack_closest_prefers_nearest_target() {
        // Archer at (0,0) can reach both enemies
        let state = SkirmishState::new(6, 6, 10)
            .with_unit(0, UnitKind::Archer, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(0, 3))
            .with_unit(1, UnitKind::Warrior, Position::new(1, 0));
        let action = pick(ActionScript::AttackClosest, &state);
        assert_eq!(action, Action::Attack { unit: UnitId(0), target: UnitId(2) });
    }

    #[test]
    fn test_attack_weakest_prefers_low_health() {
        let mut state = SkirmishState::new(6, 6, 10)
            .with_unit(0, UnitKind::Archer, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(0, 3))
            .with_unit(1, UnitKind::Warrior, Position::new(1, 0));
        // Wound the far warrior
        state = Skirmish.advance(&state, &Action::Attack { unit: UnitId(0), target: UnitId(1) });
        state = Skirmish.advance(&state, &Action::EndTurn);
        state = Skirmish.advance(&state, &Action::EndTurn);

        let action = pick(ActionScript::AttackWeakest, &state);
        assert_eq!(action, Action::Attack { unit: UnitId(0), target: UnitId(1) });
    }

    #[test]
    fn test_attack_closest_approaches_when_out_of_range() {
        let state = SkirmishState::new(6, 6, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(3, 0));
        let action = pick(ActionScript::AttackClosest, &state);
        assert_eq!(action, Action::Move { unit: UnitId(0), to: Position::new(1, 0) });
    }

    #[test]
    fn test_run_away_increases_distance() {
        let state = SkirmishState::new(6, 1, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(2, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(4, 0));
        let action = pick(ActionScript::RunAway, &state);
        assert_eq!(action, Action::Move { unit: UnitId(0), to: Position::new(1, 0) });
    }

    #[test]
    fn test_run_to_friends_closes_gap() {
        let state = SkirmishState::new(6, 6, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(0, UnitKind::Healer, Position::new(0, 4))
            .with_unit(1, UnitKind::Warrior, Position::new(5, 5));
        // Warrior stepping down and healer stepping up both end 3 apart;
        // the first candidate in action order wins
        let action = pick(ActionScript::RunToFriends, &state);
        assert_eq!(action, Action::Move { unit: UnitId(0), to: Position::new(0, 1) });
    }

    #[test]
    fn test_scripts_end_turn_when_nothing_to_do() {
        let state = SkirmishState::new(3, 1, 10)
            .with_unit(0, UnitKind::Warrior, Position::new(0, 0))
            .with_unit(1, UnitKind::Warrior, Position::new(2, 0));
        let moved = Skirmish.advance(&state, &Action::Move { unit: UnitId(0), to: Position::new(1, 0) });
        for script in [ActionScript::AttackClosest, ActionScript::RunAway, ActionScript::RunToFriends] {
            assert_eq!(pick(script, &moved), Action::EndTurn, "{script}");
        }
    }

    #[test]
    fn test_special_ability_picks_heal() {
        let mut state = SkirmishState::new(6, 6, 10)
            .with_unit(0, UnitKind::Healer, Position::new(0, 0))
            .with_unit(0, UnitKind::Warrior, Position::new(0, 1))
            .with_unit(1, UnitKind::Archer, Position::new(0, 3));
        // Archer wounds the warrior, then play returns to player 0
        state = Skirmish.advance(&state, &Action::EndTurn);
        state = Skirmish.advance(&state, &Action::Attack { unit: UnitId(2), target: UnitId(1) });
        state = Skirmish.advance(&state, &Action::EndTurn);

        let action = pick(ActionScript::UseSpecialAbility, &state);
        assert_eq!(action, Action::Ability { unit: UnitId(0), target: UnitId(1) });
    }

    #[test]
    fn test_sample_single_script() {
        let portfolio = Portfolio::new(vec![ActionScript::RunAway]);
        assert_eq!(portfolio.sample(&mut rng()), ActionScript::RunAway);
    }
}
