//! Tuner configuration loaded from a TOML file.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) gives a runnable setup on the standard Skirmish opening.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tactica_core::{Agent, PlayerId, Position};
use tactica_mcts::{
    games::{Skirmish, SkirmishState, UnitKind},
    ActionScript, MctsParameters, ScriptedAgent,
};
use tactica_optim::{LocalArena, MctsValueTables};
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Candidate values for every tuned parameter.
    pub search_space: MctsValueTables,
    /// Parameters not covered by the search space.
    pub agent: MctsParameters,
    pub arena: ArenaConfig,
    pub scenario: ScenarioConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub seed: u64,
    /// Actions after which a game is stopped and scored as a draw.
    pub max_steps: usize,
    pub parallel: bool,
    /// Per-decision wall-clock budget for the agents.
    pub time_budget_ms: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_steps: 1000,
            parallel: true,
            time_budget_ms: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub width: i32,
    pub height: i32,
    pub max_turns: u32,
    /// Script played by the baseline agents.
    pub baseline: ActionScript,
    pub levels: Vec<LevelConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let standard = SkirmishState::standard();
        Self {
            width: standard.width(),
            height: standard.height(),
            max_turns: standard.max_turns(),
            baseline: ActionScript::AttackClosest,
            levels: vec![LevelConfig::from_state(&standard)],
        }
    }
}

/// Starting unit placements for one level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub units: Vec<UnitPlacement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub x: i32,
    pub y: i32,
}

impl LevelConfig {
    fn from_state(state: &SkirmishState) -> Self {
        Self {
            units: state
                .soldiers()
                .iter()
                .map(|s| UnitPlacement {
                    owner: s.owner,
                    kind: s.kind,
                    x: s.position.x,
                    y: s.position.y,
                })
                .collect(),
        }
    }
}

impl ScenarioConfig {
    /// Starting state of every level.
    pub fn build_levels(&self) -> Vec<SkirmishState> {
        self.levels
            .iter()
            .map(|level| {
                level.units.iter().fold(
                    SkirmishState::new(self.width, self.height, self.max_turns),
                    |state, unit| state.with_unit(unit.owner, unit.kind, Position::new(unit.x, unit.y)),
                )
            })
            .collect()
    }

    /// Baseline agents: one scripted agent per seat.
    pub fn baseline_agents(&self) -> Vec<Box<dyn Agent<Skirmish>>> {
        vec![
            Box::new(ScriptedAgent::new(self.baseline)),
            Box::new(ScriptedAgent::new(self.baseline)),
        ]
    }
}

impl ArenaConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

impl TunerConfig {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given, using built-in defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn build_arena(&self) -> LocalArena<Skirmish> {
        LocalArena::new(Skirmish, self.scenario.build_levels())
            .with_seed(self.arena.seed)
            .with_max_steps(self.arena.max_steps)
            .with_parallel(self.arena.parallel)
            .with_time_budget(self.arena.time_budget())
    }
}
