//! Hyperparameter tuning for the Tactica MCTS agent.
//!
//! Evaluates agent configurations by self-play on Skirmish levels and runs
//! random search over the configured search space.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::TunerConfig;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use tactica_core::{Agent, ForwardModel, GameState};
use tactica_mcts::{games::Skirmish, ActionScript, MctsAgent};
use tactica_optim::{ActionAbstractingMctsEvaluator, Arena, Evaluator, LocalArena, RandomSearch, Trial};
use tracing::info;

/// Tactica MCTS tuning tool.
#[derive(Parser, Debug)]
#[command(name = "tactica-tuner")]
#[command(about = "Evaluate and tune MCTS agent configurations through self-play")]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the search space.
    Space,

    /// Evaluate one point of the search space.
    Evaluate {
        /// Comma-separated index per dimension, e.g. 0,1,2,1,0,0,0,0,1.
        #[arg(short, long, value_delimiter = ',', required = true)]
        point: Vec<usize>,
    },

    /// Random search over the search space.
    Tune {
        /// Number of distinct points to evaluate.
        #[arg(short, long, default_value = "20")]
        iterations: usize,

        /// Seed for point sampling; defaults to the arena seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Write the ranked trials to this JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play one game with the agent at `point` and print every action.
    Play {
        #[arg(short, long, value_delimiter = ',', required = true)]
        point: Vec<usize>,

        /// Level to play.
        #[arg(long, default_value = "0")]
        level: usize,
    },
}

/// Ranked results written by `tune --output`.
#[derive(Serialize)]
struct TuningReport<'a> {
    evaluator: &'a str,
    search_space_size: u64,
    seed: u64,
    trials: &'a [Trial],
}

type MctsEvaluator = ActionAbstractingMctsEvaluator<Skirmish, LocalArena<Skirmish>>;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn build_evaluator(config: &TunerConfig) -> MctsEvaluator {
    let scenario = config.scenario.clone();
    ActionAbstractingMctsEvaluator::new(
        config.search_space.clone(),
        config.agent.clone(),
        move || scenario.baseline_agents(),
        config.build_arena(),
    )
}

fn cmd_space(config: &TunerConfig) {
    let tables = &config.search_space;
    let space = tables.search_space();

    println!("Search space: {} points", space.size());
    println!("================================================");
    println!("K values:          {:?}", tables.k_values);
    println!("Rollout lengths:   {:?}", tables.rollout_lengths);
    let opponent_models: Vec<String> = (0..tables.opponent_model_count)
        .map(|index| match ActionScript::opponent_model(index) {
            Some(script) => script.tag().to_string(),
            None => "none".to_string(),
        })
        .collect();
    println!("Opponent models:   {:?}", opponent_models);
    println!("Attack closest:    {:?}", tables.attack_closest);
    println!("Attack weakest:    {:?}", tables.attack_weakest);
    println!("Run away:          {:?}", tables.run_away);
    println!("Run to friends:    {:?}", tables.run_to_friends);
    println!("Special ability:   {:?}", tables.use_special_ability);
    println!("Random:            {:?}", tables.random);
    println!("------------------------------------------------");
    println!("Dimensions: {:?}", space.dims());
    println!("Levels: {}", config.scenario.levels.len());
}

fn cmd_evaluate(config: &TunerConfig, point: &[usize]) -> Result<()> {
    let evaluator = build_evaluator(config);
    let description = evaluator.print_point(point).context("Invalid point")?;
    println!("Evaluating {}", description);

    let start = Instant::now();
    let score = evaluator
        .evaluate(point, evaluator.arena().num_levels())
        .with_context(|| format!("Failed to evaluate {}", description))?;

    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f64());
    println!("Games played: {}", evaluator.arena().games_played());
    println!("Mean value:   {:.3}", score.mean_value);
    println!("Win rate:     {:.1}%", score.win_rate * 100.0);
    Ok(())
}

fn cmd_tune(config: &TunerConfig, iterations: usize, seed: Option<u64>, output: Option<PathBuf>) -> Result<()> {
    let evaluator = build_evaluator(config);
    let seed = seed.unwrap_or(config.arena.seed);
    let space_size = evaluator.search_space().size();

    println!(
        "Tuning with {} iterations over {} points ({} levels per evaluation)",
        iterations,
        space_size,
        evaluator.arena().num_levels()
    );
    println!("Seed: {}", seed);

    let start = Instant::now();
    let trials = RandomSearch::new(iterations)
        .with_seed(seed)
        .with_samples(evaluator.arena().num_levels())
        .run(&evaluator)
        .context("Random search failed")?;

    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f64());
    println!("Games played: {}", evaluator.arena().games_played());
    println!("\n================================================");
    println!("BEST CONFIGURATIONS");
    println!("================================================");
    for (rank, trial) in trials.iter().take(5).enumerate() {
        println!(
            "{}. {}  win rate {:.1}%, mean value {:.3}",
            rank + 1,
            trial.description,
            trial.score.win_rate * 100.0,
            trial.score.mean_value
        );
    }

    if let Some(path) = output {
        let report = TuningReport {
            evaluator: evaluator.name(),
            search_space_size: space_size,
            seed,
            trials: &trials,
        };
        let file = File::create(&path).with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("Failed to write results to {:?}", path))?;
        println!("\nResults saved to: {:?}", path);
    }

    Ok(())
}

fn cmd_play(config: &TunerConfig, point: &[usize], level: usize) -> Result<()> {
    let evaluator = build_evaluator(config);
    let params = evaluator.parameters_for(point).context("Invalid point")?;
    let levels = config.scenario.build_levels();
    let mut state = levels
        .get(level)
        .cloned()
        .with_context(|| format!("Level {} not defined ({} levels)", level, levels.len()))?;

    let mut agents = config.scenario.baseline_agents();
    agents[0] = Box::new(MctsAgent::<Skirmish>::new(params));
    for (player, agent) in agents.iter_mut().enumerate() {
        agent.set_player_id(player);
        agent.set_seed(config.arena.seed.wrapping_add(player as u64));
        agent.init(&state, &Skirmish, config.arena.time_budget());
    }

    println!("Playing {} on level {}", evaluator.print_point(point)?, level);
    println!("{}", state);

    let mut steps = 0;
    while !Skirmish.is_terminal(&state) && steps < config.arena.max_steps {
        let player = state.current_player();
        let assignment = agents[player]
            .compute_action(state.clone(), &Skirmish, config.arena.time_budget())
            .with_context(|| format!("Player {} failed to act", player))?;
        let action = assignment.into_action();
        println!("[turn {}] player {} ({}): {}", state.turn(), player, agents[player].name(), action);

        let ends_turn = action.ends_turn();
        state = Skirmish.advance(&state, &action);
        if ends_turn {
            println!("{}", state);
        }
        steps += 1;
    }

    println!("================================================");
    println!("{}", state);
    match Skirmish.winner(&state) {
        Some(winner) => println!("Winner: player {}", winner),
        None => println!("Draw after {} actions", steps),
    }
    info!(steps, "game finished");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = TunerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Space => {
            cmd_space(&config);
            Ok(())
        }
        Commands::Evaluate { point } => cmd_evaluate(&config, &point),
        Commands::Tune {
            iterations,
            seed,
            output,
        } => cmd_tune(&config, iterations, seed, output),
        Commands::Play { point, level } => cmd_play(&config, &point, level),
    }
}
