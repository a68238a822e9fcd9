use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::Serialize;
use tilemerge_engine::{DEFAULT_WIN_TILE, SimulatedSession, TileSeed};
use tilemerge_evaluator::{
    game_driver::{GameDriver, TrialEnd, TrialOutcome},
    policy::{
        CyclePolicy, GreedyNoLeftPolicy, GreedyTwoStepPolicy, MovePolicy, NoLeftRandomPolicy,
        PriorityPolicy, RandomPolicy, RightTrendPolicy, WeightedPolicy,
    },
};
use tracing::info;

use crate::util;

/// Fixed strategies to compare trained models against.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Strategy {
    /// Best score reachable within two moves, ties at random
    #[default]
    Greedy,
    /// Greedy over right, up and down; left as a last resort
    GreedyNoLeft,
    /// Uniformly random order every turn
    Random,
    /// Right, down, up, left
    Priority,
    /// Right, up, left, down in turn
    Cycle,
    /// Random among right, up and down; left as a last resort
    NoLeftRandom,
    /// Right if possible, then up or down, left last
    RightTrend,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::GreedyNoLeft => "greedy-no-left",
            Self::Random => "random",
            Self::Priority => "priority",
            Self::Cycle => "cycle",
            Self::NoLeftRandom => "no-left-random",
            Self::RightTrend => "right-trend",
        }
    }

    fn policy(self) -> Box<dyn MovePolicy> {
        match self {
            Self::Greedy => Box::new(GreedyTwoStepPolicy),
            Self::GreedyNoLeft => Box::new(GreedyNoLeftPolicy),
            Self::Random => Box::new(RandomPolicy),
            Self::Priority => Box::new(PriorityPolicy),
            Self::Cycle => Box::new(CyclePolicy::default()),
            Self::NoLeftRandom => Box::new(NoLeftRandomPolicy),
            Self::RightTrend => Box::new(RightTrendPolicy),
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to a trained model file (JSON format)
    #[arg(long, conflicts_with = "strategy")]
    model: Option<PathBuf>,
    /// Baseline strategy used when no model is given
    #[arg(long, value_enum, default_value_t)]
    strategy: Strategy,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Seed for tile spawning and random tie-breaks
    #[arg(long)]
    seed: Option<u64>,
    /// Replay the tiles of a recorded game (the `tile_seed` of a result)
    #[arg(long)]
    tile_seed: Option<TileSeed>,
    /// Stop each game after this many turns
    #[arg(long)]
    turn_limit: Option<usize>,
    /// Keep playing after the 2048 tile appears
    #[arg(long, default_value_t = false)]
    endless: bool,
    /// Print the final grid of every game
    #[arg(long, default_value_t = false)]
    show_grid: bool,
    /// Write per-game results to this file (JSON)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct GameResult {
    game: usize,
    player: String,
    tile_seed: TileSeed,
    #[serde(flatten)]
    outcome: TrialOutcome,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        model,
        strategy,
        games,
        seed,
        tile_seed,
        turn_limit,
        endless,
        show_grid,
        output,
    } = arg;

    let (player, weights) = match model {
        Some(path) => {
            let model = util::read_ai_model_file(path)?;
            let weights = model.to_feature_weights()?;
            (model.name, Some(weights))
        }
        None => (strategy.name().to_owned(), None),
    };
    let new_policy = || -> Box<dyn MovePolicy> {
        match weights {
            Some(weights) => Box::new(WeightedPolicy::from_weights(weights)),
            None => strategy.policy(),
        }
    };

    let driver = GameDriver::default().with_turn_limit(*turn_limit);
    let win_tile = (!endless).then_some(DEFAULT_WIN_TILE);
    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let mut results = Vec::with_capacity(*games);
    for game in 0..*games {
        let spawn_seed = match (tile_seed, seed) {
            (Some(tile_seed), _) => *tile_seed,
            (None, Some(seed)) => TileSeed::from_u64(seed.wrapping_add(game as u64)),
            (None, None) => rand::random(),
        };
        let mut session = SimulatedSession::with_seed(spawn_seed).with_win_tile(win_tile);
        let mut policy = new_policy();
        let outcome = driver.play(&mut session, policy.as_mut(), &mut rng);
        info!(
            game,
            %player,
            tile_seed = %spawn_seed,
            max_tile = outcome.max_tile,
            score = outcome.final_score,
            turns = outcome.turns,
            end = %outcome.end,
            "game finished"
        );
        if *show_grid {
            eprintln!("Game #{game}:");
            eprintln!("{}", session.grid());
        }
        results.push(GameResult {
            game,
            player: player.clone(),
            tile_seed: spawn_seed,
            outcome,
        });
    }

    print_summary(&player, &results);
    if output.is_some() || *games > 1 {
        util::save_json(&results, output.as_deref()).context("Failed to save game results")?;
    }
    Ok(())
}

fn print_summary(player: &str, results: &[GameResult]) {
    let Some(best) = results.iter().max_by_key(|r| r.outcome.final_score) else {
        return;
    };
    let wins = results
        .iter()
        .filter(|r| r.outcome.end == TrialEnd::Won)
        .count();
    let total: u64 = results.iter().map(|r| u64::from(r.outcome.final_score)).sum();
    #[expect(clippy::cast_precision_loss)]
    let mean = total as f64 / results.len() as f64;

    eprintln!("{player}: {} game(s)", results.len());
    eprintln!(
        "  Best score: {} (max tile {})",
        best.outcome.final_score, best.outcome.max_tile
    );
    eprintln!("  Mean score: {mean:.1}");
    eprintln!("  Wins:       {wins}");
}
