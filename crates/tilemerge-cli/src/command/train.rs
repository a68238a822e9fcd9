use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use tilemerge_engine::{SimulatedSession, TileSeed};
use tilemerge_evaluator::grid_feature::ALL_GRID_FEATURES;
use tilemerge_training::{
    config::OptimizerConfig, genetic::Genome, history::PopulationHistory, optimizer::Optimizer,
};
use tracing::info;

use crate::{model::ai_model::AiModel, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Optimizer configuration file (JSON); missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Genomes per generation
    #[arg(long)]
    population_size: Option<usize>,
    /// Number of generations to evaluate
    #[arg(long)]
    max_generations: Option<usize>,
    /// Genomes carried over unchanged (and culled) each generation
    #[arg(long)]
    elite_count: Option<usize>,
    /// Initial weights are drawn from [-w, w)
    #[arg(long)]
    weight_half_width: Option<f32>,
    /// Per-weight mutation probability
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Maximum absolute mutation offset
    #[arg(long)]
    mutation_magnitude: Option<f32>,
    /// Consecutive failed session calls allowed per turn
    #[arg(long)]
    turn_attempts: Option<usize>,
    /// Stop each game after this many turns
    #[arg(long)]
    turn_limit: Option<usize>,
    /// Seed for the optimizer and tile spawning; every trial then sees the
    /// same spawn sequence and the run is reproducible
    #[arg(long)]
    seed: Option<u64>,
    /// Name stored in the saved model
    #[arg(long, default_value = "weighted")]
    name: String,
    /// Model output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write every genome of every generation to this file
    #[arg(long)]
    history: Option<PathBuf>,
}

impl TrainArg {
    fn optimizer_config(&self) -> anyhow::Result<OptimizerConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<OptimizerConfig, _>("optimizer config", path)?,
            None => OptimizerConfig::default(),
        };
        let overrides = [
            (&mut config.population_size, self.population_size),
            (&mut config.max_generations, self.max_generations),
            (&mut config.elite_count, self.elite_count),
            (&mut config.turn_attempts, self.turn_attempts),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(w) = self.weight_half_width {
            config.weight_half_width = w;
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation_rate = rate;
        }
        if let Some(magnitude) = self.mutation_magnitude {
            config.mutation_magnitude = magnitude;
        }
        if self.turn_limit.is_some() {
            config.turn_limit = self.turn_limit;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let history = train(arg)?;
    print_final_generation(&history);

    if let Some(path) = &arg.history {
        util::save_json(&history.records(), Some(path.as_path()))?;
        eprintln!("History saved to {}", path.display());
    }

    let best = history
        .best()
        .context("Training produced no evaluated genome")?;
    let model = AiModel::from_genome(&arg.name, best)?;
    util::save_json(&model, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = arg.output.as_deref().map(Path::display) {
        eprintln!("  Path: {path}");
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Max tile: {}", model.max_tile);
    eprintln!("  Final score: {}", model.final_score);

    Ok(())
}

fn train(arg: &TrainArg) -> anyhow::Result<PopulationHistory> {
    let config = arg.optimizer_config()?;
    let optimizer = Optimizer::new(config).context("Invalid optimizer configuration")?;
    info!(config = ?optimizer.config(), seed = ?arg.seed, "starting training");

    let mut rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let history = match arg.seed {
        Some(seed) => optimizer.run(
            &move || SimulatedSession::with_seed(TileSeed::from_u64(seed)),
            &mut rng,
        ),
        None => optimizer.run(&SimulatedSession::new, &mut rng),
    }
    .context("Training stopped")?;
    Ok(history)
}

fn print_final_generation(history: &PopulationHistory) {
    let Some(population) = history.last() else {
        return;
    };
    let names: Vec<_> = ALL_GRID_FEATURES.iter().map(|f| f.name()).collect();
    eprintln!("Weights: {}", names.join(", "));
    eprintln!("Generation #{} genomes:", population.generation());
    for (i, genome) in population.genomes().iter().enumerate() {
        eprintln!("  {i:2}: {:.3?} => {}", genome.weights(), describe(genome));
    }
    eprintln!("Progress:");
    for summary in history.summaries() {
        eprintln!("  {summary}");
    }
}

fn describe(genome: &Genome) -> String {
    match genome.outcome() {
        Some(o) => format!(
            "max tile {}, score {}, {} turns ({})",
            o.max_tile, o.final_score, o.turns, o.end
        ),
        None => "not evaluated".to_owned(),
    }
}
