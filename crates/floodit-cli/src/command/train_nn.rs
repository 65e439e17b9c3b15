use std::path::PathBuf;

use chrono::Utc;
use floodit_ai::nn::{Activation, NetworkBuilder};
use floodit_engine::GameSettings;
use floodit_training::NeuroEvolutionManager;

use crate::{
    schema::ai_model::{AiModel, TrainedAgent},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainNnArg {
    /// Board side length
    #[arg(long, default_value_t = 4)]
    size: usize,
    /// Number of palette colors
    #[arg(long, default_value_t = 8)]
    colors: usize,
    /// Networks per generation
    #[arg(long, default_value_t = 20)]
    pool: usize,
    /// Hidden layer sizes
    #[arg(long, value_delimiter = ',', default_value = "14,12,10")]
    hidden: Vec<usize>,
    /// Activation of the hidden layers
    #[arg(long, default_value = "LeakyReLU")]
    activation: Activation,
    #[arg(long, default_value_t = 1000)]
    epochs: usize,
    /// Move cap of one training episode
    #[arg(long, default_value_t = 1000)]
    max_moves: usize,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainNnArg) -> anyhow::Result<()> {
    let TrainNnArg {
        size,
        colors,
        pool,
        hidden,
        activation,
        epochs,
        max_moves,
        seed,
        output,
    } = arg;

    let settings = util::settings_from_args(*size, *colors, *seed)?;
    let mut rng = settings.rng();
    let builder = hidden
        .iter()
        .fold(NetworkBuilder::input(settings.cell_count()), |b, n| {
            b.dense(*n, *activation)
        })
        .dense(colors - 1, Activation::Softmax);
    eprintln!("Architecture: {:?}", builder.sizes());

    let mut manager = NeuroEvolutionManager::new(&builder, *pool, settings, &mut rng)?
        .with_max_moves(*max_moves);
    for epoch in 0..*epochs {
        let stats = manager.epoch(&mut rng)?;
        eprintln!("Epoch #{epoch}: {stats}");
    }
    eprintln!("Neuro-evolution completed.");

    let best = manager.best_network();
    let model = AiModel {
        name: "neural-network".to_owned(),
        trained_at: Utc::now(),
        final_score: best.fitness(),
        agent: TrainedAgent::Network {
            settings: GameSettings::clone(manager.settings()),
            network: best.clone(),
        },
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_score);
    eprintln!("  Network: {best}");

    Ok(())
}
