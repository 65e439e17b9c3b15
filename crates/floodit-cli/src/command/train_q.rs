use std::path::PathBuf;

use chrono::Utc;
use floodit_ai::qlearning::QLearning;

use crate::{
    schema::ai_model::{AiModel, Agent, TrainedAgent},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainQArg {
    /// Learning rate
    #[arg(long, default_value_t = 0.1)]
    alpha: f32,
    /// Discount factor
    #[arg(long, default_value_t = 0.9)]
    gamma: f32,
    /// Board side length
    #[arg(long, default_value_t = 6)]
    size: usize,
    /// Number of palette colors
    #[arg(long, default_value_t = 6)]
    colors: usize,
    /// Number of `learn` calls
    #[arg(long, default_value_t = 20)]
    batches: usize,
    /// Episodes per batch
    #[arg(long, default_value_t = 200)]
    episodes: usize,
    /// Seed for reproducible runs (overrides the saved seed with --resume)
    #[arg(long)]
    seed: Option<u64>,
    /// Continue training a saved Q-learning model instead of starting fresh
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainQArg) -> anyhow::Result<()> {
    let TrainQArg {
        alpha,
        gamma,
        size,
        colors,
        batches,
        episodes,
        seed,
        resume,
        output,
    } = arg;

    let mut agent = match resume {
        Some(path) => {
            let model = util::read_ai_model_file(path)?;
            let Agent::QLearning(agent) = Agent::try_from(model.agent)? else {
                anyhow::bail!("{} is not a Q-learning model", path.display());
            };
            log::info!("resuming {} ({} boards known)", model.name, agent.table().len());
            agent
        }
        None => QLearning::new(*alpha, *gamma, util::settings_from_args(*size, *colors, *seed)?)?,
    };
    let mut rng = util::override_seed(agent.settings(), *seed).rng();

    let mut final_score = 0.0;
    for batch in 0..*batches {
        let report = agent.learn(*episodes, &mut rng);
        final_score = report.average_reward;
        eprintln!("Batch #{batch}:");
        eprintln!("  Average reward: {:.3}", report.average_reward);
        if let Some(stats) = &report.stats {
            eprintln!("  Median reward:  {:.3}", stats.median);
        }
        eprintln!("  Buckets (<0, <1, <2, >=2): {:?}", report.buckets.counts);
        eprintln!("  Known boards:   {}", agent.table().len());
    }
    eprintln!("Q-learning completed.");

    let model = AiModel {
        name: "q-learning".to_owned(),
        trained_at: Utc::now(),
        final_score,
        agent: TrainedAgent::QLearning(agent.to_document()),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final score: {:.3}", model.final_score);
    eprintln!("  Boards: {}", agent.table().len());

    Ok(())
}
