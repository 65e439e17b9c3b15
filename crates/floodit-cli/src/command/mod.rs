use clap::{Parser, Subcommand};

use self::{play::PlayArg, train_nn::TrainNnArg, train_q::TrainQArg};

mod play;
mod train_nn;
mod train_q;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a Q-learning agent
    TrainQ(#[clap(flatten)] TrainQArg),
    /// Train a network pool by neuro-evolution
    TrainNn(#[clap(flatten)] TrainNnArg),
    /// Watch a trained agent play a random board
    Play(#[clap(flatten)] PlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::TrainQ(arg) => train_q::run(&arg)?,
        Mode::TrainNn(arg) => train_nn::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
    }
    Ok(())
}
