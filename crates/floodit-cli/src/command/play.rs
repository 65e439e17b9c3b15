use std::{path::PathBuf, sync::Arc, time::Duration};

use floodit_engine::{CancellationToken, Color, Game, GameOutcome, Paced, Strategy};

use crate::{schema::ai_model::Agent, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the model file (JSON format)
    model_path: PathBuf,
    /// Delay between two moves, in milliseconds
    #[arg(long, default_value_t = 250)]
    delay_ms: u64,
    /// Delay between two fill waves, in milliseconds
    #[arg(long, default_value_t = 0)]
    wave_delay_ms: u64,
    /// Cancel the game after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Give up after this many moves
    #[arg(long, default_value_t = floodit_engine::DEFAULT_MAX_MOVES)]
    max_moves: usize,
    /// Force a random color when a network stops making progress
    #[arg(long)]
    stall_guard: bool,
    /// Seed for the board and the players
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        model_path,
        delay_ms,
        wave_delay_ms,
        timeout_secs,
        max_moves,
        stall_guard,
        seed,
    } = arg;

    let model = util::read_ai_model_file(model_path)?;
    let settings = Arc::new(util::override_seed(model.agent.settings(), *seed));
    let agent = Agent::try_from(model.agent)?;
    log::info!("loaded {} trained at {}", model.name, model.trained_at);

    let mut rng = settings.rng();
    let cells = vec![settings.palette()[0]; settings.cell_count()];
    let mut game = Game::new(cells, Arc::clone(&settings), &mut rng)
        .with_wave_delay(Duration::from_millis(*wave_delay_ms));
    game.on_color_played(|color| log::info!("played {color}"));
    eprintln!("{}", util::render_board(&settings, game.accessor()));

    let delay = Duration::from_millis(*delay_ms);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let outcome = runtime.block_on(async {
        let cancel = CancellationToken::new();
        if let Some(secs) = timeout_secs {
            let cancel = cancel.clone();
            let secs = *secs;
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                cancel.cancel();
            });
        }
        match &agent {
            Agent::QLearning(agent) => {
                let player = agent.player(rng).with_max_moves(*max_moves);
                Ok(play_paced(&mut game, player, delay, &cancel).await)
            }
            Agent::Network(network) => match network.player(&settings, rng) {
                Ok(player) => {
                    let mut player = player.with_max_moves(*max_moves);
                    if *stall_guard {
                        player = player.with_stall_guard();
                    }
                    Ok(play_paced(&mut game, player, delay, &cancel).await)
                }
                Err(e) => Err(e),
            },
        }
    })?;

    eprintln!("{}", util::render_board(&settings, game.accessor()));
    match outcome {
        GameOutcome::Finished => eprintln!("Won in {} moves", game.moves()),
        GameOutcome::GaveUp => eprintln!("Gave up after {} moves", game.moves()),
        GameOutcome::Cancelled => eprintln!("Cancelled after {} moves", game.moves()),
    }
    Ok(())
}

async fn play_paced<S>(
    game: &mut Game<Vec<Color>>,
    strategy: S,
    delay: Duration,
    cancel: &CancellationToken,
) -> GameOutcome
where
    S: Strategy,
{
    game.play_async(Paced::new(strategy, delay), cancel).await
}
