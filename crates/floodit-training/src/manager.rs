use std::sync::Arc;

use floodit_ai::nn::{NetworkBuilder, NeuralNetwork};
use floodit_engine::{DEFAULT_MAX_MOVES, GameSettings};
use rand::Rng;

use crate::{
    TrainingError,
    pool::{EpochStats, NetworkPool},
};

/// Runs epochs of neuro-evolution over a [`NetworkPool`].
#[derive(Debug, Clone)]
pub struct NeuroEvolutionManager {
    pool: NetworkPool,
    settings: Arc<GameSettings>,
    max_moves: usize,
    epochs_run: usize,
}

impl NeuroEvolutionManager {
    /// Builds `pool_size` random networks from `builder`.
    ///
    /// Fails when the architecture is invalid or does not fit boards of
    /// `settings`.
    pub fn new<R>(
        builder: &NetworkBuilder,
        pool_size: usize,
        settings: impl Into<Arc<GameSettings>>,
        rng: &mut R,
    ) -> Result<Self, TrainingError>
    where
        R: Rng + ?Sized,
    {
        if pool_size == 0 {
            return Err(TrainingError::EmptyPool);
        }
        let settings = settings.into();
        let networks = (0..pool_size)
            .map(|_| builder.build(rng))
            .collect::<Result<Vec<_>, _>>()?;
        networks[0].check_settings(&settings)?;
        Ok(Self {
            pool: NetworkPool::new(networks),
            settings,
            max_moves: DEFAULT_MAX_MOVES,
            epochs_run: 0,
        })
    }

    /// Move cap of every training episode.
    #[must_use]
    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &NetworkPool {
        &self.pool
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<GameSettings> {
        &self.settings
    }

    #[must_use]
    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    /// The survivor of the last epoch.
    #[must_use]
    pub fn best_network(&self) -> &NeuralNetwork {
        &self.pool.networks()[0]
    }

    /// Trains every network once, then reproduces from the fittest.
    pub fn epoch<R>(&mut self, rng: &mut R) -> Result<EpochStats, TrainingError>
    where
        R: Rng + ?Sized,
    {
        self.pool.train_all(&self.settings, self.max_moves, rng)?;
        let stats = self
            .pool
            .reproduce_from_best(rng)
            .ok_or(TrainingError::EmptyPool)?;
        self.epochs_run += 1;

        log::debug!("--------- Epoch #{} ---------", self.epochs_run);
        log::debug!("Best fitness:    {}", stats.best);
        log::debug!("Worst fitness:   {}", stats.worst);
        log::debug!("Average fitness: {}", stats.mean);
        log::debug!("Median fitness:  {}", stats.median);
        Ok(stats)
    }

    /// Runs `n` epochs and returns their statistics in order.
    pub fn epochs<R>(&mut self, n: usize, rng: &mut R) -> Result<Vec<EpochStats>, TrainingError>
    where
        R: Rng + ?Sized,
    {
        (0..n).map(|_| self.epoch(rng)).collect()
    }
}
