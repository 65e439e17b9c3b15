//! Network pool: concurrent training episodes and elitist reproduction.

use std::{fmt, panic, sync::Arc, thread};

use floodit_ai::{SettingsMismatchError, nn::NeuralNetwork};
use floodit_engine::GameSettings;
use floodit_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;

/// Fitness summary of one generation, computed before it is replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub best: f32,
    pub worst: f32,
    pub mean: f32,
    /// Average of the two middle values for even pool sizes.
    pub median: f32,
    /// Fraction of networks with a strictly positive fitness.
    pub positive_fraction: f32,
}

impl From<&DescriptiveStats> for EpochStats {
    fn from(stats: &DescriptiveStats) -> Self {
        Self {
            best: stats.max,
            worst: stats.min,
            mean: stats.mean,
            median: stats.median,
            positive_fraction: stats.positive_fraction,
        }
    }
}

impl fmt::Display for EpochStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "best {:.2}, worst {:.2}, mean {:.2}, median {:.2}, positive {:.1}%",
            self.best,
            self.worst,
            self.mean,
            self.median,
            self.positive_fraction * 100.0
        )
    }
}

/// Fixed-size pool of networks sharing one architecture.
#[derive(Debug, Clone)]
pub struct NetworkPool {
    networks: Vec<NeuralNetwork>,
}

impl NetworkPool {
    #[must_use]
    pub fn new(networks: Vec<NeuralNetwork>) -> Self {
        Self { networks }
    }

    #[must_use]
    pub fn networks(&self) -> &[NeuralNetwork] {
        &self.networks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Plays one training episode per network in parallel and waits for all
    /// of them.
    ///
    /// Each episode gets its own generator seeded from `rng` before any thread
    /// starts, so the result does not depend on scheduling.
    pub fn train_all<R>(
        &mut self,
        settings: &Arc<GameSettings>,
        max_moves: usize,
        rng: &mut R,
    ) -> Result<Vec<f32>, SettingsMismatchError>
    where
        R: Rng + ?Sized,
    {
        let seeds = (0..self.networks.len())
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();

        thread::scope(|s| {
            let handles = self
                .networks
                .iter_mut()
                .zip(seeds)
                .map(|(network, seed)| {
                    let settings = Arc::clone(settings);
                    s.spawn(move || {
                        let mut rng = Pcg64::seed_from_u64(seed);
                        network.train(settings, max_moves, &mut rng)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect()
        })
    }

    /// Index of the fittest network; the first one wins ties.
    fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, network) in self.networks.iter().enumerate() {
            if best.is_none_or(|(_, fitness)| network.fitness() > fitness) {
                best = Some((i, network.fitness()));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Keeps the fittest network and refills the pool with its mutated
    /// children.
    ///
    /// Returns the fitness summary of the replaced generation, or `None` for an
    /// empty pool.
    pub fn reproduce_from_best<R>(&mut self, rng: &mut R) -> Option<EpochStats>
    where
        R: Rng + ?Sized,
    {
        let stats = DescriptiveStats::new(self.networks.iter().map(NeuralNetwork::fitness))?;
        let best = self.networks.swap_remove(self.best_index()?);
        let children = best.create_children(self.networks.len(), rng);
        self.networks.clear();
        self.networks.push(best);
        self.networks.extend(children);
        Some(EpochStats::from(&stats))
    }

    /// The survivor of the last reproduction (the first network before any).
    #[must_use]
    pub fn best(&self) -> Option<&NeuralNetwork> {
        self.networks.first()
    }
}
