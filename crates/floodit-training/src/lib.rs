//! Neuro-evolution of puzzle-playing networks.
//!
//! # How Training Works
//!
//! 1. **Pool** - Build a fixed number of randomly initialized networks from one
//!    [`NetworkBuilder`](floodit_ai::nn::NetworkBuilder) template
//! 2. **Episode** - Every network plays one game on its own random board, all
//!    networks concurrently; the summed shaped reward is its fitness
//! 3. **Selection** - Once every episode has finished, the single fittest
//!    network survives unchanged
//! 4. **Reproduction** - The rest of the pool is refilled with mutated copies of
//!    the survivor
//! 5. **Repeat** - One such cycle is an epoch
//!
//! Selection is strictly elitist and asexual: there is no crossover and no
//! diversity preservation beyond mutation noise.
//!
//! # Example
//!
//! ```
//! use floodit_ai::nn::{Activation, NetworkBuilder};
//! use floodit_engine::{Color, GameSettings};
//! use floodit_training::NeuroEvolutionManager;
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(0);
//! let builder = NetworkBuilder::input(9)
//!     .dense(6, Activation::LeakyReLU)
//!     .dense(3, Activation::Softmax);
//! let settings = GameSettings::new(3, Color::DEFAULT_PALETTE[..4].to_vec()).unwrap();
//! let mut manager = NeuroEvolutionManager::new(&builder, 4, settings, &mut rng).unwrap();
//! let stats = manager.epochs(2, &mut rng).unwrap();
//! assert_eq!(stats.len(), 2);
//! assert_eq!(manager.pool().networks().len(), 4);
//! ```

pub use self::{
    manager::NeuroEvolutionManager,
    pool::{EpochStats, NetworkPool},
};

use floodit_ai::{NetworkShapeError, SettingsMismatchError};

mod manager;
mod pool;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("pool size must be at least 1")]
    EmptyPool,
    #[display("{_0}")]
    #[from]
    NetworkShape(NetworkShapeError),
    #[display("{_0}")]
    #[from]
    SettingsMismatch(SettingsMismatchError),
}
