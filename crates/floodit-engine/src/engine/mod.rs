//! Game logic on top of the core board structures.
//!
//! - [`GameSettings`] - Board size, palette and move rules
//! - [`GameState`] - Immutable per-turn analysis (upper-left zone, blobs, canonical board, legal moves)
//! - [`Strategy`] / [`AsyncStrategy`] - Move-selection policies
//! - [`Game`] - Turn engine mirroring the board into an external [`BoardAccessor`]
//!
//! # Game Flow
//!
//! 1. Build a [`GameState`] from [`GameSettings`] (random fill or explicit cells)
//! 2. Ask a strategy for a color
//! 3. [`GameState::play_color`] recolors the upper-left zone and re-analyzes the board
//! 4. Repeat until a single region remains, or the strategy gives up
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! use floodit_engine::{GameSettings, GameState, PlayMode};
//!
//! let mut rng = Pcg64::seed_from_u64(1);
//! let mut state = GameState::random(GameSettings::with_size(5).unwrap(), &mut rng);
//! while !state.is_finished() {
//!     let color = state.playable_colors()[0];
//!     state = state.play_color(color, PlayMode::Flat);
//! }
//! assert_eq!(state.blob_count(), 1);
//! ```

pub use self::{game::*, settings::*, state::*, strategy::*};

mod game;
mod settings;
mod state;
mod strategy;
