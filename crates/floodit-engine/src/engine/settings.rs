use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{Color, SettingsError};

/// Immutable game configuration.
///
/// - `size`: side length of the square board (`size * size` cells)
/// - `palette`: colors used to fill new boards (at least 2 distinct colors)
/// - `prevent_same_brush`: when set, the color of the top-left cell is not a legal move
/// - `seed`: optional seed for [`GameSettings::rng`]
///
/// # Example
///
/// ```
/// use floodit_engine::{Color, GameSettings};
///
/// let settings = GameSettings::new(4, vec![Color::RED, Color::BLUE])
///     .unwrap()
///     .with_seed(Some(42));
/// assert_eq!(settings.cell_count(), 16);
/// assert!(settings.prevent_same_brush());
///
/// assert!(GameSettings::new(4, vec![Color::RED, Color::RED]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameSettings")]
pub struct GameSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    size: usize,
    palette: Vec<Color>,
    prevent_same_brush: bool,
}

#[derive(Deserialize)]
struct RawGameSettings {
    #[serde(default)]
    seed: Option<u64>,
    size: usize,
    palette: Vec<Color>,
    prevent_same_brush: bool,
}

impl TryFrom<RawGameSettings> for GameSettings {
    type Error = SettingsError;

    fn try_from(raw: RawGameSettings) -> Result<Self, Self::Error> {
        Ok(GameSettings::new(raw.size, raw.palette)?
            .with_prevent_same_brush(raw.prevent_same_brush)
            .with_seed(raw.seed))
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: None,
            size: 9,
            palette: Color::DEFAULT_PALETTE.to_vec(),
            prevent_same_brush: true,
        }
    }
}

impl GameSettings {
    pub fn new(size: usize, palette: Vec<Color>) -> Result<Self, SettingsError> {
        if size == 0 {
            return Err(SettingsError::EmptyBoard);
        }
        if palette.len() > usize::from(u8::MAX) {
            return Err(SettingsError::TooManyColors { len: palette.len() });
        }
        let mut distinct = palette.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(SettingsError::TooFewColors {
                distinct: distinct.len(),
            });
        }
        Ok(Self {
            seed: None,
            size,
            palette,
            prevent_same_brush: true,
        })
    }

    /// Default settings with a different board size.
    pub fn with_size(size: usize) -> Result<Self, SettingsError> {
        Self::new(size, Color::DEFAULT_PALETTE.to_vec())
    }

    #[must_use]
    pub fn with_prevent_same_brush(mut self, prevent_same_brush: bool) -> Self {
        self.prevent_same_brush = prevent_same_brush;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    #[must_use]
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    #[must_use]
    pub fn prevent_same_brush(&self) -> bool {
        self.prevent_same_brush
    }

    /// Creates a generator seeded from `seed`, or from the OS when no seed is set.
    #[must_use]
    pub fn rng(&self) -> Pcg64 {
        match self.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_os_rng(),
        }
    }

    /// Picks a palette color uniformly at random.
    pub fn random_color<R>(&self, rng: &mut R) -> Color
    where
        R: Rng + ?Sized,
    {
        self.palette[rng.random_range(0..self.palette.len())]
    }
}
