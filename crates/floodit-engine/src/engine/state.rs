use std::{
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use rand::Rng;

use crate::{
    CellCountError, CellsError, OutOfRangeError,
    core::{
        Board, Color, Point,
        zone::{self, ZoneCell},
    },
};

use super::settings::GameSettings;

/// How [`GameState::play_color`] records the recoloring of the upper-left zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// One change batch per BFS distance from the origin, nearest first.
    #[default]
    Waves,
    /// A single change batch for the whole zone.
    Flat,
}

/// Board encoding that ignores color identity.
///
/// Each cell holds the index of its color in the list of colors met so far in
/// raster order, so the top-left cell is always `0`. Two boards with the same
/// shape but different color assignment produce the same canonical board, as
/// long as the colors are introduced in the same raster order.
///
/// ```
/// use floodit_engine::CanonicalBoard;
///
/// let (canonical, table) = CanonicalBoard::from_cells(&['b', 'a', 'b', 'c']).unwrap();
/// assert_eq!(&*canonical, &[0, 1, 0, 2]);
/// assert_eq!(table, vec!['b', 'a', 'c']);
///
/// let wide = (0..=256).collect::<Vec<u16>>();
/// assert!(CanonicalBoard::from_cells(&wide).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalBoard(Box<[u8]>);

impl CanonicalBoard {
    /// Canonicalizes `cells`, returning the canonical board and the first-seen
    /// value table (canonical byte `i` stands for `table[i]`).
    ///
    /// `None` when `cells` holds more than 256 distinct values.
    #[must_use]
    pub fn from_cells<T>(cells: &[T]) -> Option<(Self, Vec<T>)>
    where
        T: PartialEq + Copy,
    {
        let mut table: Vec<T> = vec![];
        let bytes = cells
            .iter()
            .map(|cell| {
                let index = table.iter().position(|seen| seen == cell).unwrap_or_else(|| {
                    table.push(*cell);
                    table.len() - 1
                });
                u8::try_from(index).ok()
            })
            .collect::<Option<_>>()?;
        Some((Self(bytes), table))
    }

    /// Wraps raw canonical bytes (e.g. read back from storage).
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for CanonicalBoard {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Snapshot of a game between two moves.
///
/// A `GameState` is computed once from a board and never changes afterwards
/// (apart from draining its queued change batches). Playing a color produces a
/// new state with [`GameState::play_color`].
///
/// Derived data:
///
/// - the upper-left zone (ULZ): cells connected to `(0, 0)` with its color, with
///   BFS distances
/// - blobs: the other maximal same-color regions
/// - the canonical board and the legal moves ("playable" colors and bytes)
///
/// Two states are equal when their canonical boards are equal; actual colors
/// are ignored.
///
/// # Example
///
/// ```
/// use floodit_engine::{Color, GameSettings, GameState, PlayMode};
///
/// let settings = GameSettings::new(2, vec![Color::RED, Color::BLUE]).unwrap();
/// let cells = vec![Color::RED, Color::BLUE, Color::BLUE, Color::BLUE];
/// let state = GameState::from_cells(settings, cells).unwrap();
/// assert_eq!(state.blob_count(), 2);
/// assert_eq!(state.playable_colors(), vec![Color::BLUE]);
///
/// let next = state.play_color(Color::BLUE, PlayMode::Flat);
/// assert!(next.is_finished());
/// ```
#[derive(Debug, Clone)]
pub struct GameState {
    settings: Arc<GameSettings>,
    board: Board,
    upper_left: Vec<ZoneCell>,
    blobs: Vec<Vec<Point>>,
    canonical: CanonicalBoard,
    color_table: Vec<Color>,
    playable_bytes: Vec<u8>,
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board.size() == other.board.size() && self.canonical == other.canonical
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl GameState {
    /// Creates a randomly filled board.
    pub fn random<R>(settings: impl Into<Arc<GameSettings>>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let settings = settings.into();
        let mut board = Board::filled(settings.size(), settings.palette()[0]);
        let mut batch = board.begin_batch();
        for index in 0..settings.cell_count() {
            let point = Point::from_index(index, settings.size());
            batch.paint(point, settings.random_color(rng));
        }
        batch.finish();
        Self::analyze(settings, board)
    }

    /// Creates a state from explicit cells in raster order.
    ///
    /// Every cell must hold a color of the settings' palette.
    pub fn from_cells(
        settings: impl Into<Arc<GameSettings>>,
        cells: Vec<Color>,
    ) -> Result<Self, CellsError> {
        let settings = settings.into();
        if cells.len() != settings.cell_count() {
            return Err(CellCountError {
                expected: settings.cell_count(),
                actual: cells.len(),
            }
            .into());
        }
        if let Some((index, color)) = cells
            .iter()
            .enumerate()
            .find(|(_, color)| !settings.palette().contains(color))
        {
            return Err(CellsError::UnknownColor {
                index,
                color: *color,
            });
        }
        let mut board = Board::filled(settings.size(), settings.palette()[0]);
        let mut batch = board.begin_batch();
        for (index, color) in cells.into_iter().enumerate() {
            batch.paint(Point::from_index(index, settings.size()), color);
        }
        batch.finish();
        Ok(Self::analyze(settings, board))
    }

    /// Analyzes a board holding palette colors only.
    fn analyze(settings: Arc<GameSettings>, board: Board) -> Self {
        let partition = zone::partition(&board);
        let (canonical, color_table) = CanonicalBoard::from_cells(board.cells())
            .expect("a palette should never hold more than 255 colors");
        let first_playable = u8::from(settings.prevent_same_brush());
        let last_byte = canonical.iter().copied().max().unwrap_or(0);
        let playable_bytes = (first_playable..=last_byte).collect();
        Self {
            settings,
            board,
            upper_left: partition.upper_left,
            blobs: partition.blobs,
            canonical,
            color_table,
            playable_bytes,
        }
    }

    /// Recolors the upper-left zone with `color` and returns the resulting state.
    ///
    /// The recoloring is queued on the new state as change batches, one per BFS
    /// wave in [`PlayMode::Waves`] or a single one in [`PlayMode::Flat`]. The final
    /// board is the same in both modes. A color outside the palette leaves the
    /// board unchanged.
    #[must_use]
    pub fn play_color(&self, color: Color, mode: PlayMode) -> GameState {
        let mut board = self.board.snapshot();
        if !self.settings.palette().contains(&color) {
            return Self::analyze(Arc::clone(&self.settings), board);
        }
        match mode {
            PlayMode::Waves => {
                for wave in zone::waves(&self.upper_left) {
                    let mut batch = board.begin_batch();
                    for point in wave {
                        batch.paint(point, color);
                    }
                }
            }
            PlayMode::Flat => {
                let mut batch = board.begin_batch();
                for cell in &self.upper_left {
                    batch.paint(cell.point, color);
                }
            }
        }
        Self::analyze(Arc::clone(&self.settings), board)
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<GameSettings> {
        &self.settings
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn color_at(&self, x: usize, y: usize) -> Result<Color, OutOfRangeError> {
        self.board.get(Point::new(x, y))
    }

    #[must_use]
    pub fn upper_left(&self) -> Color {
        self.board.upper_left()
    }

    #[must_use]
    pub fn canonical(&self) -> &CanonicalBoard {
        &self.canonical
    }

    /// Cells of the upper-left zone with their distance from the origin.
    #[must_use]
    pub fn upper_left_zone(&self) -> &[ZoneCell] {
        &self.upper_left
    }

    /// The upper-left zone split into waves of equal distance.
    #[must_use]
    pub fn upper_left_waves(&self) -> Vec<Vec<Point>> {
        zone::waves(&self.upper_left)
    }

    #[must_use]
    pub fn ulz_count(&self) -> usize {
        self.upper_left.len()
    }

    /// Connected regions outside the upper-left zone.
    #[must_use]
    pub fn blobs(&self) -> &[Vec<Point>] {
        &self.blobs
    }

    /// Number of connected regions, the upper-left zone included.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.blobs.len() + 1
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.blob_count() == 1
    }

    /// Canonical bytes of the legal moves, ascending.
    #[must_use]
    pub fn playable_bytes(&self) -> &[u8] {
        &self.playable_bytes
    }

    /// Colors of the legal moves, in canonical byte order.
    #[must_use]
    pub fn playable_colors(&self) -> Vec<Color> {
        self.playable_bytes
            .iter()
            .map(|b| self.color_table[usize::from(*b)])
            .collect()
    }

    #[must_use]
    pub fn playable_count(&self) -> usize {
        self.playable_bytes.len()
    }

    #[must_use]
    pub fn is_playable(&self, color: Color) -> bool {
        self.byte_of_color(color)
            .is_some_and(|b| self.playable_bytes.contains(&b))
    }

    /// Actual color behind a canonical byte.
    #[must_use]
    pub fn color_of_byte(&self, byte: u8) -> Option<Color> {
        self.color_table.get(usize::from(byte)).copied()
    }

    /// Canonical byte of a color present on the board.
    #[must_use]
    pub fn byte_of_color(&self, color: Color) -> Option<u8> {
        self.color_table
            .iter()
            .position(|c| *c == color)
            .and_then(|i| u8::try_from(i).ok())
    }

    /// Dequeues the oldest batch of cells changed while building this state.
    pub fn pop_changes(&mut self) -> Option<Vec<Point>> {
        self.board.pop_changes()
    }
}
