use std::{fmt, sync::Arc, time::Duration};

use rand::Rng;

use crate::{Color, OutOfRangeError, core::Point};

use super::{
    settings::GameSettings,
    state::{GameState, PlayMode},
    strategy::{AsyncStrategy, CancellationToken, Strategy},
};

/// Externally owned cell storage driven by a [`Game`].
///
/// Indices are raster indices (`x + y * size`). The game only ever passes
/// indices inside the board.
pub trait BoardAccessor {
    fn get(&self, index: usize) -> Color;
    fn set(&mut self, index: usize, color: Color);
}

impl BoardAccessor for Vec<Color> {
    fn get(&self, index: usize) -> Color {
        self[index]
    }

    fn set(&mut self, index: usize, color: Color) {
        self[index] = color;
    }
}

/// [`BoardAccessor`] built from a getter/setter closure pair.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use floodit_engine::{BoardAccessor as _, Color, FnAccessor};
///
/// let cells = Rc::new(RefCell::new(vec![Color::RED; 4]));
/// let (r, w) = (Rc::clone(&cells), Rc::clone(&cells));
/// let mut accessor = FnAccessor::new(move |i| r.borrow()[i], move |i, c| w.borrow_mut()[i] = c);
/// accessor.set(3, Color::BLUE);
/// assert_eq!(accessor.get(3), Color::BLUE);
/// assert_eq!(cells.borrow()[3], Color::BLUE);
/// ```
pub struct FnAccessor<G, S> {
    getter: G,
    setter: S,
}

impl<G, S> FnAccessor<G, S>
where
    G: Fn(usize) -> Color,
    S: FnMut(usize, Color),
{
    pub fn new(getter: G, setter: S) -> Self {
        Self { getter, setter }
    }
}

impl<G, S> fmt::Debug for FnAccessor<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAccessor").finish_non_exhaustive()
    }
}

impl<G, S> BoardAccessor for FnAccessor<G, S>
where
    G: Fn(usize) -> Color,
    S: FnMut(usize, Color),
{
    fn get(&self, index: usize) -> Color {
        (self.getter)(index)
    }

    fn set(&mut self, index: usize, color: Color) {
        (self.setter)(index, color);
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameOutcome {
    /// The board is a single color.
    Finished,
    /// The strategy returned no move.
    GaveUp,
    /// Cancellation was requested before the board was solved.
    Cancelled,
}

type ColorPlayedListener = Box<dyn FnMut(Color) + Send>;

/// Turn engine: asks a strategy for colors until the board is solved.
///
/// The game keeps the authoritative [`GameState`] and mirrors every change into
/// the accessor, one change batch at a time.
///
/// # Example
///
/// ```
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// use floodit_engine::{Game, GameSettings, RandomStrategy};
///
/// let settings = GameSettings::with_size(4).unwrap();
/// let mut rng = Pcg64::seed_from_u64(0);
/// let mut game = Game::new(vec![settings.palette()[0]; 16], settings, &mut rng);
///
/// let outcome = game.play(&mut RandomStrategy::new(rng));
/// assert!(outcome.is_finished());
/// assert!(game.moves() > 0);
/// ```
pub struct Game<A> {
    accessor: A,
    state: GameState,
    play_mode: PlayMode,
    wave_delay: Duration,
    moves: usize,
    on_color_played: Option<ColorPlayedListener>,
}

impl<A> fmt::Debug for Game<A>
where
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("accessor", &self.accessor)
            .field("state", &self.state)
            .field("play_mode", &self.play_mode)
            .field("wave_delay", &self.wave_delay)
            .field("moves", &self.moves)
            .finish_non_exhaustive()
    }
}

impl<A> Game<A>
where
    A: BoardAccessor,
{
    /// Starts a game on a random board and writes it into `accessor`.
    pub fn new<R>(accessor: A, settings: impl Into<Arc<GameSettings>>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::from_state(accessor, GameState::random(settings, rng))
    }

    /// Starts a game from an existing state. Changes still queued on the state
    /// are written into `accessor`.
    pub fn from_state(accessor: A, state: GameState) -> Self {
        let mut game = Self {
            accessor,
            state,
            play_mode: PlayMode::default(),
            wave_delay: Duration::ZERO,
            moves: 0,
            on_color_played: None,
        };
        game.apply_changes();
        game
    }

    #[must_use]
    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    /// Delay between change batches in [`Game::play_async`].
    #[must_use]
    pub fn with_wave_delay(mut self, delay: Duration) -> Self {
        self.wave_delay = delay;
        self
    }

    /// Registers a callback invoked with every color that is actually played.
    pub fn on_color_played(&mut self, listener: impl FnMut(Color) + Send + 'static) {
        self.on_color_played = Some(Box::new(listener));
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        self.state.settings()
    }

    #[must_use]
    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    pub fn into_accessor(self) -> A {
        self.accessor
    }

    /// Number of colors played so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[must_use]
    pub fn upper_left(&self) -> Color {
        self.accessor.get(0)
    }

    /// Reads a cell through the accessor.
    pub fn cell(&self, x: usize, y: usize) -> Result<Color, OutOfRangeError> {
        let size = self.state.size();
        if x >= size || y >= size {
            return Err(OutOfRangeError { x, y, size });
        }
        Ok(self.accessor.get(Point::new(x, y).index(size)))
    }

    /// Runs the game to completion with a synchronous strategy.
    pub fn play<S>(&mut self, mut strategy: S) -> GameOutcome
    where
        S: Strategy,
    {
        while !self.is_finished() {
            let Some(color) = strategy.select_move(&self.state) else {
                return GameOutcome::GaveUp;
            };
            if self.advance(color) {
                self.apply_changes();
            }
        }
        GameOutcome::Finished
    }

    /// Runs the game to completion with a suspendable strategy.
    ///
    /// `cancel` is checked at the start of every turn. Change batches are
    /// written whole, with the configured wave delay between them.
    pub async fn play_async<S>(
        &mut self,
        mut strategy: S,
        cancel: &CancellationToken,
    ) -> GameOutcome
    where
        S: AsyncStrategy,
    {
        while !self.is_finished() {
            if cancel.is_cancelled() {
                return GameOutcome::Cancelled;
            }
            let Some(color) = strategy.select_move_async(&self.state, cancel).await else {
                return if cancel.is_cancelled() {
                    GameOutcome::Cancelled
                } else {
                    GameOutcome::GaveUp
                };
            };
            if self.advance(color) {
                self.apply_changes_paced().await;
            }
        }
        GameOutcome::Finished
    }

    /// Plays `color` on the authoritative state. Returns `false` when the move
    /// is rejected as a repeat of the upper-left color or a color outside the
    /// palette.
    fn advance(&mut self, color: Color) -> bool {
        if !self.settings().palette().contains(&color) {
            log::trace!("ignoring color {color} outside of the palette");
            return false;
        }
        if self.settings().prevent_same_brush() && color == self.state.upper_left() {
            log::trace!("ignoring repeated upper-left color {color}");
            return false;
        }
        if let Some(listener) = &mut self.on_color_played {
            listener(color);
        }
        self.moves += 1;
        self.state = self.state.play_color(color, self.play_mode);
        true
    }

    fn apply_batch(&mut self, batch: &[Point]) {
        let size = self.state.size();
        let board = self.state.board();
        for point in batch {
            let color = board.cell(*point);
            self.accessor.set(point.index(size), color);
        }
    }

    fn apply_changes(&mut self) {
        while let Some(batch) = self.state.pop_changes() {
            self.apply_batch(&batch);
        }
    }

    async fn apply_changes_paced(&mut self) {
        while let Some(batch) = self.state.pop_changes() {
            if !self.wave_delay.is_zero() {
                tokio::time::sleep(self.wave_delay).await;
            }
            self.apply_batch(&batch);
        }
    }
}
