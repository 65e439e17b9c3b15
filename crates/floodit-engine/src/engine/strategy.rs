use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use rand::{Rng, seq::IndexedRandom as _};

use crate::Color;

use super::state::GameState;

/// Default number of moves after which a player gives up.
pub const DEFAULT_MAX_MOVES: usize = 1000;

/// A move-selection policy.
///
/// Returning `None` means the strategy gives up; the game then ends
/// unsuccessfully.
pub trait Strategy {
    fn select_move(&mut self, state: &GameState) -> Option<Color>;
}

impl<S> Strategy for &mut S
where
    S: Strategy + ?Sized,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        (**self).select_move(state)
    }
}

impl<S> Strategy for Box<S>
where
    S: Strategy + ?Sized,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        (**self).select_move(state)
    }
}

/// A move-selection policy that may suspend while choosing.
///
/// Implementations should return `None` promptly once `cancel` is triggered.
pub trait AsyncStrategy {
    fn select_move_async(
        &mut self,
        state: &GameState,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Option<Color>>;
}

/// Cooperative cancellation flag shared between a running game and its controller.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Counts moves and signals when a player has used up its allowance.
///
/// The `max`-th request is refused, so at most `max - 1` moves are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveBudget {
    max: usize,
    used: usize,
}

impl Default for MoveBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MOVES)
    }
}

impl MoveBudget {
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Records a move request. Returns `false` once the budget is exhausted.
    pub fn spend(&mut self) -> bool {
        self.used += 1;
        self.used < self.max
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

/// Plays a uniformly random legal color.
#[derive(Debug, Clone)]
pub struct RandomStrategy<R> {
    rng: R,
    budget: MoveBudget,
}

impl<R> RandomStrategy<R>
where
    R: Rng,
{
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            budget: MoveBudget::default(),
        }
    }

    #[must_use]
    pub fn with_max_moves(mut self, max: usize) -> Self {
        self.budget = MoveBudget::new(max);
        self
    }
}

impl<R> Strategy for RandomStrategy<R>
where
    R: Rng,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        if !self.budget.spend() {
            return None;
        }
        state.playable_colors().choose(&mut self.rng).copied()
    }
}

/// Turns a synchronous strategy into a suspendable one that waits `delay`
/// before each move.
///
/// Cancellation is checked after the delay, so a cancelled game never receives
/// a late move.
#[derive(Debug, Clone)]
pub struct Paced<S> {
    inner: S,
    delay: Duration,
}

impl<S> Paced<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> AsyncStrategy for Paced<S>
where
    S: Strategy,
{
    async fn select_move_async(
        &mut self,
        state: &GameState,
        cancel: &CancellationToken,
    ) -> Option<Color> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if cancel.is_cancelled() {
            return None;
        }
        self.inner.select_move(state)
    }
}
