//! Reward shaping shared by the Q-learner and the network trainer.

use floodit_engine::GameState;
use serde::{Deserialize, Serialize};

/// Weights of the reward computed from a move's before/after states.
///
/// ```text
/// r = upper_left * Δulz + blobs * Δblobs + playable * Δplayable + finished * [finished] + move_cost
/// ```
///
/// where `Δulz = new.ulz - old.ulz`, `Δblobs = old.blobs - new.blobs` and
/// `Δplayable = old.playable - new.playable`, so growing the upper-left zone,
/// merging regions and eliminating colors are all rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    pub upper_left: f32,
    pub blobs: f32,
    pub playable: f32,
    pub finished: f32,
    pub move_cost: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            upper_left: 1.0,
            blobs: 1.0,
            playable: 2.0,
            finished: 3.0,
            move_cost: -1.0,
        }
    }
}

impl RewardWeights {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn reward(&self, old: &GameState, new: &GameState) -> f32 {
        let delta = |old: usize, new: usize| new as f32 - old as f32;
        let ulz = delta(old.ulz_count(), new.ulz_count());
        let blobs = -delta(old.blob_count(), new.blob_count());
        let playable = -delta(old.playable_count(), new.playable_count());
        let finished = if new.is_finished() { 1.0 } else { 0.0 };

        ulz * self.upper_left
            + blobs * self.blobs
            + playable * self.playable
            + finished * self.finished
            + self.move_cost
    }
}

#[cfg(test)]
mod tests {
    use floodit_engine::{Color, GameSettings, PlayMode};

    use super::*;

    const A: Color = Color::RED;
    const B: Color = Color::BLUE;
    const C: Color = Color::GREEN;

    #[test]
    fn test_finishing_move() {
        let settings = GameSettings::new(2, vec![A, B]).unwrap();
        let old = GameState::from_cells(settings, vec![A, B, B, B]).unwrap();
        let new = old.play_color(B, PlayMode::Flat);
        // Δulz = 3, Δblobs = 1, Δplayable = 1, finished
        assert_eq!(RewardWeights::default().reward(&old, &new), 3.0 + 1.0 + 2.0 + 3.0 - 1.0);
    }

    #[test]
    fn test_move_that_splits_nothing() {
        let settings = GameSettings::new(3, vec![A, B, C]).unwrap();
        // A B C
        // C C C
        // C C C
        let old = GameState::from_cells(settings, vec![A, B, C, C, C, C, C, C, C]).unwrap();
        let new = old.play_color(B, PlayMode::Flat);
        // ulz 1 -> 2, blobs 3 -> 2, playable 2 -> 1
        assert_eq!(RewardWeights::default().reward(&old, &new), 1.0 + 1.0 + 2.0 - 1.0);
    }

    #[test]
    fn test_custom_weights() {
        let settings = GameSettings::new(2, vec![A, B]).unwrap();
        let old = GameState::from_cells(settings, vec![A, B, B, B]).unwrap();
        let new = old.play_color(B, PlayMode::Flat);
        let weights = RewardWeights {
            upper_left: 0.0,
            blobs: 0.0,
            playable: 0.0,
            finished: 10.0,
            move_cost: 0.0,
        };
        assert_eq!(weights.reward(&old, &new), 10.0);
    }
}
