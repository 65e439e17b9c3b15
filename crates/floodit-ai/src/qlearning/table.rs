use std::collections::HashMap;

use floodit_engine::CanonicalBoard;
use serde::{Deserialize, Serialize};

/// Sparse action-value table keyed by canonical board.
///
/// Each row has one value per action; action `i` stands for canonical byte
/// `i + 1` (byte 0, the upper-left color, is never an action). Rows are created
/// zero-filled on first visit.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    action_count: usize,
    rows: HashMap<CanonicalBoard, Vec<f32>>,
}

impl QTable {
    #[must_use]
    pub fn new(action_count: usize) -> Self {
        Self {
            action_count,
            rows: HashMap::new(),
        }
    }

    /// Number of values per row.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Number of visited boards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, board: &CanonicalBoard) -> Option<&[f32]> {
        self.rows.get(board).map(Vec::as_slice)
    }

    /// Returns the row of `board`, creating a zero-filled one if needed.
    pub fn row_mut(&mut self, board: &CanonicalBoard) -> &mut [f32] {
        self.rows
            .entry(board.clone())
            .or_insert_with(|| vec![0.0; self.action_count])
    }

    pub(crate) fn insert(&mut self, board: CanonicalBoard, row: Vec<f32>) {
        self.rows.insert(board, row);
    }

    /// Best value of a board's row, or `0.0` for a board never visited.
    #[must_use]
    pub fn best_value(&self, board: &CanonicalBoard) -> f32 {
        self.row(board).map_or(0.0, |row| {
            row.iter()
                .copied()
                .fold(f32::MIN, |max, v| if max <= v { v } else { max })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalBoard, &[f32])> {
        self.rows.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

/// One Bellman update: `(1 - alpha) * value + alpha * (reward + gamma * max_next)`.
///
/// ```
/// use floodit_ai::qlearning::bellman_update;
///
/// assert_eq!(bellman_update(0.0, 0.5, 0.9, 2.0, 0.0), 1.0);
/// ```
#[must_use]
pub fn bellman_update(value: f32, alpha: f32, gamma: f32, reward: f32, max_next: f32) -> f32 {
    (1.0 - alpha) * value + alpha * (reward + gamma * max_next)
}

/// Exploration probability for the `n`-th episode of a learning batch:
/// `max(min_probability, exp(-decay * n))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    pub min_probability: f64,
    pub decay: f64,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            min_probability: 0.0005,
            decay: 0.3,
        }
    }
}

impl ExplorationSchedule {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn probability(&self, episode: usize) -> f64 {
        f64::max(self.min_probability, (-self.decay * episode as f64).exp())
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_rows_are_created_lazily() {
        let mut table = QTable::new(3);
        let board = CanonicalBoard::from_bytes(vec![0, 1, 2, 1]);
        assert_eq!(table.row(&board), None);
        assert_eq!(table.best_value(&board), 0.0);

        table.row_mut(&board)[1] = 2.5;
        assert_eq!(table.row(&board), Some(&[0.0, 2.5, 0.0][..]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.best_value(&board), 2.5);
    }

    #[test]
    fn test_best_value_of_negative_row() {
        let mut table = QTable::new(2);
        let board = CanonicalBoard::from_bytes(vec![0, 1]);
        table.row_mut(&board).copy_from_slice(&[-3.0, -1.0]);
        assert_eq!(table.best_value(&board), -1.0);
    }

    #[test]
    fn test_bellman_example() {
        let mut table = QTable::new(3);
        let board = CanonicalBoard::from_bytes(vec![0, 1, 2, 3]);
        let row = table.row_mut(&board);
        row[0] = bellman_update(row[0], 0.5, 0.9, 2.0, 0.0);
        assert_eq!(table.row(&board), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_update_stays_between_old_value_and_target() {
        let mut rng = Pcg64::seed_from_u64(42);
        for _ in 0..1000 {
            let value = rng.random_range(-10.0..10.0);
            let alpha = rng.random_range(0.0..=1.0);
            let gamma = rng.random_range(0.0..=1.0);
            let reward = rng.random_range(-10.0..10.0);
            let max_next = rng.random_range(-10.0..10.0);
            let target = reward + gamma * max_next;
            let updated = bellman_update(value, alpha, gamma, reward, max_next);
            let (lo, hi) = if value <= target {
                (value, target)
            } else {
                (target, value)
            };
            let eps = 1e-4;
            assert!(lo - eps <= updated && updated <= hi + eps, "{updated} not in [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_exploration_schedule() {
        let schedule = ExplorationSchedule::default();
        assert_eq!(schedule.probability(0), 1.0);
        assert!(schedule.probability(1) < 1.0);
        assert!(schedule.probability(5) > schedule.probability(6));
        assert_eq!(schedule.probability(100), 0.0005);
    }
}
