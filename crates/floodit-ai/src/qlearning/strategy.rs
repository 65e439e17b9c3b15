use floodit_engine::{Color, GameState, MoveBudget, PlayMode, Strategy};
use rand::Rng;

use crate::{
    RewardWeights,
    action::{action_bytes, random_action},
};

use super::table::{QTable, bellman_update};

/// Epsilon-greedy training strategy.
///
/// Every move updates the table with the Bellman rule and records the reward of
/// the move.
#[derive(Debug)]
pub(crate) struct Learner<'a, R: ?Sized> {
    pub(crate) table: &'a mut QTable,
    pub(crate) alpha: f32,
    pub(crate) gamma: f32,
    pub(crate) weights: RewardWeights,
    pub(crate) exploration: f64,
    pub(crate) budget: MoveBudget,
    pub(crate) rewards: Vec<f32>,
    pub(crate) rng: &'a mut R,
}

impl<R> Learner<'_, R>
where
    R: Rng + ?Sized,
{
    /// Greedy action over the legal bytes; on ties the last maximum wins.
    fn greedy(row: &[f32], state: &GameState) -> Option<u8> {
        let mut best = None;
        let mut best_value = f32::MIN;
        for b in action_bytes(state) {
            let Some(&value) = row.get(usize::from(b) - 1) else {
                continue;
            };
            if best_value <= value {
                best = Some(b);
                best_value = value;
            }
        }
        best
    }

    /// Average reward of the moves played so far, `0.0` if none.
    #[expect(clippy::cast_precision_loss)]
    pub(crate) fn average_reward(&self) -> f32 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().sum::<f32>() / self.rewards.len() as f32
        }
    }
}

impl<R> Strategy for Learner<'_, R>
where
    R: Rng + ?Sized,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        if !self.budget.spend() {
            return None;
        }
        let key = state.canonical();
        let greedy = Self::greedy(self.table.row_mut(key), state);
        let explore = self.rng.random::<f64>() < self.exploration;
        let action = match greedy {
            Some(b) if !explore => b,
            _ => random_action(state, &mut *self.rng)?,
        };
        let color = state.color_of_byte(action)?;

        let next = state.play_color(color, PlayMode::Flat);
        let reward = self.weights.reward(state, &next);
        self.rewards.push(reward);

        let max_next = self.table.best_value(next.canonical());
        if let Some(value) = self.table.row_mut(key).get_mut(usize::from(action) - 1) {
            *value = bellman_update(*value, self.alpha, self.gamma, reward, max_next);
        }
        Some(color)
    }
}

/// Greedy inference strategy over a learned table.
///
/// Boards missing from the table get a random legal color.
#[derive(Debug)]
pub struct QPlayer<'a, R> {
    table: &'a QTable,
    rng: R,
    budget: MoveBudget,
}

impl<'a, R> QPlayer<'a, R>
where
    R: Rng,
{
    pub(crate) fn new(table: &'a QTable, rng: R) -> Self {
        Self {
            table,
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

impl<R> Strategy for QPlayer<'_, R>
where
    R: Rng,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        if !self.budget.spend() {
            return None;
        }
        let best = self.table.row(state.canonical()).and_then(|row| {
            let mut best = None;
            let mut best_value = f32::MIN;
            for b in action_bytes(state) {
                let Some(&value) = row.get(usize::from(b) - 1) else {
                    continue;
                };
                if best_value < value {
                    best = Some(b);
                    best_value = value;
                }
            }
            best
        });
        let action = match best {
            Some(b) => b,
            None => random_action(state, &mut self.rng)?,
        };
        state.color_of_byte(action)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use floodit_engine::GameSettings;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    // R G / B B: canonical [0, 1, 2, 2], actions are bytes 1 (green) and 2 (blue)
    fn state() -> GameState {
        let settings =
            Arc::new(GameSettings::new(2, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap());
        GameState::from_cells(
            settings,
            vec![Color::RED, Color::GREEN, Color::BLUE, Color::BLUE],
        )
        .unwrap()
    }

    fn table_with_row(state: &GameState, row: Vec<f32>) -> QTable {
        let mut table = QTable::new(2);
        table.insert(state.canonical().clone(), row);
        table
    }

    fn learner<'a>(
        table: &'a mut QTable,
        exploration: f64,
        rng: &'a mut Pcg64,
    ) -> Learner<'a, Pcg64> {
        Learner {
            table,
            alpha: 0.5,
            gamma: 0.9,
            weights: RewardWeights::default(),
            exploration,
            budget: MoveBudget::default(),
            rewards: vec![],
            rng,
        }
    }

    #[test]
    fn test_greedy_picks_last_maximum() {
        let state = state();
        assert_eq!(Learner::<Pcg64>::greedy(&[0.5, 0.5], &state), Some(2));
        assert_eq!(Learner::<Pcg64>::greedy(&[0.7, 0.5], &state), Some(1));
        assert_eq!(Learner::<Pcg64>::greedy(&[-3.0, -2.0], &state), Some(2));
        assert_eq!(Learner::<Pcg64>::greedy(&[], &state), None);
    }

    #[test]
    fn test_learner_updates_played_action() {
        let state = state();
        let mut table = table_with_row(&state, vec![0.0, 0.0]);
        // B G / B B after playing blue: canonical [0, 1, 0, 0]
        let next = state.play_color(Color::BLUE, PlayMode::Flat);
        table.insert(next.canonical().clone(), vec![3.0, -1.0]);
        let reward = RewardWeights::default().reward(&state, &next);

        let mut rng = Pcg64::seed_from_u64(0);
        let mut agent = learner(&mut table, 0.0, &mut rng);
        assert_eq!(agent.select_move(&state), Some(Color::BLUE));
        assert_eq!(agent.rewards, vec![reward]);
        assert_eq!(agent.average_reward(), reward);

        let expected = bellman_update(0.0, 0.5, 0.9, reward, 3.0);
        assert_eq!(table.row(state.canonical()), Some(&[0.0, expected][..]));
    }

    #[test]
    fn test_learner_creates_rows_for_new_boards() {
        let state = state();
        let mut table = QTable::new(2);
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(learner(&mut table, 0.0, &mut rng).select_move(&state).is_some());
        assert_eq!(table.len(), 1);
        assert!(table.row(state.canonical()).is_some());
    }

    #[test]
    fn test_exploration_overrides_greedy_choice() {
        let state = state();

        let mut table = table_with_row(&state, vec![10.0, 0.0]);
        let mut rng = Pcg64::seed_from_u64(2);
        let mut greedy = learner(&mut table, 0.0, &mut rng);
        let colors = (0..50)
            .filter_map(|_| greedy.select_move(&state))
            .collect::<Vec<_>>();
        assert_eq!(colors, vec![Color::GREEN; 50]);

        let mut table = table_with_row(&state, vec![10.0, 0.0]);
        let mut rng = Pcg64::seed_from_u64(3);
        let mut explorer = learner(&mut table, 1.0, &mut rng);
        let colors = (0..50)
            .filter_map(|_| explorer.select_move(&state))
            .collect::<Vec<_>>();
        assert_eq!(colors.len(), 50);
        assert!(colors.contains(&Color::BLUE));
        assert!(colors.iter().all(|c| *c == Color::GREEN || *c == Color::BLUE));
    }

    #[test]
    fn test_player_picks_first_maximum() {
        let state = state();
        let table = table_with_row(&state, vec![0.5, 0.5]);
        let mut player = QPlayer::new(&table, Pcg64::seed_from_u64(0));
        assert_eq!(player.select_move(&state), Some(Color::GREEN));

        let table = table_with_row(&state, vec![-2.0, -1.0]);
        let mut player = QPlayer::new(&table, Pcg64::seed_from_u64(0));
        assert_eq!(player.select_move(&state), Some(Color::BLUE));
    }

    #[test]
    fn test_player_plays_random_on_unseen_board() {
        let state = state();
        let table = QTable::new(2);
        let mut player = QPlayer::new(&table, Pcg64::seed_from_u64(4));
        let colors = (0..30)
            .filter_map(|_| player.select_move(&state))
            .collect::<Vec<_>>();
        assert_eq!(colors.len(), 30);
        assert!(colors.contains(&Color::GREEN));
        assert!(colors.contains(&Color::BLUE));
    }
}
