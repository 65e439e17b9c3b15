use floodit_engine::{Color, GameSettings, GameState, MoveBudget, PlayMode, Strategy};
use rand::Rng;

use crate::{
    InputLengthError, RewardWeights, SettingsMismatchError,
    action::{action_bytes, random_action},
};

use super::network::NeuralNetwork;

/// Canonical board as network input.
fn inputs(state: &GameState) -> Vec<f32> {
    state.canonical().iter().map(|b| f32::from(*b)).collect()
}

/// Action byte the network prefers: the first maximal output, plus one.
///
/// A board that does not fit the network is logged and ends the game.
fn preferred_byte(
    network: &NeuralNetwork,
    state: &GameState,
) -> Result<Option<u8>, InputLengthError> {
    let ys = network.feed_forward(&inputs(state)).inspect_err(|e| {
        log::error!("network does not fit the {0}x{0} board: {e}", state.size());
    })?;
    let mut best: Option<(usize, f32)> = None;
    for (i, y) in ys.into_iter().enumerate() {
        if best.is_none_or(|(_, v)| y > v) {
            best = Some((i, y));
        }
    }
    Ok(best.and_then(|(index, _)| u8::try_from(index + 1).ok()))
}

fn is_legal(state: &GameState, byte: u8) -> bool {
    action_bytes(state).any(|b| b == byte)
}

/// Training strategy: plays the network's choice (or a random legal color when
/// that choice is illegal) and sums the shaped reward of every move.
#[derive(Debug)]
pub struct NetworkTrainer<'a, R: ?Sized> {
    network: &'a NeuralNetwork,
    weights: RewardWeights,
    fitness: f32,
    budget: MoveBudget,
    rng: &'a mut R,
}

impl<'a, R> NetworkTrainer<'a, R>
where
    R: Rng + ?Sized,
{
    /// Fails when boards of `settings` do not fit `network`.
    pub fn new(
        network: &'a NeuralNetwork,
        settings: &GameSettings,
        rng: &'a mut R,
    ) -> Result<Self, SettingsMismatchError> {
        network.check_settings(settings)?;
        Ok(Self {
            network,
            weights: RewardWeights::default(),
            fitness: 0.0,
            budget: MoveBudget::default(),
            rng,
        })
    }

    #[must_use]
    pub fn with_max_moves(mut self, max: usize) -> Self {
        self.budget = MoveBudget::new(max);
        self
    }

    #[must_use]
    pub fn with_reward_weights(mut self, weights: RewardWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Reward accumulated so far.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

impl<R> Strategy for NetworkTrainer<'_, R>
where
    R: Rng + ?Sized,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        if !self.budget.spend() {
            return None;
        }
        let action = match preferred_byte(self.network, state).ok()? {
            Some(b) if is_legal(state, b) => b,
            _ => random_action(state, &mut *self.rng)?,
        };
        let color = state.color_of_byte(action)?;
        let next = state.play_color(color, PlayMode::Flat);
        self.fitness += self.weights.reward(state, &next);
        Some(color)
    }
}

/// Tracks the last index of the upper-left color within one upper-left-zone
/// size. A repeated index means the previous moves changed nothing useful.
#[derive(Debug, Default, Clone)]
struct StallGuard {
    ulz_count: Option<usize>,
    seen: Vec<Option<usize>>,
}

impl StallGuard {
    /// Records `state`; returns `false` when it repeats an already seen position.
    fn observe(&mut self, state: &GameState) -> bool {
        let last_zero = state.canonical().iter().rposition(|b| *b == 0);
        if self.ulz_count != Some(state.ulz_count()) {
            self.ulz_count = Some(state.ulz_count());
            self.seen.clear();
            self.seen.push(last_zero);
            return true;
        }
        if self.seen.contains(&last_zero) {
            return false;
        }
        self.seen.push(last_zero);
        true
    }
}

/// Inference strategy playing the network's choices.
///
/// Illegal choices fall back to a random legal color, and a board the network
/// does not fit ends the game. With
/// [`NetworkPlayer::with_stall_guard`], a random color is also forced whenever
/// the board stops making progress.
#[derive(Debug)]
pub struct NetworkPlayer<'a, R> {
    network: &'a NeuralNetwork,
    rng: R,
    budget: MoveBudget,
    stall_guard: Option<StallGuard>,
}

impl<'a, R> NetworkPlayer<'a, R>
where
    R: Rng,
{
    /// Fails when boards of `settings` do not fit `network`.
    pub fn new(
        network: &'a NeuralNetwork,
        settings: &GameSettings,
        rng: R,
    ) -> Result<Self, SettingsMismatchError> {
        network.check_settings(settings)?;
        Ok(Self {
            network,
            rng,
            budget: MoveBudget::default(),
            stall_guard: None,
        })
    }

    #[must_use]
    pub fn with_max_moves(mut self, max: usize) -> Self {
        self.budget = MoveBudget::new(max);
        self
    }

    #[must_use]
    pub fn with_stall_guard(mut self) -> Self {
        self.stall_guard = Some(StallGuard::default());
        self
    }
}

impl<R> Strategy for NetworkPlayer<'_, R>
where
    R: Rng,
{
    fn select_move(&mut self, state: &GameState) -> Option<Color> {
        if !self.budget.spend() {
            return None;
        }
        let progressing = self
            .stall_guard
            .as_mut()
            .is_none_or(|guard| guard.observe(state));
        let action = match preferred_byte(self.network, state).ok()? {
            Some(b) if progressing && is_legal(state, b) => b,
            Some(b) if !progressing => {
                log::warn!("stalled on byte {b}, playing a random color");
                random_action(state, &mut self.rng)?
            }
            _ => random_action(state, &mut self.rng)?,
        };
        state.color_of_byte(action)
    }
}

#[cfg(test)]
mod tests {
    use floodit_engine::{Game, GameOutcome, GameSettings};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::nn::{Activation, DenseLayer};

    /// One-layer identity network whose output `i` is the constant `biases[i]`.
    fn constant_network(inputs: usize, biases: Vec<f32>) -> NeuralNetwork {
        let rows = vec![vec![0.0; inputs]; biases.len()];
        let layer = DenseLayer::from_parts(rows, biases, Activation::Identity).unwrap();
        NeuralNetwork::from_layers(vec![layer]).unwrap()
    }

    fn settings() -> GameSettings {
        GameSettings::new(2, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap()
    }

    #[test]
    fn test_player_plays_preferred_legal_byte() {
        // R B / G R: canonical [0, 1, 2, 0]
        let state = GameState::from_cells(
            settings(),
            vec![Color::RED, Color::BLUE, Color::GREEN, Color::RED],
        )
        .unwrap();
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut player = network.player(&settings(), Pcg64::seed_from_u64(0)).unwrap();
        assert_eq!(player.select_move(&state), Some(Color::GREEN));

        let network = constant_network(4, vec![1.0, 1.0]);
        let mut player = network.player(&settings(), Pcg64::seed_from_u64(0)).unwrap();
        assert_eq!(player.select_move(&state), Some(Color::BLUE));
    }

    #[test]
    fn test_illegal_preference_falls_back_to_random() {
        // R B / B R: canonical [0, 1, 1, 0], byte 2 does not exist
        let state = GameState::from_cells(
            settings(),
            vec![Color::RED, Color::BLUE, Color::BLUE, Color::RED],
        )
        .unwrap();
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut player = network.player(&settings(), Pcg64::seed_from_u64(0)).unwrap();
        assert_eq!(player.select_move(&state), Some(Color::BLUE));
    }

    #[test]
    fn test_player_gives_up_after_budget() {
        let state = GameState::random(settings(), &mut Pcg64::seed_from_u64(1));
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut player = network
            .player(&settings(), Pcg64::seed_from_u64(0))
            .unwrap()
            .with_max_moves(3);
        assert!(player.select_move(&state).is_some());
        assert!(player.select_move(&state).is_some());
        assert_eq!(player.select_move(&state), None);
    }

    #[test]
    fn test_stall_guard_detects_repeated_position() {
        let state = GameState::from_cells(
            settings(),
            vec![Color::RED, Color::BLUE, Color::GREEN, Color::RED],
        )
        .unwrap();
        let mut guard = StallGuard::default();
        assert!(guard.observe(&state));
        assert!(!guard.observe(&state));
        assert!(!guard.observe(&state));

        let next = state.play_color(Color::BLUE, PlayMode::Flat);
        assert!(guard.observe(&next));
    }

    #[test]
    fn test_guarded_player_forces_random_on_stall() {
        // R B / G R: canonical [0, 1, 2, 0]
        let state = GameState::from_cells(
            settings(),
            vec![Color::RED, Color::BLUE, Color::GREEN, Color::RED],
        )
        .unwrap();
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut player = network
            .player(&settings(), Pcg64::seed_from_u64(0))
            .unwrap()
            .with_stall_guard();
        assert_eq!(player.select_move(&state), Some(Color::GREEN));
        let colors = (0..20)
            .filter_map(|_| player.select_move(&state))
            .collect::<Vec<_>>();
        assert!(colors.contains(&Color::BLUE));
        assert!(colors.iter().all(|c| *c == Color::BLUE || *c == Color::GREEN));
    }

    #[test]
    fn test_trainer_accumulates_reward() {
        // R B / G R: canonical [0, 1, 2, 0]. Playing green: ulz +1, blobs -1,
        // playable unchanged, not finished, so 1 + 1 - 1.
        let state = GameState::from_cells(
            settings(),
            vec![Color::RED, Color::BLUE, Color::GREEN, Color::RED],
        )
        .unwrap();
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut rng = Pcg64::seed_from_u64(0);
        let mut trainer = NetworkTrainer::new(&network, &settings(), &mut rng).unwrap();
        assert_eq!(trainer.select_move(&state), Some(Color::GREEN));
        assert_eq!(trainer.fitness(), 1.0);
    }

    #[test]
    fn test_trainer_ends_games() {
        let mut rng = Pcg64::seed_from_u64(2);
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut game = Game::new(vec![Color::RED; 4], settings(), &mut rng);
        let mut trainer = NetworkTrainer::new(&network, &settings(), &mut rng)
            .unwrap()
            .with_max_moves(50);
        let outcome = game.play(&mut trainer);
        assert_eq!(outcome, GameOutcome::Finished);
    }

    #[test]
    fn test_mismatched_settings_are_rejected() {
        let network = constant_network(4, vec![0.0, 1.0]);
        let wide = GameSettings::new(5, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap();
        assert_eq!(
            network.player(&wide, Pcg64::seed_from_u64(0)).unwrap_err(),
            SettingsMismatchError::InputSize { cells: 25, input: 4 }
        );
        let mut rng = Pcg64::seed_from_u64(0);
        let eight_colors = GameSettings::with_size(2).unwrap();
        assert_eq!(
            NetworkTrainer::new(&network, &eight_colors, &mut rng).unwrap_err(),
            SettingsMismatchError::OutputSize {
                output: 2,
                palette: 8
            }
        );
    }

    #[test]
    fn test_board_that_does_not_fit_ends_the_game() {
        let network = constant_network(4, vec![0.0, 1.0]);
        let mut player = network.player(&settings(), Pcg64::seed_from_u64(0)).unwrap();
        let wide = GameSettings::new(5, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap();
        let state = GameState::random(wide, &mut Pcg64::seed_from_u64(1));
        assert_eq!(player.select_move(&state), None);
    }
}
