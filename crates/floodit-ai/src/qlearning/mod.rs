//! Tabular Q-learning over canonical boards.
//!
//! A [`QLearning`] agent owns a [`QTable`] mapping each visited canonical board
//! to one value per action. [`QLearning::learn`] plays a batch of episodes on
//! fresh random boards with an epsilon-greedy learner:
//!
//! 1. Look up (or create) the row of the current board
//! 2. Pick the best legal action, or a random one with the exploration probability
//! 3. Play it and compute the shaped reward ([`RewardWeights`])
//! 4. `Q(s, a) = (1 - alpha) * Q(s, a) + alpha * (r + gamma * max Q(s', .))`
//!
//! The exploration probability depends only on the episode index inside the
//! current batch ([`ExplorationSchedule`]), so a reloaded agent resumes exactly
//! like the agent it was saved from would.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! use floodit_ai::qlearning::QLearning;
//! use floodit_engine::{Color, GameSettings};
//!
//! let settings = GameSettings::new(3, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap();
//! let mut agent = QLearning::new(0.1, 0.9, settings).unwrap();
//! let mut rng = Pcg64::seed_from_u64(0);
//! let report = agent.learn(20, &mut rng);
//! assert_eq!(report.episodes, 20);
//! assert!(!agent.table().is_empty());
//! ```

use std::{collections::BTreeMap, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use floodit_engine::{CanonicalBoard, Game, GameSettings, MoveBudget, PlayMode};
use floodit_stats::{descriptive::DescriptiveStats, threshold::ThresholdCounts};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{HyperParameterError, LoadError, RewardWeights};

pub use self::{
    strategy::QPlayer,
    table::{ExplorationSchedule, QTable, bellman_update},
};

use self::strategy::Learner;

mod strategy;
mod table;

/// Q-learning agent bound to one [`GameSettings`].
#[derive(Debug, Clone, PartialEq)]
pub struct QLearning {
    alpha: f32,
    gamma: f32,
    settings: Arc<GameSettings>,
    table: QTable,
    exploration: ExplorationSchedule,
    rewards: RewardWeights,
}

/// Reward statistics of one [`QLearning::learn`] call.
///
/// Each sample is the average reward of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub episodes: usize,
    /// Mean of the per-episode average rewards.
    pub average_reward: f32,
    pub stats: Option<DescriptiveStats>,
    /// Episodes with an average reward `< 0`, in `[0, 1)`, in `[1, 2)` and `>= 2`.
    pub buckets: ThresholdCounts,
}

impl QLearning {
    pub fn new(
        alpha: f32,
        gamma: f32,
        settings: impl Into<Arc<GameSettings>>,
    ) -> Result<Self, HyperParameterError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(HyperParameterError::Alpha(alpha));
        }
        if !(0.0..=1.0).contains(&gamma) {
            return Err(HyperParameterError::Gamma(gamma));
        }
        let settings = settings.into();
        let table = QTable::new(settings.palette().len() - 1);
        Ok(Self {
            alpha,
            gamma,
            settings,
            table,
            exploration: ExplorationSchedule::default(),
            rewards: RewardWeights::default(),
        })
    }

    #[must_use]
    pub fn with_exploration(mut self, exploration: ExplorationSchedule) -> Self {
        self.exploration = exploration;
        self
    }

    #[must_use]
    pub fn with_reward_weights(mut self, rewards: RewardWeights) -> Self {
        self.rewards = rewards;
        self
    }

    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[must_use]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<GameSettings> {
        &self.settings
    }

    #[must_use]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    #[must_use]
    pub fn exploration(&self) -> &ExplorationSchedule {
        &self.exploration
    }

    /// Plays `batch` training episodes and updates the table.
    pub fn learn<R>(&mut self, batch: usize, rng: &mut R) -> BatchReport
    where
        R: Rng + ?Sized,
    {
        let mut episode_rewards = Vec::with_capacity(batch);
        for n in 0..batch {
            let cells = vec![self.settings.palette()[0]; self.settings.cell_count()];
            let mut game =
                Game::new(cells, Arc::clone(&self.settings), rng).with_play_mode(PlayMode::Flat);
            let mut learner = Learner {
                table: &mut self.table,
                alpha: self.alpha,
                gamma: self.gamma,
                weights: self.rewards,
                exploration: self.exploration.probability(n),
                budget: MoveBudget::default(),
                rewards: vec![],
                rng: &mut *rng,
            };
            let outcome = game.play(&mut learner);
            log::trace!(
                "episode {n}: {outcome:?} after {} moves, {} boards known",
                game.moves(),
                learner.table.len()
            );
            episode_rewards.push(learner.average_reward());
        }

        let report = BatchReport::new(episode_rewards);
        if let (Some(stats), [negative, bad, good, great]) =
            (&report.stats, &report.buckets.counts[..])
        {
            log::debug!(
                "N = {negative}, B = {bad}, Go = {good}, Gr = {great}, Med = {}",
                stats.median
            );
        }
        report
    }

    /// Greedy player over the learned table.
    pub fn player<R>(&self, rng: R) -> QPlayer<'_, R>
    where
        R: Rng,
    {
        QPlayer::new(&self.table, rng)
    }

    #[must_use]
    pub fn to_document(&self) -> QDocument {
        let q = self
            .table
            .iter()
            .map(|(board, row)| {
                let start = board.iter().position(|b| *b != 0).unwrap_or(board.len());
                (BASE64.encode(&board[start..]), row.to_vec())
            })
            .collect();
        QDocument {
            alpha: self.alpha,
            gamma: self.gamma,
            settings: GameSettings::clone(&self.settings),
            q,
        }
    }

    pub fn from_document(document: QDocument) -> Result<Self, LoadError> {
        let QDocument {
            alpha,
            gamma,
            settings,
            q,
        } = document;
        let mut agent = Self::new(alpha, gamma, settings)?;
        let cells = agent.settings.cell_count();
        let actions = agent.table.action_count();
        for (key, row) in q {
            let trimmed = match BASE64.decode(&key) {
                Ok(bytes) => bytes,
                Err(source) => return Err(LoadError::BoardKey { key, source }),
            };
            if trimmed.len() > cells {
                return Err(LoadError::BoardTooLong {
                    key,
                    len: trimmed.len(),
                    cells,
                });
            }
            if row.len() != actions {
                return Err(LoadError::RowLength {
                    key,
                    expected: actions,
                    actual: row.len(),
                });
            }
            let mut board = vec![0; cells - trimmed.len()];
            board.extend_from_slice(&trimmed);
            agent.table.insert(CanonicalBoard::from_bytes(board), row);
        }
        Ok(agent)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_document())
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Self::from_document(serde_json::from_str(json)?)
    }
}

impl BatchReport {
    #[expect(clippy::cast_precision_loss)]
    fn new(episode_rewards: Vec<f32>) -> Self {
        let episodes = episode_rewards.len();
        let average_reward = if episodes == 0 {
            0.0
        } else {
            episode_rewards.iter().sum::<f32>() / episodes as f32
        };
        let buckets = ThresholdCounts::new(episode_rewards.iter().copied(), &[0.0, 1.0, 2.0]);
        Self {
            episodes,
            average_reward,
            stats: DescriptiveStats::new(episode_rewards),
            buckets,
        }
    }
}

/// Persisted form of a [`QLearning`] agent.
///
/// Keys of `q` are canonical boards with their leading zero bytes removed,
/// base64 encoded. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QDocument {
    pub alpha: f32,
    pub gamma: f32,
    pub settings: GameSettings,
    pub q: BTreeMap<String, Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use floodit_engine::{Color, GameState, Strategy};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn small_settings() -> GameSettings {
        GameSettings::new(3, vec![Color::RED, Color::GREEN, Color::BLUE, Color::YELLOW]).unwrap()
    }

    #[test]
    fn test_hyper_parameters_are_checked() {
        assert_eq!(
            QLearning::new(1.5, 0.9, small_settings()),
            Err(HyperParameterError::Alpha(1.5))
        );
        assert_eq!(
            QLearning::new(0.1, -0.1, small_settings()),
            Err(HyperParameterError::Gamma(-0.1))
        );
        let agent = QLearning::new(0.0, 1.0, small_settings()).unwrap();
        assert_eq!(agent.table().action_count(), 3);
    }

    #[test]
    fn test_learn_fills_table_and_reports() {
        let mut agent = QLearning::new(0.1, 0.9, small_settings()).unwrap();
        let mut rng = Pcg64::seed_from_u64(1);
        let report = agent.learn(30, &mut rng);
        assert_eq!(report.episodes, 30);
        assert_eq!(report.buckets.total(), 30);
        assert_eq!(report.stats.as_ref().map(|s| s.count), Some(30));
        assert!(!agent.table().is_empty());
        assert!(agent.table().iter().all(|(board, row)| {
            board.len() == 9 && board[0] == 0 && row.len() == 3
        }));
    }

    #[test]
    fn test_empty_batch() {
        let mut agent = QLearning::new(0.1, 0.9, small_settings()).unwrap();
        let report = agent.learn(0, &mut Pcg64::seed_from_u64(1));
        assert_eq!(report.episodes, 0);
        assert_eq!(report.average_reward, 0.0);
        assert_eq!(report.stats, None);
    }

    #[test]
    fn test_save_load_save_is_stable() {
        let mut agent = QLearning::new(0.1, 0.9, small_settings()).unwrap();
        agent.learn(25, &mut Pcg64::seed_from_u64(2));
        let json = agent.to_json().unwrap();
        let loaded = QLearning::from_json(&json).unwrap();
        assert_eq!(loaded, agent);
        assert_eq!(loaded.to_json().unwrap(), json);
    }

    #[test]
    fn test_reloaded_agent_learns_identically() {
        let mut original = QLearning::new(0.1, 0.9, small_settings()).unwrap();
        original.learn(40, &mut Pcg64::seed_from_u64(3));
        let mut reloaded = QLearning::from_json(&original.to_json().unwrap()).unwrap();

        let a = original.learn(40, &mut Pcg64::seed_from_u64(4));
        let b = reloaded.learn(40, &mut Pcg64::seed_from_u64(4));
        assert_eq!(a, b);
        assert_eq!(original.table(), reloaded.table());
    }

    #[test]
    fn test_trimmed_keys_are_repadded() {
        let json = r##"{
            "alpha": 0.5,
            "gamma": 0.9,
            "settings": {"size": 2, "palette": ["#FF0000", "#0000FF", "#008000"], "prevent_same_brush": true},
            "q": {"AQI=": [1.0, -2.0], "": [0.5, 0.0]}
        }"##;
        let agent = QLearning::from_json(json).unwrap();
        let table = agent.table();
        assert_eq!(
            table.row(&CanonicalBoard::from_bytes(vec![0, 0, 1, 2])),
            Some(&[1.0, -2.0][..])
        );
        assert_eq!(
            table.row(&CanonicalBoard::from_bytes(vec![0, 0, 0, 0])),
            Some(&[0.5, 0.0][..])
        );
    }

    #[test]
    fn test_missing_fields_fail_to_load() {
        let no_gamma = r##"{"alpha": 0.5, "settings": {"size": 2, "palette": ["#FF0000", "#0000FF"], "prevent_same_brush": true}, "q": {}}"##;
        let err = QLearning::from_json(no_gamma).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
        assert!(err.to_string().contains("gamma"), "{err}");

        let no_q = r##"{"alpha": 0.5, "gamma": 0.5, "settings": {"size": 2, "palette": ["#FF0000", "#0000FF"], "prevent_same_brush": true}}"##;
        assert!(QLearning::from_json(no_q).is_err());
    }

    #[test]
    fn test_invalid_documents() {
        let settings = r##"{"size": 2, "palette": ["#FF0000", "#0000FF"], "prevent_same_brush": true}"##;
        let bad_key = format!(r#"{{"alpha": 0.5, "gamma": 0.5, "settings": {settings}, "q": {{"not base64!": [0.0]}}}}"#);
        assert!(matches!(
            QLearning::from_json(&bad_key),
            Err(LoadError::BoardKey { .. })
        ));

        let too_long = format!(r#"{{"alpha": 0.5, "gamma": 0.5, "settings": {settings}, "q": {{"AQEBAQE=": [0.0]}}}}"#);
        assert!(matches!(
            QLearning::from_json(&too_long),
            Err(LoadError::BoardTooLong { len: 5, cells: 4, .. })
        ));

        let bad_row = format!(r#"{{"alpha": 0.5, "gamma": 0.5, "settings": {settings}, "q": {{"AQ==": [0.0, 1.0]}}}}"#);
        assert!(matches!(
            QLearning::from_json(&bad_row),
            Err(LoadError::RowLength { expected: 1, actual: 2, .. })
        ));

        let bad_alpha = format!(r#"{{"alpha": 2.0, "gamma": 0.5, "settings": {settings}, "q": {{}}}}"#);
        assert!(matches!(
            QLearning::from_json(&bad_alpha),
            Err(LoadError::HyperParameter(HyperParameterError::Alpha(_)))
        ));
    }

    #[test]
    fn test_player_follows_table() {
        let settings =
            Arc::new(GameSettings::new(2, vec![Color::RED, Color::GREEN, Color::BLUE]).unwrap());
        let state = GameState::from_cells(
            Arc::clone(&settings),
            vec![Color::RED, Color::GREEN, Color::BLUE, Color::BLUE],
        )
        .unwrap();
        let mut agent = QLearning::new(0.5, 0.9, settings).unwrap();
        agent.table.insert(state.canonical().clone(), vec![0.2, 0.7]);

        let mut player = agent.player(Pcg64::seed_from_u64(0));
        assert_eq!(player.select_move(&state), Some(Color::BLUE));
    }
}
