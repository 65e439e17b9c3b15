use chrono::{DateTime, Utc};
use floodit_ai::{LoadError, nn::NeuralNetwork, qlearning::{QDocument, QLearning}};
use floodit_engine::GameSettings;
use serde::{Deserialize, Serialize};

/// A trained agent as saved by the `train-*` commands.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Average reward of the last batch (Q-learning) or best fitness of the
    /// last epoch (network).
    pub final_score: f32,
    pub agent: TrainedAgent,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedAgent {
    QLearning(QDocument),
    Network {
        settings: GameSettings,
        network: NeuralNetwork,
    },
}

impl TrainedAgent {
    pub fn settings(&self) -> &GameSettings {
        match self {
            TrainedAgent::QLearning(doc) => &doc.settings,
            TrainedAgent::Network { settings, .. } => settings,
        }
    }
}

/// A loaded agent, ready to play.
#[derive(Debug)]
pub enum Agent {
    QLearning(QLearning),
    Network(NeuralNetwork),
}

impl TryFrom<TrainedAgent> for Agent {
    type Error = LoadError;

    fn try_from(agent: TrainedAgent) -> Result<Self, Self::Error> {
        match agent {
            TrainedAgent::QLearning(doc) => Ok(Agent::QLearning(QLearning::from_document(doc)?)),
            TrainedAgent::Network { settings, network } => {
                network.check_settings(&settings)?;
                Ok(Agent::Network(network))
            }
        }
    }
}
