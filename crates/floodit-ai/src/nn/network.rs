use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use floodit_engine::{Game, GameSettings, PlayMode};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{InputLengthError, LoadError, NetworkShapeError, SettingsMismatchError};

use super::{
    activation::Activation,
    layer::DenseLayer,
    strategy::{NetworkPlayer, NetworkTrainer},
};

/// Feed-forward network of [`DenseLayer`]s with a fitness score.
///
/// Fitness accumulates the shaped rewards of one training episode
/// ([`NeuralNetwork::train`]). Equality and hashing ignore it.
///
/// # Example
///
/// ```
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// use floodit_ai::nn::{Activation, NeuralNetwork};
///
/// let mut rng = Pcg64::seed_from_u64(0);
/// let network = NeuralNetwork::new(
///     &[4, 3, 2],
///     &[Activation::LeakyReLU, Activation::Softmax],
///     &mut rng,
/// )
/// .unwrap();
/// let ys = network.feed_forward(&[0.0; 4]).unwrap();
/// assert_eq!(ys.len(), 2);
/// assert!((ys.iter().sum::<f32>() - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NetworkDocument", into = "NetworkDocument")]
pub struct NeuralNetwork {
    layers: Vec<DenseLayer>,
    fitness: f32,
}

/// Serialized form of a [`NeuralNetwork`]. Fitness is not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub layers: Vec<DenseLayer>,
}

impl PartialEq for NeuralNetwork {
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers
    }
}

impl Hash for NeuralNetwork {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for layer in &self.layers {
            layer.input_size().hash(state);
            layer.output_size().hash(state);
            layer.activation().hash(state);
        }
    }
}

impl NeuralNetwork {
    /// Creates a randomly initialized network.
    ///
    /// `sizes` lists the input size followed by every layer's output size;
    /// `activations` has one entry per layer.
    pub fn new<R>(
        sizes: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Result<Self, NetworkShapeError>
    where
        R: Rng + ?Sized,
    {
        if sizes.len() < 2 {
            return Err(NetworkShapeError::TooFewSizes { count: sizes.len() });
        }
        if activations.len() != sizes.len() - 1 {
            return Err(NetworkShapeError::ActivationCount {
                expected: sizes.len() - 1,
                actual: activations.len(),
            });
        }
        let layers = sizes
            .windows(2)
            .zip(activations)
            .map(|(pair, activation)| DenseLayer::random(pair[0], pair[1], *activation, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers, fitness: 0.0 })
    }

    /// Assembles a network from existing layers, checking that they chain.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self, NetworkShapeError> {
        if layers.is_empty() {
            return Err(NetworkShapeError::NoLayers);
        }
        for (index, pair) in layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(NetworkShapeError::BrokenChain {
                    index: index + 1,
                    input: pair[1].input_size(),
                    previous: pair[0].output_size(),
                });
            }
        }
        Ok(Self {
            layers,
            fitness: 0.0,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Input size followed by each layer's output size.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size()];
        sizes.extend(self.layers.iter().map(DenseLayer::output_size));
        sizes
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn feed_forward(&self, input: &[f32]) -> Result<Vec<f32>, InputLengthError> {
        let mut values = input.to_vec();
        for layer in &self.layers {
            values = layer.feed_forward(&values)?;
        }
        Ok(values)
    }

    /// Returns `count` mutated deep copies with zero fitness.
    pub fn create_children<R>(&self, count: usize, rng: &mut R) -> Vec<Self>
    where
        R: Rng + ?Sized,
    {
        (0..count)
            .map(|_| {
                let mut child = Self {
                    layers: self.layers.clone(),
                    fitness: 0.0,
                };
                for layer in &mut child.layers {
                    layer.mutate(rng);
                }
                child
            })
            .collect()
    }

    /// Checks that a board of `settings` fits the network: one input per cell
    /// and one output per palette color except the upper-left one.
    pub fn check_settings(&self, settings: &GameSettings) -> Result<(), SettingsMismatchError> {
        if settings.cell_count() != self.input_size() {
            return Err(SettingsMismatchError::InputSize {
                cells: settings.cell_count(),
                input: self.input_size(),
            });
        }
        if settings.palette().len() != self.output_size() + 1 {
            return Err(SettingsMismatchError::OutputSize {
                output: self.output_size(),
                palette: settings.palette().len(),
            });
        }
        Ok(())
    }

    /// Plays one episode on a random board, stores the accumulated reward as the
    /// fitness, and returns it.
    ///
    /// The episode stops after `max_moves` move requests at most.
    pub fn train<R>(
        &mut self,
        settings: impl Into<Arc<GameSettings>>,
        max_moves: usize,
        rng: &mut R,
    ) -> Result<f32, SettingsMismatchError>
    where
        R: Rng + ?Sized,
    {
        let settings = settings.into();
        self.check_settings(&settings)?;
        self.fitness = 0.0;

        let cells = vec![settings.palette()[0]; settings.cell_count()];
        let mut game = Game::new(cells, settings, rng).with_play_mode(PlayMode::Flat);
        let mut trainer =
            NetworkTrainer::new(self, game.settings(), &mut *rng)?.with_max_moves(max_moves);
        let outcome = game.play(&mut trainer);
        let fitness = trainer.fitness();
        log::trace!(
            "training episode: {outcome:?} after {} moves, fitness {fitness}",
            game.moves()
        );

        self.fitness = fitness;
        Ok(fitness)
    }

    /// Inference strategy playing the network's choices on boards of
    /// `settings`.
    pub fn player<R>(
        &self,
        settings: &GameSettings,
        rng: R,
    ) -> Result<NetworkPlayer<'_, R>, SettingsMismatchError>
    where
        R: Rng,
    {
        NetworkPlayer::new(self, settings, rng)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<NetworkDocument> for NeuralNetwork {
    type Error = NetworkShapeError;

    fn try_from(doc: NetworkDocument) -> Result<Self, Self::Error> {
        Self::from_layers(doc.layers)
    }
}

impl From<NeuralNetwork> for NetworkDocument {
    fn from(network: NeuralNetwork) -> Self {
        Self {
            layers: network.layers,
        }
    }
}

impl fmt::Display for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F: {}, L: ", self.fitness)?;
        for (i, size) in self.sizes().iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{size}")?;
        }
        Ok(())
    }
}

/// Template describing a network architecture.
///
/// ```
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// use floodit_ai::nn::{Activation, NetworkBuilder};
///
/// let builder = NetworkBuilder::input(16)
///     .dense(14, Activation::LeakyReLU)
///     .dense(7, Activation::Softmax);
/// let network = builder.build(&mut Pcg64::seed_from_u64(0)).unwrap();
/// assert_eq!(network.sizes(), vec![16, 14, 7]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkBuilder {
    sizes: Vec<usize>,
    activations: Vec<Activation>,
}

impl NetworkBuilder {
    #[must_use]
    pub fn input(size: usize) -> Self {
        Self {
            sizes: vec![size],
            activations: vec![],
        }
    }

    #[must_use]
    pub fn dense(mut self, size: usize, activation: Activation) -> Self {
        self.sizes.push(size);
        self.activations.push(activation);
        self
    }

    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Builds a freshly initialized network.
    pub fn build<R>(&self, rng: &mut R) -> Result<NeuralNetwork, NetworkShapeError>
    where
        R: Rng + ?Sized,
    {
        NeuralNetwork::new(&self.sizes, &self.activations, rng)
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher as _, RandomState};

    use floodit_engine::Color;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn network(rng: &mut Pcg64) -> NeuralNetwork {
        NeuralNetwork::new(&[4, 3, 2], &[Activation::LeakyReLU, Activation::Softmax], rng).unwrap()
    }

    #[test]
    fn test_softmax_output_of_zero_input() {
        let mut rng = Pcg64::seed_from_u64(0);
        let network = network(&mut rng);
        let ys = network.feed_forward(&[0.0; 4]).unwrap();
        assert_eq!(ys.len(), 2);
        assert!(ys.iter().all(|y| *y >= 0.0));
        assert!((ys.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shape_validation() {
        let mut rng = Pcg64::seed_from_u64(0);
        assert_eq!(
            NeuralNetwork::new(&[4], &[], &mut rng),
            Err(NetworkShapeError::TooFewSizes { count: 1 })
        );
        assert_eq!(
            NeuralNetwork::new(&[4, 3, 2], &[Activation::ReLU], &mut rng),
            Err(NetworkShapeError::ActivationCount {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            NeuralNetwork::new(&[4, 0, 2], &[Activation::ReLU, Activation::ReLU], &mut rng),
            Err(NetworkShapeError::EmptyLayer)
        );
        assert_eq!(
            NeuralNetwork::from_layers(vec![]),
            Err(NetworkShapeError::NoLayers)
        );

        let a = DenseLayer::random(4, 3, Activation::ReLU, &mut rng).unwrap();
        let b = DenseLayer::random(2, 1, Activation::ReLU, &mut rng).unwrap();
        assert_eq!(
            NeuralNetwork::from_layers(vec![a, b]),
            Err(NetworkShapeError::BrokenChain {
                index: 1,
                input: 2,
                previous: 3
            })
        );
    }

    #[test]
    fn test_wrong_input_length() {
        let mut rng = Pcg64::seed_from_u64(0);
        let network = network(&mut rng);
        assert_eq!(
            network.feed_forward(&[0.0; 5]),
            Err(InputLengthError {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_children_share_architecture() {
        let mut rng = Pcg64::seed_from_u64(1);
        let parent = network(&mut rng);
        let children = parent.create_children(2, &mut rng);
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.sizes(), parent.sizes());
            let activations = |n: &NeuralNetwork| {
                n.layers().iter().map(DenseLayer::activation).collect::<Vec<_>>()
            };
            assert_eq!(activations(child), activations(&parent));
            assert_ne!(child, &parent);
        }
        assert_ne!(children[0], children[1]);
    }

    #[test]
    fn test_equality_and_hash_ignore_fitness() {
        let mut rng = Pcg64::seed_from_u64(2);
        let a = network(&mut rng);
        let mut b = a.clone();
        b.fitness = 42.0;
        assert_eq!(a, b);
        let hasher = RandomState::new();
        assert_eq!(hasher.hash_one(&a), hasher.hash_one(&b));
    }

    #[test]
    fn test_settings_check() {
        let mut rng = Pcg64::seed_from_u64(3);
        let network = NeuralNetwork::new(&[4, 2], &[Activation::Softmax], &mut rng).unwrap();
        let palette = vec![Color::RED, Color::GREEN, Color::BLUE];
        assert_eq!(
            network.check_settings(&GameSettings::new(2, palette.clone()).unwrap()),
            Ok(())
        );
        assert_eq!(
            network.check_settings(&GameSettings::new(3, palette).unwrap()),
            Err(SettingsMismatchError::InputSize { cells: 9, input: 4 })
        );
        assert_eq!(
            network.check_settings(&GameSettings::with_size(2).unwrap()),
            Err(SettingsMismatchError::OutputSize {
                output: 2,
                palette: 8
            })
        );
    }

    #[test]
    fn test_train_accumulates_fitness() {
        let mut rng = Pcg64::seed_from_u64(4);
        let settings = GameSettings::with_size(4).unwrap();
        let mut network = NetworkBuilder::input(16)
            .dense(10, Activation::LeakyReLU)
            .dense(7, Activation::Softmax)
            .build(&mut rng)
            .unwrap();
        let fitness = network.train(settings, 1000, &mut rng).unwrap();
        assert_eq!(network.fitness(), fitness);
        assert!(fitness.is_finite());

        let wrong = GameSettings::with_size(3).unwrap();
        assert!(network.train(wrong, 1000, &mut rng).is_err());
        assert_eq!(network.fitness(), fitness);
    }

    #[test]
    fn test_json_roundtrip_and_errors() {
        let mut rng = Pcg64::seed_from_u64(5);
        let network = network(&mut rng);
        let json = network.to_json().unwrap();
        let loaded = NeuralNetwork::from_json(&json).unwrap();
        assert_eq!(loaded, network);
        assert_eq!(loaded.to_json().unwrap(), json);

        assert!(matches!(
            NeuralNetwork::from_json(r#"{"layers":[]}"#),
            Err(LoadError::Json(_))
        ));
        assert!(matches!(
            NeuralNetwork::from_json("{}"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_display() {
        let mut rng = Pcg64::seed_from_u64(6);
        let network = network(&mut rng);
        assert_eq!(network.to_string(), "F: 0, L: 4 -> 3 -> 2");
    }
}
