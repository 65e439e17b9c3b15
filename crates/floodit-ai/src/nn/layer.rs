use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{InputLengthError, LoadError, NetworkShapeError};

use super::{activation::Activation, weights};

/// Fully connected layer: `output = activation(bias + W * input)`.
///
/// `W` has `output_size` rows of `input_size` weights.
///
/// # Text form
///
/// A layer also has a compact text form: one `bias;w0;w1;...` group per output
/// row, each followed by `$`, then the activation name.
///
/// ```
/// use floodit_ai::nn::{Activation, DenseLayer};
///
/// let layer = DenseLayer::from_parts(vec![vec![1.0, 2.0]], vec![0.5], Activation::ReLU).unwrap();
/// assert_eq!(layer.to_string(), "0.5;1;2$ReLU");
/// assert_eq!(layer.feed_forward(&[1.0, -1.0]).unwrap(), vec![0.0]);
/// assert_eq!("0.5;1;2$ReLU".parse::<DenseLayer>().unwrap(), layer);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerDocument", into = "LayerDocument")]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    /// Row-major, `output_size * input_size` values.
    weights: Vec<f32>,
    biases: Vec<f32>,
    activation: Activation,
}

/// Serialized form of a [`DenseLayer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub input_size: usize,
    pub output_size: usize,
    pub activation: Activation,
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

impl DenseLayer {
    /// Creates a layer with weights and biases drawn uniformly from `[-1, 1]`.
    pub fn random<R>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkShapeError>
    where
        R: Rng + ?Sized,
    {
        if input_size == 0 || output_size == 0 {
            return Err(NetworkShapeError::EmptyLayer);
        }
        let mut weights = Vec::with_capacity(input_size * output_size);
        let mut biases = Vec::with_capacity(output_size);
        for _ in 0..output_size {
            biases.extend(weights::random(rng, 1));
            weights.extend(weights::random(rng, input_size));
        }
        Ok(Self {
            input_size,
            output_size,
            weights,
            biases,
            activation,
        })
    }

    /// Creates a layer from explicit weight rows (one per output) and biases.
    pub fn from_parts(
        weights: Vec<Vec<f32>>,
        biases: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, NetworkShapeError> {
        let output_size = weights.len();
        let input_size = weights.first().map_or(0, Vec::len);
        if input_size == 0 || output_size == 0 {
            return Err(NetworkShapeError::EmptyLayer);
        }
        if biases.len() != output_size {
            return Err(NetworkShapeError::BiasCount {
                output: output_size,
                biases: biases.len(),
            });
        }
        if let Some((row, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != input_size)
        {
            return Err(NetworkShapeError::WeightRow {
                row,
                expected: input_size,
                actual: w.len(),
            });
        }
        Ok(Self {
            input_size,
            output_size,
            weights: weights.into_iter().flatten().collect(),
            biases,
            activation,
        })
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn bias(&self, output: usize) -> f32 {
        self.biases[output]
    }

    #[must_use]
    pub fn weight(&self, output: usize, input: usize) -> f32 {
        self.weights[output * self.input_size + input]
    }

    /// Weight rows, one per output.
    pub fn weight_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.weights.chunks_exact(self.input_size)
    }

    pub fn feed_forward(&self, xs: &[f32]) -> Result<Vec<f32>, InputLengthError> {
        if xs.len() != self.input_size {
            return Err(InputLengthError {
                expected: self.input_size,
                actual: xs.len(),
            });
        }
        let mut ys = self
            .weight_rows()
            .zip(&self.biases)
            .map(|(row, bias)| bias + row.iter().zip(xs).map(|(w, x)| w * x).sum::<f32>())
            .collect::<Vec<_>>();
        self.activation.apply(&mut ys);
        Ok(ys)
    }

    /// Perturbs every weight, then every bias.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        weights::mutate(&mut self.weights, weights::MUTATION_SIGMA, rng);
        weights::mutate(&mut self.biases, weights::MUTATION_SIGMA, rng);
    }
}

impl TryFrom<LayerDocument> for DenseLayer {
    type Error = NetworkShapeError;

    fn try_from(doc: LayerDocument) -> Result<Self, Self::Error> {
        let layer = Self::from_parts(doc.weights, doc.biases, doc.activation)?;
        if layer.input_size != doc.input_size || layer.output_size != doc.output_size {
            return Err(NetworkShapeError::WeightRow {
                row: 0,
                expected: doc.input_size,
                actual: layer.input_size,
            });
        }
        Ok(layer)
    }
}

impl From<DenseLayer> for LayerDocument {
    fn from(layer: DenseLayer) -> Self {
        Self {
            input_size: layer.input_size,
            output_size: layer.output_size,
            activation: layer.activation,
            weights: layer.weight_rows().map(<[f32]>::to_vec).collect(),
            biases: layer.biases,
        }
    }
}

impl fmt::Display for DenseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, bias) in self.weight_rows().zip(&self.biases) {
            write!(f, "{bias}")?;
            for w in row {
                write!(f, ";{w}")?;
            }
            write!(f, "$")?;
        }
        write!(f, "{}", self.activation)
    }
}

impl FromStr for DenseLayer {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoadError::LayerString(s.to_owned());
        let mut groups = s.split('$').collect::<Vec<_>>();
        let activation = groups
            .pop()
            .and_then(|name| name.parse::<Activation>().ok())
            .ok_or_else(invalid)?;

        let mut weights = Vec::with_capacity(groups.len());
        let mut biases = Vec::with_capacity(groups.len());
        for group in groups {
            let mut values = group.split(';').map(str::parse::<f32>);
            let bias = values.next().and_then(Result::ok).ok_or_else(invalid)?;
            let row = values.collect::<Result<Vec<_>, _>>().map_err(|_| invalid())?;
            biases.push(bias);
            weights.push(row);
        }
        Ok(Self::from_parts(weights, biases, activation)?)
    }
}
