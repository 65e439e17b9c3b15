use serde::{Deserialize, Serialize};

/// Activation function applied to a layer's output vector.
///
/// All variants except [`Activation::Softmax`] apply element-wise.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
pub enum Activation {
    Identity,
    Tanh,
    ReLU,
    Sigmoid,
    BinaryStep,
    LeakyReLU,
    /// `exp(x_i) / sum(exp(x_j))`, computed without subtracting the maximum.
    Softmax,
}

impl Activation {
    pub const ALL: [Self; 7] = [
        Self::Identity,
        Self::Tanh,
        Self::ReLU,
        Self::Sigmoid,
        Self::BinaryStep,
        Self::LeakyReLU,
        Self::Softmax,
    ];

    /// Applies the function in place.
    pub fn apply(self, values: &mut [f32]) {
        let scalar: fn(f32) -> f32 = match self {
            Self::Identity => return,
            Self::Tanh => f32::tanh,
            Self::ReLU => |x| if x < 0.0 { 0.0 } else { x },
            Self::Sigmoid => |x| 1.0 / (1.0 + (-x).exp()),
            Self::BinaryStep => |x| if x < 0.0 { 0.0 } else { 1.0 },
            Self::LeakyReLU => |x| if x < 0.0 { 0.01 * x } else { x },
            Self::Softmax => {
                for v in values.iter_mut() {
                    *v = v.exp();
                }
                let sum = values.iter().sum::<f32>();
                for v in values.iter_mut() {
                    *v /= sum;
                }
                return;
            }
        };
        for v in values {
            *v = scalar(*v);
        }
    }
}
