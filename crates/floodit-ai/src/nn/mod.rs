//! Dense feed-forward networks evolved to play the puzzle.
//!
//! A network reads the canonical board (one input per cell, the canonical byte
//! as a float) and produces one output per non-upper-left color. Output `i`
//! stands for canonical byte `i + 1`.
//!
//! - [`NeuralNetwork`]: layers, feed-forward, mutation, fitness
//! - [`NetworkBuilder`]: architecture template
//! - [`NetworkTrainer`] / [`NetworkPlayer`]: strategies used for training episodes
//!   and inference

pub use self::{
    activation::Activation,
    layer::{DenseLayer, LayerDocument},
    network::{NetworkBuilder, NetworkDocument, NeuralNetwork},
    strategy::{NetworkPlayer, NetworkTrainer},
};

mod activation;
mod layer;
mod network;
mod strategy;
pub mod weights;
