//! Learning agents for the flood-fill puzzle.
//!
//! - [`reward`]: reward shaping from the topological change between two states
//! - [`qlearning`]: tabular Q-learning keyed by canonical boards
//! - [`nn`]: dense feed-forward networks, mutation, and the strategies that play with them
//!
//! Both agents persist to JSON documents; loading reports every problem through
//! [`LoadError`].

pub use self::reward::RewardWeights;

mod action;
pub mod nn;
pub mod qlearning;
pub mod reward;

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum HyperParameterError {
    #[display("alpha must be between 0 and 1 (got {_0})")]
    Alpha(#[error(not(source))] f32),
    #[display("gamma must be between 0 and 1 (got {_0})")]
    Gamma(#[error(not(source))] f32),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkShapeError {
    #[display("a network needs at least an input and an output size (got {count} sizes)")]
    TooFewSizes { count: usize },
    #[display("expected {expected} activation functions, got {actual}")]
    ActivationCount { expected: usize, actual: usize },
    #[display("a network needs at least one layer")]
    NoLayers,
    #[display("layer {index} takes {input} inputs but the previous layer produces {previous}")]
    BrokenChain {
        index: usize,
        input: usize,
        previous: usize,
    },
    #[display("layer has {output} outputs but {biases} biases")]
    BiasCount { output: usize, biases: usize },
    #[display("weight row {row} has {actual} entries, expected {expected}")]
    WeightRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer sizes must be at least 1")]
    EmptyLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("input has {actual} values, expected {expected}")]
pub struct InputLengthError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SettingsMismatchError {
    #[display("the board has {cells} cells but the network takes {input} inputs")]
    InputSize { cells: usize, input: usize },
    #[display(
        "the network output size ({output}) must be one less than the palette size ({palette})"
    )]
    OutputSize { output: usize, palette: usize },
}

/// Failure to read a persisted agent.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("malformed document: {_0}")]
    #[from]
    Json(serde_json::Error),
    #[display("invalid board key {key:?}: {source}")]
    BoardKey {
        key: String,
        source: base64::DecodeError,
    },
    #[display("board key {key:?} decodes to {len} cells, more than the {cells} of the board")]
    BoardTooLong { key: String, len: usize, cells: usize },
    #[display("row for board key {key:?} has {actual} values, expected {expected}")]
    RowLength {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[display("{_0}")]
    #[from]
    HyperParameter(HyperParameterError),
    #[display("{_0}")]
    #[from]
    NetworkShape(NetworkShapeError),
    #[display("{_0}")]
    #[from]
    SettingsMismatch(SettingsMismatchError),
    #[display("malformed layer string: {_0}")]
    LayerString(#[error(not(source))] String),
}
