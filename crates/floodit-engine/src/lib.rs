pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cell ({x}, {y}) is outside of the {size}x{size} board")]
pub struct OutOfRangeError {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board has {actual} cells, expected {expected}")]
pub struct CellCountError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum CellsError {
    #[display("{_0}")]
    #[from]
    Count(CellCountError),
    #[display("cell {index} has color {color}, which is not in the palette")]
    UnknownColor { index: usize, color: Color },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SettingsError {
    #[display("board size must be at least 1")]
    EmptyBoard,
    #[display("palette must contain at least 2 distinct colors (got {distinct})")]
    TooFewColors { distinct: usize },
    #[display("palette must contain at most 255 colors (got {len})")]
    TooManyColors { len: usize },
}
