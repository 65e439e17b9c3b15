//! Board-level data structures.
//!
//! - [`Color`] - RGB cell color, serialized as `#RRGGBB`
//! - [`Board`] - square grid of colors with batched change tracking
//! - [`zone`] - 4-connected flood fills over a [`Board`]

pub use self::{board::*, color::*};

pub(crate) mod board;
pub(crate) mod color;
pub mod zone;
