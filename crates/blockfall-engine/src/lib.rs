pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Error returned when constructing a board with a zero dimension.
///
/// A board with no columns or no rows has no cells to occupy and no rows to
/// clear, so construction rejects it up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board dimensions must be non-zero, got {width}x{height}")]
pub struct InvalidDimensionError {
    pub width: usize,
    pub height: usize,
}
