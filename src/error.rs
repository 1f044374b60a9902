//! Error type shared by the board and the search.
//!
//! Illegal moves (occupied point, ko, suicide) are not errors: they are
//! reported through [`MoveResult`](crate::board::MoveResult). Errors here are
//! caller mistakes or allocation failures.

/// Errors raised by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Board edge length outside `1..=255`.
    #[error("invalid board size {0}: must be between 1 and 255")]
    InvalidSize(usize),

    /// Coordinates outside the board that are not the pass point.
    #[error("invalid move ({x}, {y}) on a {size}x{size} board")]
    InvalidMove { x: usize, y: usize, size: usize },

    /// An allocation for a board or the search tree failed.
    #[error("out of memory while allocating {0}")]
    ResourceExhausted(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
