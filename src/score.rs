//! Scoring of finished positions.
//!
//! A [`Scorer`] returns a signed score where **positive favors Black and
//! negative favors White**. The search only looks at the sign, through
//! [`winner`].

use crate::board::{Board, Color};

pub trait Scorer {
    /// Score `board`: `> 0` Black is ahead, `< 0` White is ahead, `0` draw.
    fn score(&self, board: &Board) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&Board) -> f64,
{
    fn score(&self, board: &Board) -> f64 {
        self(board)
    }
}

/// The color a score favors, or `None` for a draw.
#[inline]
pub fn winner(score: f64) -> Option<Color> {
    if score > 0.0 {
        Some(Color::Black)
    } else if score < 0.0 {
        Some(Color::White)
    } else {
        None
    }
}

/// Area scoring without komi.
///
/// Stones count for their owner. An empty point counts for a color when it
/// is a likely eye of that color alone, which is what random playouts leave
/// behind once both sides pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct AreaScorer;

impl Scorer for AreaScorer {
    fn score(&self, board: &Board) -> f64 {
        let size = board.size();
        let mut s = 0.0;
        for x in 0..size {
            for y in 0..size {
                s += match board.get(x, y) {
                    Some(Color::Black) => 1.0,
                    Some(Color::White) => -1.0,
                    None => match (
                        board.is_likely_eye(x, y, Color::Black),
                        board.is_likely_eye(x, y, Color::White),
                    ) {
                        (true, false) => 1.0,
                        (false, true) => -1.0,
                        _ => 0.0,
                    },
                };
            }
        }
        s
    }
}
