//! Monte Carlo playouts (random game simulation).
//!
//! Random moves are drawn by walking the board with a random start and a
//! random stride coprime with the number of points. Stepping by such a
//! stride modulo the cell count visits every point exactly once, so the walk
//! is a full permutation kept in two integers instead of a shuffled buffer.

use fastrand::Rng;

use crate::board::{Board, Color, Point};
use crate::constants::PLAYOUT_PLY_FACTOR;

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Pick a stride in `1..=n` that is coprime with `n`.
fn coprime_stride(n: usize, rng: &mut Rng) -> usize {
    loop {
        let stride = rng.usize(1..=n);
        if gcd(stride, n) == 1 {
            return stride;
        }
    }
}

/// Cell indices in a random full-period order.
fn random_walk(n: usize, rng: &mut Rng) -> impl Iterator<Item = usize> {
    let start = rng.usize(..n);
    let stride = coprime_stride(n, rng);
    (0..n).scan(start, move |idx, _| {
        let cur = *idx;
        *idx = (*idx + stride) % n;
        Some(cur)
    })
}

/// Play a random legal move for `color` that does not fill one of its own
/// likely eyes.
///
/// Returns the point played, or `None` when no such move exists and the
/// caller has to pass.
pub fn play_random(board: &mut Board, color: Color, rng: &mut Rng) -> Option<Point> {
    for idx in random_walk(board.cell_count(), rng) {
        if !board.is_empty_at(idx) || board.is_likely_eye_at(idx, color) {
            continue;
        }
        if board.place(idx, color).is_legal() {
            return Some(board.point(idx));
        }
    }
    None
}

/// Play random moves, starting with `color`, until two consecutive passes
/// or `PLAYOUT_PLY_FACTOR * size²` plies.
///
/// Returns the number of plies played, passes included.
pub fn playout(board: &mut Board, mut color: Color, rng: &mut Rng) -> usize {
    let max_plies = PLAYOUT_PLY_FACTOR * board.cell_count();
    let mut passes = 0;
    let mut plies = 0;

    while passes < 2 && plies < max_plies {
        if play_random(board, color, rng).is_some() {
            passes = 0;
        } else {
            board.pass();
            passes += 1;
        }
        color = color.opponent();
        plies += 1;
    }

    plies
}
