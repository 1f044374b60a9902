//! Default engine parameters.
//!
//! Board size is chosen at runtime, so only defaults live here. Every value
//! can be overridden through [`SearchConfig`](crate::mcts::SearchConfig) or
//! the command line.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when none is given.
pub const DEFAULT_SIZE: usize = 9;

/// Largest board the 8-bit coordinate domain allows.
pub const MAX_SIZE: usize = 255;

/// Largest board GTP vertices can name (A-Z without I).
pub const GTP_MAX_SIZE: usize = 25;

/// Playouts stop after `PLAYOUT_PLY_FACTOR * size * size` plies.
///
/// Only simple ko is enforced, so long cycles are possible; this is the
/// hard bound on a random game.
pub const PLAYOUT_PLY_FACTOR: usize = 2;

// =============================================================================
// UCT Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: u32 = 10_000;

/// UCB1 exploration constant.
pub const UCT_K: f64 = 1.0;

/// Per-mille threshold for stopping tree descent.
///
/// Each step draws from `0..1000`; descent continues only while the draw is
/// above this value, so about 1.6% of steps stop early and expand a node
/// higher up the tree.
pub const UCT_EXPLORE: u32 = 15;
