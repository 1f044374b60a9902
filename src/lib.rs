//! uct-go: a small Go engine driven by UCT Monte Carlo Tree Search.
//!
//! ## Modules
//!
//! - [`board`] - Board state, captures, simple ko and the eye heuristic
//! - [`playout`] - Random move selection and random games to the end
//! - [`score`] - Scoring contract and area scoring
//! - [`mcts`] - UCB1 search tree and move selection
//! - [`gtp`] - Go Text Protocol front end
//! - [`constants`] - Default parameters
//! - [`error`] - Error type
//!
//! ## Example
//!
//! ```
//! use fastrand::Rng;
//! use uct_go::board::{Board, Color};
//! use uct_go::mcts::{select_move, SearchConfig};
//! use uct_go::score::AreaScorer;
//!
//! let mut board = Board::new(9)?;
//! assert!(board.play(4, 4, Color::Black)?);
//!
//! let config = SearchConfig { iterations: 200, ..SearchConfig::default() };
//! let mut rng = Rng::with_seed(1);
//! let result = select_move(&board, Color::White, &config, &AreaScorer, &mut rng)?;
//! if let Some((x, y)) = result.best {
//!     board.play(x, y, Color::White)?;
//! }
//! println!("{board}");
//! # Ok::<(), uct_go::Error>(())
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod gtp;
pub mod mcts;
pub mod playout;
pub mod score;

pub use error::{Error, Result};
