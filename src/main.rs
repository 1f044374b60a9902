//! uct-go: a small UCT Go engine.
//!
//! ## Usage
//!
//! - `uct-go` - Self-play with default settings
//! - `uct-go selfplay --size 9 --iterations 20000` - Engine plays both colors
//! - `uct-go gtp` - Start GTP server for GUI integration
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fastrand::Rng;
use log::info;

use uct_go::board::{Board, Color, Point};
use uct_go::constants::{DEFAULT_SIZE, N_SIMS, PLAYOUT_PLY_FACTOR, UCT_EXPLORE, UCT_K};
use uct_go::gtp::GtpEngine;
use uct_go::mcts::{SearchConfig, select_move};
use uct_go::score::{AreaScorer, Scorer, winner};

/// uct-go: a small UCT Go engine
#[derive(Parser)]
#[command(name = "uct-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Let the engine play against itself, printing every position
    Selfplay(EngineArgs),
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp(EngineArgs),
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Board size
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,
    /// Simulations per move
    #[arg(long, default_value_t = N_SIMS)]
    iterations: u32,
    /// Per-move time limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// UCB1 exploration constant
    #[arg(long, default_value_t = UCT_K)]
    exploration: f64,
    /// Per-mille chance bucket for stopping tree descent
    #[arg(long, default_value_t = UCT_EXPLORE)]
    explore_permille: u32,
    /// Random seed; omit for a random one
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            iterations: N_SIMS,
            time_limit_ms: None,
            exploration: UCT_K,
            explore_permille: UCT_EXPLORE,
            seed: None,
        }
    }
}

impl EngineArgs {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            iterations: self.iterations,
            exploration: self.exploration,
            explore_permille: self.explore_permille,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }

    fn rng(&self) -> Rng {
        self.seed.map_or_else(Rng::new, Rng::with_seed)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Gtp(args)) => {
            let mut engine = GtpEngine::new(args.size, args.search_config(), args.rng())?;
            engine.run().context("GTP session failed")?;
        }
        Some(Commands::Selfplay(args)) => run_selfplay(&args)?,
        None => run_selfplay(&EngineArgs::default())?,
    }
    Ok(())
}

fn run_selfplay(args: &EngineArgs) -> anyhow::Result<()> {
    let mut board = Board::new(args.size)?;
    let config = args.search_config();
    let mut rng = args.rng();
    let max_moves = PLAYOUT_PLY_FACTOR * board.cell_count();

    info!(
        "self-play on {0}x{0}, {1} simulations per move",
        args.size, config.iterations
    );
    println!("{board}");

    let mut color = Color::Black;
    let mut passes = 0;
    for move_no in 1..=max_moves {
        let result = select_move(&board, color, &config, &AreaScorer, &mut rng)?;
        let point = result.best.unwrap_or(board.pass_point());
        board.play(point.0, point.1, color)?;
        passes = if result.best.is_some() { 0 } else { passes + 1 };

        println!(
            "{move_no}. {color} {} ({:.1}%)",
            describe(point, &board),
            100.0 * result.win_rate()
        );
        println!("{board}");

        if passes >= 2 {
            break;
        }
        color = color.opponent();
    }

    let score = AreaScorer.score(&board);
    match winner(score) {
        Some(c) => println!("{c} wins by {}", score.abs()),
        None => println!("draw"),
    }
    Ok(())
}

fn describe(point: Point, board: &Board) -> String {
    if point == board.pass_point() {
        "pass".to_string()
    } else {
        format!("({}, {})", point.0, point.1)
    }
}
