//! Go Text Protocol (GTP) front end.
//!
//! Implements the subset of GTP version 2 needed to play a game from a
//! graphical client such as Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - 1 to 25
//! - `clear_board`
//! - `play <color> <vertex>`
//! - `genmove <color>` - search, play and return a move
//! - `showboard`
//!
//! Vertices name the column (`y`) with a letter, skipping `I`, and the row
//! with a number counted from the bottom, so `A1` is `(size - 1, 0)`.

use std::io::{self, BufRead, Write};

use fastrand::Rng;
use log::debug;

use crate::board::{Board, Color, Point};
use crate::constants::GTP_MAX_SIZE;
use crate::error::{Error, Result};
use crate::mcts::{SearchConfig, select_move};
use crate::score::AreaScorer;

const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    board: Board,
    config: SearchConfig,
    rng: Rng,
}

impl GtpEngine {
    /// Create an engine with an empty `size` x `size` board.
    ///
    /// Sizes above 25 have no GTP vertex names and are rejected.
    pub fn new(size: usize, config: SearchConfig, rng: Rng) -> Result<Self> {
        if size > GTP_MAX_SIZE {
            return Err(Error::InvalidSize(size));
        }
        Ok(Self {
            board: Board::new(size)?,
            config,
            rng,
        })
    }

    /// Current position.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Serve commands from stdin until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        self.serve(stdin.lock(), io::stdout())
    }

    /// Serve commands from `input`, writing responses to `output`.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            debug!("GTP <- {line}");

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            debug!("GTP -> {prefix}{id_str} {message}");

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id from the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let end = line
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(line.len());
        match line[..end].parse::<u32>() {
            Ok(id) => (Some(id), line[end..].trim()),
            Err(_) => (None, line),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (1..=GTP_MAX_SIZE).contains(&size) => match Board::new(size) {
                        Ok(board) => {
                            self.board = board;
                            (true, String::new())
                        }
                        Err(e) => (false, e.to_string()),
                    },
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => match Board::new(self.board.size()) {
                Ok(board) => {
                    self.board = board;
                    (true, String::new())
                }
                Err(e) => (false, e.to_string()),
            },

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(color) = parse_color(args[0]) else {
                    return (false, "invalid color".to_string());
                };
                let Some((x, y)) = parse_vertex(args[1], self.board.size()) else {
                    return (false, "invalid vertex".to_string());
                };
                match self.board.play(x, y, color) {
                    Ok(true) => (true, String::new()),
                    Ok(false) => (false, "illegal move".to_string()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|a| parse_color(a)) else {
                    return (false, "invalid color".to_string());
                };
                match self.genmove(color) {
                    Ok(point) => (true, format_vertex(point, self.board.size())),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board)),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Search for `color`, play the result and return it (pass point when
    /// nothing is playable).
    fn genmove(&mut self, color: Color) -> Result<Point> {
        let result = select_move(&self.board, color, &self.config, &AreaScorer, &mut self.rng)?;
        let point = result.best.unwrap_or(self.board.pass_point());
        self.board.play(point.0, point.1, color)?;
        Ok(point)
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

/// Parse a GTP vertex such as `D4` or `pass`. Pass maps to `(size, size)`.
pub fn parse_vertex(s: &str, size: usize) -> Option<Point> {
    if s.eq_ignore_ascii_case("pass") {
        return Some((size, size));
    }

    let col_char = s.bytes().next()?.to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut y = (col_char - b'A') as usize;
    // No 'I' column.
    if col_char > b'I' {
        y -= 1;
    }

    let row: usize = s.get(1..)?.parse().ok()?;
    if y >= size || row == 0 || row > size {
        return None;
    }
    Some((size - row, y))
}

/// Format a point as a GTP vertex; `(size, size)` is `pass`.
pub fn format_vertex(point: Point, size: usize) -> String {
    if point == (size, size) {
        return "pass".into();
    }
    let (x, y) = point;
    let mut c = b'A' + y as u8;
    if c >= b'I' {
        c += 1;
    }
    format!("{}{}", c as char, size - x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GtpEngine {
        let config = SearchConfig {
            iterations: 50,
            ..SearchConfig::default()
        };
        GtpEngine::new(9, config, Rng::with_seed(1)).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_vertex_roundtrip() {
        for size in [1, 5, 9, 19, 25] {
            for x in 0..size {
                for y in 0..size {
                    let s = format_vertex((x, y), size);
                    assert_eq!(parse_vertex(&s, size), Some((x, y)), "vertex {s}");
                }
            }
        }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(parse_vertex("A1", 9), Some((8, 0)));
        assert_eq!(parse_vertex("J9", 9), Some((0, 8)));
        assert_eq!(parse_vertex("pass", 9), Some((9, 9)));
        assert_eq!(parse_vertex("I5", 9), None);
        assert_eq!(parse_vertex("K1", 9), None);
        assert_eq!(parse_vertex("A0", 9), None);
        assert_eq!(parse_vertex("A10", 9), None);
        assert_eq!(format_vertex((9, 9), 9), "pass");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]), (true, "true".into()));
        assert_eq!(engine.execute("known_command", &["komi"]), (true, "false".into()));
    }

    #[test]
    fn test_boardsize() {
        let mut engine = engine();
        assert!(engine.execute("boardsize", &["13"]).0);
        assert_eq!(engine.board().size(), 13);
        assert!(!engine.execute("boardsize", &["26"]).0);
        assert!(!engine.execute("boardsize", &["0"]).0);
        assert!(!engine.execute("boardsize", &["x"]).0);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = engine();
        assert!(engine.execute("play", &["black", "D4"]).0);
        assert_eq!(engine.board().get(5, 3), Some(Color::Black));
        assert!(!engine.execute("play", &["white", "D4"]).0);
        assert!(engine.execute("play", &["white", "pass"]).0);
        assert!(engine.execute("clear_board", &[]).0);
        assert_eq!(*engine.board(), Board::new(9).unwrap());
    }

    #[test]
    fn test_genmove_plays_on_board() {
        let mut engine = engine();
        let (ok, vertex) = engine.execute("genmove", &["b"]);
        assert!(ok);
        let (x, y) = parse_vertex(&vertex, 9).unwrap();
        assert_eq!(engine.board().get(x, y), Some(Color::Black));
    }

    #[test]
    fn test_serve_session() {
        let mut engine = engine();
        let input = b"1 name\nboardsize 5\n# comment\n2 play w C3\nquit\nname\n";
        let mut out = Vec::new();
        engine.serve(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "=1 uct-go\n\n= \n\n=2 \n\n= \n\n");
        assert_eq!(engine.board().get(2, 2), Some(Color::White));
    }
}
