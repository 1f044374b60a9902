//! Go board: stone placement, liberties, captures and simple ko.
//!
//! Cells are stored in a flat vector indexed by `x * size + y`. Rows of the
//! rendered board correspond to `x`, columns to `y`.
//!
//! Liberty queries flood-fill a group with a mark set. Marks are cleared by
//! a scope guard when the query returns, whichever path it returns by, so a
//! query that stops at the first liberty never leaves stale marks behind.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A point on the board as `(x, y)`. `(size, size)` denotes a pass.
pub type Point = (usize, usize);

/// Why a move was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Illegal {
    /// Point is not empty.
    Occupied,
    /// Immediate recapture of a ko.
    Ko,
    /// The stone would have no liberties and captures nothing.
    Suicide,
}

/// Result of attempting to play a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// A stone was placed, removing `captured` opponent stones.
    Played { captured: u32 },
    Passed,
    /// The board is unchanged.
    Illegal(Illegal),
}

impl MoveResult {
    #[inline]
    pub fn is_legal(&self) -> bool {
        !matches!(self, MoveResult::Illegal(_))
    }
}

/// Mark set for one liberty query at a time.
#[derive(Clone, Debug, Default)]
struct Marks {
    marked: Vec<bool>,
    touched: Vec<usize>,
    stack: Vec<usize>,
}

impl Marks {
    fn with_cells(n: usize) -> Result<Self> {
        let mut marked = Vec::new();
        marked
            .try_reserve_exact(n)
            .map_err(|_| Error::ResourceExhausted("board marks"))?;
        marked.resize(n, false);
        Ok(Self {
            marked,
            touched: Vec::new(),
            stack: Vec::new(),
        })
    }

    fn scan(&mut self) -> Scan<'_> {
        Scan { marks: self }
    }
}

/// A flood fill in progress. Every cell marked through it is unmarked on drop.
struct Scan<'a> {
    marks: &'a mut Marks,
}

impl Scan<'_> {
    /// Queue `idx` unless it was already visited.
    #[inline]
    fn push(&mut self, idx: usize) {
        if !self.marks.marked[idx] {
            self.marks.marked[idx] = true;
            self.marks.touched.push(idx);
            self.marks.stack.push(idx);
        }
    }

    #[inline]
    fn pop(&mut self) -> Option<usize> {
        self.marks.stack.pop()
    }
}

impl Drop for Scan<'_> {
    fn drop(&mut self) {
        for idx in self.marks.touched.drain(..) {
            self.marks.marked[idx] = false;
        }
        self.marks.stack.clear();
    }
}

/// Orthogonal neighbors of `idx` in the order up, left, down, right.
///
/// The slot position doubles as the bit position in capture masks.
#[inline]
fn neighbors(size: usize, idx: usize) -> [Option<usize>; 4] {
    let (x, y) = (idx / size, idx % size);
    [
        (x > 0).then(|| idx - size),
        (y > 0).then(|| idx - 1),
        (x + 1 < size).then(|| idx + size),
        (y + 1 < size).then(|| idx + 1),
    ]
}

#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
    captures: [u32; 2],
    /// Point vacated by the last single-stone capture and the color barred
    /// from playing there next.
    ko: Option<(usize, Color)>,
    marks: Marks,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.cells == other.cells
            && self.captures == other.captures
            && self.ko == other.ko
    }
}

impl Eq for Board {}

impl Board {
    /// Create an empty `size` x `size` board.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size > crate::constants::MAX_SIZE {
            return Err(Error::InvalidSize(size));
        }
        let n = size * size;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(n)
            .map_err(|_| Error::ResourceExhausted("board"))?;
        cells.resize(n, None);
        Ok(Self {
            size,
            cells,
            captures: [0; 2],
            ko: None,
            marks: Marks::with_cells(n)?,
        })
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(self.cells.len())
            .map_err(|_| Error::ResourceExhausted("board"))?;
        cells.extend_from_slice(&self.cells);
        Ok(Self {
            size: self.size,
            cells,
            captures: self.captures,
            ko: self.ko,
            marks: Marks::with_cells(self.cells.len())?,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of points on the board.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The pass point `(size, size)`.
    #[inline]
    pub fn pass_point(&self) -> Point {
        (self.size, self.size)
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        (idx / self.size, idx % self.size)
    }

    /// Stone at `(x, y)`, or `None` if empty or off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub(crate) fn is_empty_at(&self, idx: usize) -> bool {
        self.cells[idx].is_none()
    }

    /// Opponent stones captured so far by `color`.
    pub fn captures(&self, color: Color) -> u32 {
        self.captures[color.index()]
    }

    /// The point barred by simple ko, if any.
    pub fn ko_point(&self) -> Option<Point> {
        self.ko.map(|(idx, _)| self.point(idx))
    }

    /// Play `color` at `(x, y)`. Returns whether the move was legal.
    pub fn play(&mut self, x: usize, y: usize, color: Color) -> Result<bool> {
        Ok(self.play_move(x, y, color)?.is_legal())
    }

    /// Play `color` at `(x, y)`; `(size, size)` passes.
    ///
    /// # Errors
    /// [`Error::InvalidMove`] if the point is off the board and not the pass
    /// point. Illegal moves are not errors; they come back as
    /// [`MoveResult::Illegal`] with the board untouched.
    pub fn play_move(&mut self, x: usize, y: usize, color: Color) -> Result<MoveResult> {
        if (x, y) == self.pass_point() {
            self.pass();
            return Ok(MoveResult::Passed);
        }
        if x >= self.size || y >= self.size {
            return Err(Error::InvalidMove {
                x,
                y,
                size: self.size,
            });
        }
        Ok(self.place(self.idx(x, y), color))
    }

    /// Pass. Clears any ko.
    pub fn pass(&mut self) {
        self.ko = None;
    }

    /// Place a stone at an on-board index.
    pub(crate) fn place(&mut self, idx: usize, color: Color) -> MoveResult {
        if self.cells[idx].is_some() {
            return MoveResult::Illegal(Illegal::Occupied);
        }
        if self.ko == Some((idx, color)) {
            return MoveResult::Illegal(Illegal::Ko);
        }

        self.cells[idx] = Some(color);
        let own_libs = self.has_liberties(idx);

        let opp = color.opponent();
        let around = neighbors(self.size, idx);
        let mut killing = 0u8;
        for (dir, n) in around.iter().enumerate() {
            if let Some(n) = *n {
                if self.cells[n] == Some(opp) && !self.has_liberties(n) {
                    killing |= 1 << dir;
                }
            }
        }

        if !own_libs && killing == 0 {
            self.cells[idx] = None;
            return MoveResult::Illegal(Illegal::Suicide);
        }

        let mut captured = 0;
        let mut vacated = idx;
        for (dir, n) in around.iter().enumerate() {
            if let Some(n) = *n {
                if killing & (1 << dir) != 0 {
                    let killed = self.kill_group(n, opp);
                    if killed > 0 {
                        vacated = n;
                    }
                    captured += killed;
                }
            }
        }
        self.captures[color.index()] += captured;

        self.ko = None;
        let lone = around
            .iter()
            .flatten()
            .all(|&n| self.cells[n] != Some(color));
        if captured == 1 && lone {
            self.ko = Some((vacated, opp));
        }

        MoveResult::Played { captured }
    }

    /// Does the group containing the stone at `idx` touch an empty point?
    fn has_liberties(&mut self, idx: usize) -> bool {
        let Some(color) = self.cells[idx] else {
            return true;
        };
        let size = self.size;
        let cells = &self.cells;
        let mut scan = self.marks.scan();
        scan.push(idx);
        while let Some(cur) = scan.pop() {
            for n in neighbors(size, cur).into_iter().flatten() {
                match cells[n] {
                    None => return true,
                    Some(c) if c == color => scan.push(n),
                    Some(_) => {}
                }
            }
        }
        false
    }

    /// Remove the `color` group at `idx`, returning the number of stones.
    fn kill_group(&mut self, idx: usize, color: Color) -> u32 {
        if self.cells[idx] != Some(color) {
            return 0;
        }
        let mut killed = 0;
        let mut stack = vec![idx];
        self.cells[idx] = None;
        while let Some(cur) = stack.pop() {
            killed += 1;
            for n in neighbors(self.size, cur).into_iter().flatten() {
                if self.cells[n] == Some(color) {
                    self.cells[n] = None;
                    stack.push(n);
                }
            }
        }
        killed
    }

    /// Is `(x, y)` probably an eye of `color`?
    ///
    /// True when every orthogonal neighbor on the board holds `color`.
    /// Diagonals are ignored, so false eyes count too. Playouts only use
    /// this to avoid filling their own eyes, where a false positive costs
    /// little.
    pub fn is_likely_eye(&self, x: usize, y: usize, color: Color) -> bool {
        if x >= self.size || y >= self.size {
            return false;
        }
        self.is_likely_eye_at(self.idx(x, y), color)
    }

    pub(crate) fn is_likely_eye_at(&self, idx: usize, color: Color) -> bool {
        neighbors(self.size, idx)
            .into_iter()
            .flatten()
            .all(|n| self.cells[n] == Some(color))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..self.size {
            for y in 0..self.size {
                let ch = match self.get(x, y) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
