//! Monte Carlo Tree Search with UCB1 (UCT).
//!
//! Each simulation clones the board, walks down the tree picking children by
//! UCB1, adds one new node for a random legal move, finishes the game with a
//! random playout and feeds the result back up to the root.
//!
//! Nodes live in an arena owned by [`Tree`]. Children are stored as indices
//! on their parent and every node keeps the index of its parent, so
//! backpropagation is a walk up parent indices. The tree is built for one
//! move decision and dropped as a whole afterwards.

use std::fmt;
use std::ops::Index;
use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{debug, info, log_enabled, trace};

use crate::board::{Board, Color, Point};
use crate::constants::{N_SIMS, UCT_EXPLORE, UCT_K};
use crate::error::{Error, Result};
use crate::playout::{play_random, playout};
use crate::score::{Scorer, winner};

/// Search budget and tuning.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Maximum number of simulations per move.
    pub iterations: u32,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Descent stops at a step when a draw from `0..1000` is at most this.
    pub explore_permille: u32,
    /// Wall-clock budget, checked between simulations.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: N_SIMS,
            exploration: UCT_K,
            explore_permille: UCT_EXPLORE,
            time_limit: None,
        }
    }
}

/// Index of a node in its [`Tree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node in the search tree: one candidate move from its parent's position.
#[derive(Debug)]
pub struct Node {
    /// Move leading here (`None` for the root).
    pub point: Option<Point>,
    /// Color that played `point` (`None` for the root).
    pub color: Option<Color>,
    pub visits: u32,
    /// Simulations won by `color`.
    pub wins: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(parent: Option<NodeId>, point: Option<Point>, color: Option<Color>) -> Self {
        Self {
            point,
            color,
            visits: 0,
            wins: 0,
            parent,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Fraction of visits won, 0 when unvisited.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Arena of search nodes. Index 0 is the root.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, None, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `parent` for `point`, created if it does not exist yet.
    pub fn add_child(&mut self, parent: NodeId, point: Point, color: Color) -> Result<NodeId> {
        if let Some(&existing) = self.nodes[parent.0]
            .children
            .iter()
            .find(|&&c| self.nodes[c.0].point == Some(point))
        {
            return Ok(existing);
        }

        self.nodes
            .try_reserve(1)
            .map_err(|_| Error::ResourceExhausted("search tree"))?;
        self.nodes[parent.0]
            .children
            .try_reserve(1)
            .map_err(|_| Error::ResourceExhausted("search tree"))?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(parent), Some(point), Some(color)));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Child of `parent` with the highest UCB1 value, or `None` if it has no
    /// children.
    ///
    /// Every child must have been visited. The running best starts at zero
    /// and only a strictly greater value replaces it, so the first child
    /// wins ties and is kept when nothing scores above zero.
    pub fn select_child(&self, parent: NodeId, k: f64) -> Option<NodeId> {
        let node = &self.nodes[parent.0];
        let first = *node.children.first()?;
        let log_visits = (node.visits as f64).ln();

        let mut chosen = first;
        let mut best_val = 0.0;
        for &c in &node.children {
            let child = &self.nodes[c.0];
            debug_assert!(child.visits > 0, "unvisited child in select_child");
            let visits = child.visits as f64;
            let val = child.wins as f64 / visits + k * (2.0 * log_visits / visits).sqrt();
            if val > best_val {
                chosen = c;
                best_val = val;
            }
        }
        Some(chosen)
    }

    /// Record one simulation result on `from` and all its ancestors.
    pub fn backpropagate(&mut self, from: NodeId, winner: Option<Color>) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            if node.color.is_some() && node.color == winner {
                node.wins += 1;
            }
            cur = node.parent;
        }
    }

    /// Most visited child of `parent`; the first one scanned wins ties.
    pub fn best_child(&self, parent: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &c in &self.nodes[parent.0].children {
            if best.is_none_or(|b| self.nodes[c.0].visits > self.nodes[b.0].visits) {
                best = Some(c);
            }
        }
        best
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self.nodes[id.0];
        let color = node.color.map_or("root".to_string(), |c| c.to_string());
        let (x, y) = node.point.unwrap_or_default();
        writeln!(
            f,
            "{:indent$}{color}:({x}, {y}) W: {} V: {}",
            "",
            node.wins,
            node.visits,
            indent = depth * 2
        )?;
        for &c in &node.children {
            self.fmt_node(f, c, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}

/// Outcome of a move search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Move to play, `None` to pass.
    pub best: Option<Point>,
    /// Wins of the chosen move.
    pub wins: u32,
    /// Visits of the chosen move.
    pub visits: u32,
    /// Simulations run.
    pub simulations: u32,
}

impl SearchResult {
    /// Win rate of the chosen move, 0 when there is none.
    pub fn win_rate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Run one simulation from the root with `color` to move.
fn simulate<S: Scorer + ?Sized>(
    tree: &mut Tree,
    board: &Board,
    color: Color,
    config: &SearchConfig,
    scorer: &S,
    rng: &mut Rng,
) -> Result<()> {
    let mut scratch = board.try_clone()?;
    let mut node = tree.root();
    let mut to_move = color;

    while rng.u32(..1000) > config.explore_permille {
        let Some(child) = tree.select_child(node, config.exploration) else {
            break;
        };
        node = child;
        if let Some((x, y)) = tree[node].point {
            let result = scratch.play_move(x, y, to_move)?;
            debug_assert!(result.is_legal(), "tree move ({x}, {y}) became illegal");
        }
        to_move = to_move.opponent();
    }

    if let Some(point) = play_random(&mut scratch, to_move, rng) {
        node = tree.add_child(node, point, to_move)?;
        to_move = to_move.opponent();
    }

    playout(&mut scratch, to_move, rng);
    let score = scorer.score(&scratch);
    tree.backpropagate(node, winner(score));
    Ok(())
}

/// Run up to `config.iterations` simulations on `tree` for `color` to move.
///
/// Stops early once `config.time_limit` has elapsed. Returns the number of
/// simulations run; `board` is never modified.
pub fn tree_search<S: Scorer + ?Sized>(
    tree: &mut Tree,
    board: &Board,
    color: Color,
    config: &SearchConfig,
    scorer: &S,
    rng: &mut Rng,
) -> Result<u32> {
    let deadline = config.time_limit.map(|limit| Instant::now() + limit);
    let mut sims = 0;

    while sims < config.iterations {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            debug!("time limit reached after {sims} simulations");
            break;
        }
        simulate(tree, board, color, config, scorer, rng)?;
        sims += 1;
    }

    Ok(sims)
}

/// Pick a move for `color` on `board`.
///
/// Builds a fresh tree, searches it, and returns the most visited root
/// child. `best` is `None` when no legal move was ever found.
pub fn select_move<S: Scorer + ?Sized>(
    board: &Board,
    color: Color,
    config: &SearchConfig,
    scorer: &S,
    rng: &mut Rng,
) -> Result<SearchResult> {
    let mut tree = Tree::new();
    let simulations = tree_search(&mut tree, board, color, config, scorer, rng)?;

    debug!(
        "searched {simulations} simulations, {} nodes, {} root children",
        tree.len(),
        tree[tree.root()].children().len()
    );
    if log_enabled!(log::Level::Trace) {
        trace!("search tree:\n{tree}");
    }

    let result = match tree.best_child(tree.root()) {
        Some(best) => {
            let node = &tree[best];
            info!(
                "ODDS {color}: {:.1}% ({}/{})",
                100.0 * node.winrate(),
                node.wins,
                node.visits
            );
            SearchResult {
                best: node.point,
                wins: node.wins,
                visits: node.visits,
                simulations,
            }
        }
        None => {
            info!("no legal move for {color}, passing");
            SearchResult {
                best: None,
                wins: 0,
                visits: 0,
                simulations,
            }
        }
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::AreaScorer;

    fn config(iterations: u32) -> SearchConfig {
        SearchConfig {
            iterations,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (2, 3), Color::Black).unwrap();
        let b = tree.add_child(root, (2, 3), Color::Black).unwrap();
        assert_eq!(a, b);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[root].children(), &[a]);
        assert_eq!(tree[a].parent(), Some(root));
    }

    #[test]
    fn test_select_child_without_children() {
        let tree = Tree::new();
        assert_eq!(tree.select_child(tree.root(), UCT_K), None);
    }

    #[test]
    fn test_select_child_prefers_first_on_tie() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (0, 0), Color::Black).unwrap();
        let b = tree.add_child(root, (0, 1), Color::Black).unwrap();
        tree.backpropagate(a, Some(Color::Black));
        tree.backpropagate(b, Some(Color::Black));
        assert_eq!(tree.select_child(root, UCT_K), Some(a));
    }

    #[test]
    fn test_select_child_falls_back_to_first_when_all_zero() {
        // No exploration term and only losses: every value is exactly zero.
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (0, 0), Color::Black).unwrap();
        let b = tree.add_child(root, (0, 1), Color::Black).unwrap();
        tree.backpropagate(b, Some(Color::White));
        tree.backpropagate(a, Some(Color::White));
        assert_eq!(tree.select_child(root, 0.0), Some(a));
    }

    #[test]
    fn test_select_child_prefers_winner() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (0, 0), Color::Black).unwrap();
        let b = tree.add_child(root, (0, 1), Color::Black).unwrap();
        for _ in 0..10 {
            tree.backpropagate(a, Some(Color::White));
            tree.backpropagate(b, Some(Color::Black));
        }
        assert_eq!(tree.select_child(root, UCT_K), Some(b));
    }

    #[test]
    fn test_backpropagate_counts_by_color() {
        let mut tree = Tree::new();
        let root = tree.root();
        let b = tree.add_child(root, (0, 0), Color::Black).unwrap();
        let w = tree.add_child(b, (1, 1), Color::White).unwrap();
        tree.backpropagate(w, Some(Color::Black));
        tree.backpropagate(w, None);
        assert_eq!((tree[w].wins, tree[w].visits), (0, 2));
        assert_eq!((tree[b].wins, tree[b].visits), (1, 2));
        assert_eq!((tree[root].wins, tree[root].visits), (0, 2));
    }

    #[test]
    fn test_best_child_by_visits() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (0, 0), Color::Black).unwrap();
        let b = tree.add_child(root, (0, 1), Color::Black).unwrap();
        tree.backpropagate(a, Some(Color::Black));
        tree.backpropagate(b, None);
        tree.backpropagate(b, None);
        assert_eq!(tree.best_child(root), Some(b));
        assert_eq!(tree.best_child(a), None);
    }

    #[test]
    fn test_root_visits_equal_iterations() {
        let board = Board::new(5).unwrap();
        let mut tree = Tree::new();
        let mut rng = Rng::with_seed(42);
        let sims =
            tree_search(&mut tree, &board, Color::Black, &config(200), &AreaScorer, &mut rng)
                .unwrap();
        assert_eq!(sims, 200);
        assert_eq!(tree[tree.root()].visits, 200);
        let child_visits: u32 = tree[tree.root()]
            .children()
            .iter()
            .map(|&c| tree[c].visits)
            .sum();
        assert!(child_visits <= 200);
        for i in 0..tree.len() {
            let node = &tree.nodes[i];
            assert!(node.wins <= node.visits);
            let below: u32 = node.children.iter().map(|&c| tree[c].visits).sum();
            assert!(below <= node.visits);
        }
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let mut board = Board::new(5).unwrap();
        assert!(board.play(2, 2, Color::Black).unwrap());
        let before = board.clone();
        let mut rng = Rng::with_seed(5);
        let result =
            select_move(&board, Color::White, &config(100), &AreaScorer, &mut rng).unwrap();
        assert_eq!(board, before);
        let (x, y) = result.best.unwrap();
        assert_eq!(board.get(x, y), None);
        assert!(result.visits >= 1);
        assert_eq!(result.simulations, 100);
    }

    #[test]
    fn test_no_move_on_single_cell() {
        let board = Board::new(1).unwrap();
        let mut rng = Rng::with_seed(9);
        let result =
            select_move(&board, Color::Black, &config(20), &AreaScorer, &mut rng).unwrap();
        assert_eq!(result.best, None);
        assert_eq!(result.win_rate(), 0.0);
    }

    #[test]
    fn test_zero_time_limit_runs_nothing() {
        let board = Board::new(5).unwrap();
        let mut rng = Rng::with_seed(1);
        let cfg = SearchConfig {
            time_limit: Some(Duration::ZERO),
            ..config(1000)
        };
        let result = select_move(&board, Color::Black, &cfg, &AreaScorer, &mut rng).unwrap();
        assert_eq!(result.simulations, 0);
        assert_eq!(result.best, None);
    }

    #[test]
    fn test_same_seed_same_move() {
        let board = Board::new(5).unwrap();
        let run = |seed| {
            let mut rng = Rng::with_seed(seed);
            select_move(&board, Color::Black, &config(300), &AreaScorer, &mut rng)
                .unwrap()
                .best
        };
        assert_eq!(run(17), run(17));
    }

    #[test]
    fn test_tree_dump() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, (1, 2), Color::Black).unwrap();
        tree.backpropagate(a, Some(Color::Black));
        assert_eq!(tree.to_string(), "root:(0, 0) W: 0 V: 1\n  black:(1, 2) W: 1 V: 1\n");
    }
}
