//! Alpha-beta search engine
//!
//! Minimax with principal variation search, a shared transposition table,
//! killer/history ordering and iterative deepening under a wall-clock budget.
//! The first few root moves are searched in parallel with rayon; everything
//! below the root runs sequentially on a board mutated in place and undone.

use crate::board::{Board, Side};
use crate::config::EngineConfig;
use crate::eval::{
    decided_by_material, evaluate_position, evaluate_with_depth, is_decisive, win_score, Heuristics, INFINITY,
};
use crate::moves::Move;
use crate::ordering::{order_moves, HistoryTable, KillerTable};
use crate::tt::{Bound, TranspositionTable};
use crate::zobrist::ZobristKeys;
use rayon::prelude::*;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ============================================================================
// SEARCH BOOKKEEPING
// ============================================================================

/// Progress of the current (or last) root search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    SearchingDepth(u32),
    DepthComplete(u32),
    TimedOut,
}

/// Outcome of a root search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move
    pub best_move: Option<Move>,
    /// Score from Black's perspective
    pub score: i32,
    /// Deepest fully completed iteration (1 for the fallback scan)
    pub depth: u32,
    pub nodes: u64,
    pub prunes: u64,
    pub elapsed: Duration,
    /// True if any iteration was abandoned on the clock
    pub timed_out: bool,
}

/// Per-engine counters
#[derive(Debug, Default)]
pub struct SearchStats {
    nodes: AtomicU64,
    prunes: AtomicU64,
}

impl SearchStats {
    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    pub fn prunes(&self) -> u64 {
        self.prunes.load(Ordering::Relaxed)
    }

    fn count_node(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    fn count_prune(&self) {
        self.prunes.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.nodes.store(0, Ordering::Relaxed);
        self.prunes.store(0, Ordering::Relaxed);
    }
}

/// Deadline shared by every task of one root search
struct SearchContext {
    deadline: Option<Instant>,
    timed_out: AtomicBool,
}

impl SearchContext {
    fn new(start: Instant, time_limit: Option<Duration>) -> Self {
        Self {
            deadline: time_limit.and_then(|limit| start.checked_add(limit)),
            timed_out: AtomicBool::new(false),
        }
    }

    /// Poll the clock; once past the deadline the flag stays set
    fn check_time(&self) -> bool {
        if self.timed_out.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.timed_out.store(true, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Relaxed)
    }
}

/// True if `score` is better than `best` for `side`
fn improves(side: Side, score: i32, best: i32) -> bool {
    match side {
        Side::Black => score > best,
        Side::White => score < best,
    }
}

fn worst_score(side: Side) -> i32 {
    match side {
        Side::Black => -INFINITY,
        Side::White => INFINITY,
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct Engine {
    config: EngineConfig,
    keys: ZobristKeys,
    tt: TranspositionTable,
    killers: Mutex<KillerTable>,
    history: Mutex<HistoryTable>,
    stats: SearchStats,
    state: Mutex<SearchState>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let tt = TranspositionTable::new(config.tt_size_mb);
        Self {
            keys: ZobristKeys::new(config.zobrist_seed),
            killers: Mutex::new(KillerTable::new(config.max_depth as usize)),
            history: Mutex::new(HistoryTable::default()),
            stats: SearchStats::default(),
            state: Mutex::new(SearchState::Idle),
            tt,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn keys(&self) -> &ZobristKeys {
        &self.keys
    }

    pub fn state(&self) -> SearchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SearchState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Static evaluation with this engine's weights and loss threshold
    pub fn evaluate(&self, board: &Board) -> i32 {
        evaluate_with_depth(board, &self.config.heuristics, self.config.loss_threshold, 0)
    }

    /// Search with the configured depth and time limit
    pub fn search(&self, board: &Board) -> SearchResult {
        self.find_best_move_iterative_deepening(board, self.config.max_depth, self.config.time_limit())
    }

    /// Single search straight to `max_depth`
    pub fn find_best_move(&self, board: &Board, max_depth: u32, time_limit: Option<Duration>) -> SearchResult {
        let depth = max_depth.max(1);
        self.run(board, depth..=depth, time_limit)
    }

    /// Search depth 1, 2, ... `max_depth`, keeping the deepest iteration that
    /// finished inside `time_limit`
    pub fn find_best_move_iterative_deepening(
        &self,
        board: &Board,
        max_depth: u32,
        time_limit: Option<Duration>,
    ) -> SearchResult {
        self.run(board, 1..=max_depth.max(1), time_limit)
    }

    fn run(&self, board: &Board, depths: RangeInclusive<u32>, time_limit: Option<Duration>) -> SearchResult {
        let start = Instant::now();
        let ctx = SearchContext::new(start, time_limit);
        let mover = board.side_to_move();
        self.stats.reset();
        self.set_state(SearchState::Idle);

        let mut best: Option<(Move, i32, u32)> = None;
        let mut timed_out = false;

        for depth in depths {
            self.begin_iteration();
            self.set_state(SearchState::SearchingDepth(depth));

            let result = self.search_root(&ctx, board, depth as i32);
            if ctx.is_timed_out() {
                debug!("depth {} abandoned after {:?}", depth, start.elapsed());
                self.set_state(SearchState::TimedOut);
                timed_out = true;
                break;
            }

            let Some((mv, score)) = result else { break };
            debug!(
                "depth {} complete: {} score {} nodes {}",
                depth,
                mv.to_notation(mover),
                score,
                self.stats.nodes()
            );
            self.set_state(SearchState::DepthComplete(depth));
            best = Some((mv, score, depth));

            if is_decisive(score) {
                break;
            }
        }

        let found = best.or_else(|| {
            debug!("no depth completed, falling back to a one-ply scan");
            self.static_scan(board).map(|(mv, score)| (mv, score, 1))
        });
        let Some((best_move, score, depth)) = found else {
            info!("{} has no legal move", mover.to_char());
            return SearchResult {
                best_move: None,
                score: win_score(mover.opponent(), 0),
                depth: 0,
                nodes: self.stats.nodes(),
                prunes: self.stats.prunes(),
                elapsed: start.elapsed(),
                timed_out,
            };
        };

        let result = SearchResult {
            best_move: Some(best_move),
            score,
            depth,
            nodes: self.stats.nodes(),
            prunes: self.stats.prunes(),
            elapsed: start.elapsed(),
            timed_out,
        };

        info!(
            "best {} score {} depth {} nodes {} prunes {} in {:?} (tt usage {:.1}%, hit rate {:.1}%)",
            best_move.to_notation(mover),
            result.score,
            result.depth,
            result.nodes,
            result.prunes,
            result.elapsed,
            self.tt.usage(),
            self.tt.hit_rate()
        );

        result
    }

    fn begin_iteration(&self) {
        self.killers.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.tt.new_search();
    }

    /// Best move by static evaluation of each child, with no clock
    fn static_scan(&self, board: &Board) -> Option<(Move, i32)> {
        let mover = board.side_to_move();
        let mut best: Option<(Move, i32)> = None;

        for mv in board.legal_moves() {
            let mut child = board.clone();
            child.make_move(&mv);
            self.stats.count_node();
            let score = self.evaluate(&child);
            if best.map_or(true, |(_, b)| improves(mover, score, b)) {
                best = Some((mv, score));
            }
        }

        best
    }

    // ========================================================================
    // ROOT
    // ========================================================================

    /// Search every root move to `depth`. The first `root_tasks` moves run
    /// concurrently on their own board copies with a full window; the rest
    /// follow with a null window around the best score so far.
    fn search_root(&self, ctx: &SearchContext, board: &Board, depth: i32) -> Option<(Move, i32)> {
        let mover = board.side_to_move();
        let hash = self.keys.hash(board);

        let mut moves = board.legal_moves();
        if moves.is_empty() {
            return None;
        }
        self.order(board, &mut moves, hash, depth);

        let split = self.config.root_task_count().min(moves.len());
        let (parallel, sequential) = moves.split_at(split);

        let scores: Vec<i32> = parallel
            .par_iter()
            .map(|mv| {
                let mut child = board.clone();
                let delta = child.make_move(mv);
                let child_hash = self.keys.update(hash, &delta);
                self.minimax(ctx, &mut child, child_hash, depth - 1, -INFINITY, INFINITY)
            })
            .collect();

        // ties keep the earlier move
        let mut best_move = parallel[0];
        let mut best_score = scores[0];
        for (mv, &score) in parallel.iter().zip(&scores).skip(1) {
            if improves(mover, score, best_score) {
                best_move = *mv;
                best_score = score;
            }
        }

        let mut child = board.clone();
        for mv in sequential {
            if ctx.is_timed_out() {
                break;
            }
            let delta = child.make_move(mv);
            let child_hash = self.keys.update(hash, &delta);

            let (null_alpha, null_beta) = match mover {
                Side::Black => (best_score, best_score + 1),
                Side::White => (best_score - 1, best_score),
            };
            let mut score = self.minimax(ctx, &mut child, child_hash, depth - 1, null_alpha, null_beta);
            if improves(mover, score, best_score) {
                let (alpha, beta) = match mover {
                    Side::Black => (best_score, INFINITY),
                    Side::White => (-INFINITY, best_score),
                };
                score = self.minimax(ctx, &mut child, child_hash, depth - 1, alpha, beta);
                if improves(mover, score, best_score) {
                    best_move = *mv;
                    best_score = score;
                }
            }
            child.undo_move(&delta);
        }

        if !ctx.is_timed_out() {
            self.tt.store(hash, depth, best_score, Bound::Exact, Some(best_move));
        }
        Some((best_move, best_score))
    }

    fn order(&self, board: &Board, moves: &mut [Move], hash: u64, depth: i32) {
        let tt_move = self.tt.best_move(hash);
        let killers = self
            .killers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(depth as usize);
        let history = *self.history.lock().unwrap_or_else(PoisonError::into_inner);
        order_moves(board, moves, tt_move, killers, &history);
    }

    // ========================================================================
    // INTERIOR
    // ========================================================================

    /// Minimax value of `board` from Black's perspective. Black maximizes.
    /// `board` is restored before returning.
    fn minimax(
        &self,
        ctx: &SearchContext,
        board: &mut Board,
        hash: u64,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.stats.count_node();
        let heuristics = &self.config.heuristics;

        if ctx.check_time() {
            return evaluate_with_depth(board, heuristics, self.config.loss_threshold, depth);
        }
        if let Some(winner) = decided_by_material(board, self.config.loss_threshold) {
            return win_score(winner, depth);
        }
        if depth <= 0 {
            return evaluate_position(board, heuristics);
        }

        if let Some(entry) = self.tt.probe(hash, depth) {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                self.stats.count_prune();
                return entry.score;
            }
        }

        let mover = board.side_to_move();
        let mut moves = board.legal_moves();
        if moves.is_empty() {
            return win_score(mover.opponent(), depth);
        }
        self.order(board, &mut moves, hash, depth);

        // bounds are classified against the window after the TT narrowed it
        let (window_alpha, window_beta) = (alpha, beta);
        let maximizing = mover == Side::Black;
        let mut best_score = worst_score(mover);
        let mut best_move = None;

        for (i, mv) in moves.iter().enumerate() {
            let delta = board.make_move(mv);
            let child_hash = self.keys.update(hash, &delta);

            let score = if i == 0 {
                self.minimax(ctx, board, child_hash, depth - 1, alpha, beta)
            } else {
                let (null_alpha, null_beta) = if maximizing {
                    (alpha, alpha + 1)
                } else {
                    (beta - 1, beta)
                };
                let probe = self.minimax(ctx, board, child_hash, depth - 1, null_alpha, null_beta);
                if probe > alpha && probe < beta {
                    self.minimax(ctx, board, child_hash, depth - 1, alpha, beta)
                } else {
                    probe
                }
            };
            board.undo_move(&delta);

            if ctx.is_timed_out() {
                return if best_move.is_some() { best_score } else { score };
            }

            if improves(mover, score, best_score) {
                best_score = score;
                best_move = Some(*mv);
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.stats.count_prune();
                if !mv.is_push() {
                    self.killers
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record(depth as usize, *mv);
                }
                self.history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record(mv, depth);
                break;
            }
        }

        let bound = if best_score <= window_alpha {
            Bound::Upper
        } else if best_score >= window_beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(hash, depth, best_score, bound, best_move);
        best_score
    }
}

// ============================================================================
// REFERENCE SEARCH
// ============================================================================

/// Plain minimax without pruning, tables or clock. Same scoring rules as
/// [`Engine`], so pruned searches must agree with it exactly.
pub fn reference_minimax(board: &Board, depth: i32, heuristics: &Heuristics, loss_threshold: u8) -> i32 {
    if let Some(winner) = decided_by_material(board, loss_threshold) {
        return win_score(winner, depth);
    }
    if depth <= 0 {
        return evaluate_position(board, heuristics);
    }

    let mover = board.side_to_move();
    let moves = board.legal_moves();
    if moves.is_empty() {
        return win_score(mover.opponent(), depth);
    }

    let mut best = worst_score(mover);
    for mv in &moves {
        let mut child = board.clone();
        child.make_move(mv);
        let score = reference_minimax(&child, depth - 1, heuristics, loss_threshold);
        if improves(mover, score, best) {
            best = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::WIN_SCORE;
    use crate::layout::Layout;

    fn tactical() -> Board {
        Board::from_cells(
            &["C3", "C4", "C5", "D4", "D5", "D6", "E5", "E6", "F6"],
            &["E7", "F7", "G7", "F5", "G6", "E4", "D3"],
            Side::Black,
        )
    }

    fn engine(depth: u32, root_tasks: usize) -> Engine {
        Engine::new(
            EngineConfig::fixed_depth(depth)
                .with_loss_threshold(14)
                .with_tt_size_mb(4)
                .with_root_tasks(root_tasks),
        )
    }

    fn assert_matches_reference(board: &Board, depth: u32, root_tasks: usize) {
        let heuristics = Heuristics::default();
        let expected = reference_minimax(board, depth as i32, &heuristics, 14);

        let result = engine(depth, root_tasks).find_best_move(board, depth, None);
        assert_eq!(result.score, expected, "depth {} with {} root tasks", depth, root_tasks);
        assert_eq!(result.depth, depth);
        assert!(!result.timed_out);

        // the chosen move really achieves that score
        let mv = result.best_move.unwrap();
        let child = board.apply_move(&mv).unwrap();
        assert_eq!(reference_minimax(&child, depth as i32 - 1, &heuristics, 14), expected);
    }

    #[test]
    fn test_pruned_search_matches_plain_minimax() {
        let standard = Board::from_layout(Layout::Standard);
        for root_tasks in [1, 4] {
            assert_matches_reference(&standard, 2, root_tasks);
            assert_matches_reference(&tactical(), 2, root_tasks);
            assert_matches_reference(&tactical(), 3, root_tasks);
        }
    }

    #[test]
    fn test_white_to_move_matches_plain_minimax() {
        let mut board = tactical();
        board.set_side_to_move(Side::White);
        assert_matches_reference(&board, 3, 2);
    }

    #[test]
    fn test_iterative_deepening_completes_without_clock() {
        let engine = engine(3, 2);
        let board = Board::from_layout(Layout::Standard);
        let result = engine.find_best_move_iterative_deepening(&board, 3, None);

        assert_eq!(result.depth, 3);
        assert!(!result.timed_out);
        assert!(board.is_legal_move(&result.best_move.unwrap()));
        assert_eq!(engine.state(), SearchState::DepthComplete(3));
        assert!(result.nodes > 0);
        assert!(result.prunes > 0);
        assert!(engine.tt().usage() > 0.0);
    }

    #[test]
    fn test_tiny_budget_still_returns_legal_move() {
        let engine = Engine::new(EngineConfig::default().with_tt_size_mb(4));
        let board = Board::from_layout(Layout::BelgianDaisy);
        let result = engine.find_best_move_iterative_deepening(&board, 6, Some(Duration::from_nanos(1)));

        assert!(result.timed_out);
        assert_eq!(engine.state(), SearchState::TimedOut);
        // nothing completed, so the answer comes from the one-ply scan
        assert_eq!(result.depth, 1);
        let mv = result.best_move.unwrap();
        assert!(board.is_legal_move(&mv));
    }

    #[test]
    fn test_finds_elimination() {
        let board = Board::from_cells(&["E2", "E3"], &["E1"], Side::Black);
        let result = engine(2, 1).find_best_move_iterative_deepening(&board, 2, None);

        let mv = result.best_move.unwrap();
        assert_eq!(mv.to_notation(Side::Black), "(b, E2 E3) i → W");
        assert!(result.score >= WIN_SCORE);
    }

    #[test]
    fn test_white_prefers_lower_scores() {
        let board = Board::from_cells(&["E1"], &["E2", "E3"], Side::White);
        let result = engine(1, 1).find_best_move(&board, 1, None);
        assert_eq!(result.best_move.unwrap().to_notation(Side::White), "(w, E2 E3) i → W");
        assert!(result.score <= -WIN_SCORE);
    }

    #[test]
    fn test_no_legal_move_is_a_loss() {
        let board = Board::from_cells(&["A1"], &["A2", "B1", "B2"], Side::Black);
        let result = engine(3, 1).find_best_move_iterative_deepening(&board, 3, None);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -WIN_SCORE);
    }

    #[test]
    fn test_reference_minimax_terminal_bonus() {
        let heuristics = Heuristics::default();
        let board = Board::from_cells(&["E2", "E3"], &["E1"], Side::Black);
        // the win is found one ply down with one ply of depth left
        assert_eq!(reference_minimax(&board, 2, &heuristics, 14), WIN_SCORE + 1);
    }
}
