//! Move ordering: killer moves, history counters and static move scores

use crate::board::{Board, Side};
use crate::geometry::{self, Cell, Direction, NUM_CELLS, NUM_DIRECTIONS};
use crate::moves::Move;
use std::cmp::Reverse;

/// Killer slots kept per depth
pub const KILLERS_PER_DEPTH: usize = 2;

const PUSH_BONUS: i32 = 100;
const ELIMINATION_BONUS: i32 = 1_000;
const CENTER_STEP: i32 = 10;
const GROUP_BONUS: i32 = 5;
const EDGE_PENALTY: i32 = 15;
const SUPPORT_STEP: i32 = 2;

// ============================================================================
// KILLER MOVES
// ============================================================================

/// Quiet moves that caused a cutoff, indexed by remaining depth
#[derive(Clone, Debug, Default)]
pub struct KillerTable {
    slots: Vec<[Option<Move>; KILLERS_PER_DEPTH]>,
}

impl KillerTable {
    pub fn new(max_depth: usize) -> Self {
        Self {
            slots: vec![[None; KILLERS_PER_DEPTH]; max_depth + 1],
        }
    }

    pub fn get(&self, depth: usize) -> [Option<Move>; KILLERS_PER_DEPTH] {
        self.slots.get(depth).copied().unwrap_or_default()
    }

    /// Remember `mv`, pushing the older killer into the second slot
    pub fn record(&mut self, depth: usize, mv: Move) {
        if depth >= self.slots.len() {
            self.slots.resize(depth + 1, [None; KILLERS_PER_DEPTH]);
        }
        let slot = &mut self.slots[depth];
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = [None; KILLERS_PER_DEPTH]);
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// Cutoff counters keyed by (first cell, direction)
#[derive(Clone, Copy, Debug)]
pub struct HistoryTable {
    scores: [[i32; NUM_DIRECTIONS]; NUM_CELLS],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self {
            scores: [[0; NUM_DIRECTIONS]; NUM_CELLS],
        }
    }
}

impl HistoryTable {
    fn key(mv: &Move) -> (usize, usize) {
        (mv.cells()[0] as usize, mv.direction.index())
    }

    pub fn score(&self, mv: &Move) -> i32 {
        let (cell, dir) = Self::key(mv);
        self.scores[cell][dir]
    }

    /// Bump by depth squared
    pub fn record(&mut self, mv: &Move, depth: i32) {
        let (cell, dir) = Self::key(mv);
        let entry = &mut self.scores[cell][dir];
        *entry = entry.saturating_add(depth * depth);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// MOVE SCORING
// ============================================================================

/// True if pushing with `mv` drops an opposing marble off the board
pub fn is_elimination(mv: &Move) -> bool {
    if !mv.is_push() {
        return false;
    }
    let cells = mv.cells();
    let front = if Direction::AXES.contains(&mv.direction) {
        cells[cells.len() - 1]
    } else {
        cells[0]
    };
    let mut cursor = Some(front);
    for _ in 0..=mv.push_count {
        cursor = cursor.and_then(|c| geometry::neighbor(c, mv.direction));
    }
    cursor.is_none()
}

/// Friendly marbles around `cell` before the move
fn support(board: &Board, cell: Cell, side: Side) -> i32 {
    geometry::coord_map()
        .neighbors(cell)
        .iter()
        .flatten()
        .filter(|&&n| board.occupant(n) == Some(side))
        .count() as i32
}

fn destination(cell: Cell, dir: Direction) -> Cell {
    geometry::neighbor(cell, dir).unwrap_or(cell)
}

/// Cheap static estimate of how promising `mv` is for the side to move
pub fn score_move(board: &Board, mv: &Move) -> i32 {
    let mover = board.side_to_move();
    let mut score = 0;

    if mv.is_push() {
        score += PUSH_BONUS * mv.push_count as i32;
        if is_elimination(mv) {
            score += ELIMINATION_BONUS;
        }
    }

    for &cell in mv.cells() {
        let dest = destination(cell, mv.direction);
        let closer = geometry::distance_to_center(cell) - geometry::distance_to_center(dest);
        score += CENTER_STEP * closer as i32;
        score += EDGE_PENALTY * (geometry::is_edge(cell) as i32 - geometry::is_edge(dest) as i32);
        score += SUPPORT_STEP * (support(board, dest, mover) - support(board, cell, mover));
    }

    score + GROUP_BONUS * (mv.len() as i32 - 1)
}

/// Sort `moves` best-first: TT move, killers, then static score plus history
pub fn order_moves(
    board: &Board,
    moves: &mut [Move],
    tt_move: Option<Move>,
    killers: [Option<Move>; KILLERS_PER_DEPTH],
    history: &HistoryTable,
) {
    moves.sort_by_cached_key(|mv| {
        let key = if Some(*mv) == tt_move {
            i32::MAX
        } else if Some(*mv) == killers[0] {
            i32::MAX - 1
        } else if Some(*mv) == killers[1] {
            i32::MAX - 2
        } else {
            score_move(board, mv).saturating_add(history.score(mv)).min(i32::MAX - 3)
        };
        Reverse(key)
    });
}
