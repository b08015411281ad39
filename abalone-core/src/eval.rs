//! Position evaluation
//!
//! Scores are integers from Black's point of view: positive favours Black.

use crate::board::{Board, Side, STARTING_MARBLES};
use crate::geometry::{self, Cell, Direction, CENTER_CELLS};
use serde::{Deserialize, Serialize};

/// Score of a won position, before the depth bonus
pub const WIN_SCORE: i32 = 1_000_000;

/// Bound used for the initial search window
pub const INFINITY: i32 = 2 * WIN_SCORE;

/// Default number of lost marbles that ends the game
pub const DEFAULT_LOSS_THRESHOLD: u8 = 6;

/// Marbles on the board when the endgame weights are fully in effect
const ENDGAME_MARBLES: f32 = 16.0;

/// A weight that shifts linearly from `opening` to `endgame` as marbles leave
/// the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWeight {
    pub opening: i32,
    pub endgame: i32,
}

impl PhaseWeight {
    pub const fn new(opening: i32, endgame: i32) -> Self {
        Self { opening, endgame }
    }

    /// Weight at game progress `progress` (0 = opening, 1 = endgame)
    pub fn at(&self, progress: f32) -> i32 {
        let span = (self.endgame - self.opening) as f32;
        self.opening + (span * progress).round() as i32
    }
}

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Per marble of material difference
    pub material: PhaseWeight,
    /// Per marble on one of the five centre cells
    pub center: PhaseWeight,
    /// Per adjacent pair of same-coloured marbles
    pub cohesion: PhaseWeight,
    /// Per exposed edge marble (subtracted)
    pub edge_danger: PhaseWeight,
    /// Per available sumito, elimination threats count double
    pub push_potential: PhaseWeight,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            material: PhaseWeight::new(100, 100),
            center: PhaseWeight::new(30, 15),
            cohesion: PhaseWeight::new(10, 5),
            edge_danger: PhaseWeight::new(10, 20),
            push_potential: PhaseWeight::new(5, 15),
        }
    }
}

/// Weights resolved for one position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedWeights {
    pub material: i32,
    pub center: i32,
    pub cohesion: i32,
    pub edge_danger: i32,
    pub push_potential: i32,
}

impl Heuristics {
    pub fn resolve(&self, progress: f32) -> ResolvedWeights {
        ResolvedWeights {
            material: self.material.at(progress),
            center: self.center.at(progress),
            cohesion: self.cohesion.at(progress),
            edge_danger: self.edge_danger.at(progress),
            push_potential: self.push_potential.at(progress),
        }
    }
}

// ============================================================================
// FEATURES
// ============================================================================

/// 0.0 with all 28 marbles on the board, rising to 1.0 once 12 are gone
pub fn game_progress(board: &Board) -> f32 {
    let on_board = (board.marble_count(Side::Black) + board.marble_count(Side::White)) as f32;
    let full = (2 * STARTING_MARBLES) as f32;
    ((full - on_board) / (full - ENDGAME_MARBLES)).clamp(0.0, 1.0)
}

pub fn center_count(board: &Board, side: Side) -> i32 {
    CENTER_CELLS
        .iter()
        .filter(|&&c| board.occupant(c) == Some(side))
        .count() as i32
}

/// Adjacent same-colour pairs, each counted once
pub fn cohesion(board: &Board, side: Side) -> i32 {
    let mut pairs = 0;
    for cell in board.marbles(side) {
        for axis in Direction::AXES {
            if let Some(n) = geometry::neighbor(cell, axis) {
                if board.occupant(n) == Some(side) {
                    pairs += 1;
                }
            }
        }
    }
    pairs
}

/// Edge marbles, with unsupported ones counted twice
pub fn edge_danger(board: &Board, side: Side) -> i32 {
    let mut danger = 0;
    for cell in board.marbles(side).filter(|&c| geometry::is_edge(c)) {
        danger += 1;
        if !has_friendly_neighbor(board, cell, side) {
            danger += 1;
        }
    }
    danger
}

fn has_friendly_neighbor(board: &Board, cell: Cell, side: Side) -> bool {
    geometry::coord_map()
        .neighbors(cell)
        .iter()
        .flatten()
        .any(|&n| board.occupant(n) == Some(side))
}

/// Sumito opportunities for `side`: 1 for a push into open space, 2 for a
/// push that would eliminate a marble. Counted regardless of whose turn it is.
pub fn push_potential(board: &Board, side: Side) -> i32 {
    let opponent = side.opponent();
    let mut total = 0;

    for front in board.marbles(side) {
        for dir in Direction::ALL {
            let Some(target) = geometry::neighbor(front, dir) else {
                continue;
            };
            if board.occupant(target) != Some(opponent) {
                continue;
            }

            let mut own = 1;
            let mut back = geometry::neighbor(front, dir.opposite());
            while let Some(c) = back {
                if own == 3 || board.occupant(c) != Some(side) {
                    break;
                }
                own += 1;
                back = geometry::neighbor(c, dir.opposite());
            }

            let mut theirs = 0;
            let mut ahead = Some(target);
            while let Some(c) = ahead {
                if board.occupant(c) != Some(opponent) {
                    break;
                }
                theirs += 1;
                ahead = geometry::neighbor(c, dir);
            }

            if theirs < own {
                match ahead {
                    None => total += 2,
                    Some(c) if board.is_empty(c) => total += 1,
                    Some(_) => {}
                }
            }
        }
    }
    total
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Winner by pushed-off marbles, if either side has lost `loss_threshold`
pub fn decided_by_material(board: &Board, loss_threshold: u8) -> Option<Side> {
    if board.marbles_lost(Side::Black) >= loss_threshold {
        Some(Side::White)
    } else if board.marbles_lost(Side::White) >= loss_threshold {
        Some(Side::Black)
    } else {
        None
    }
}

/// Signed win score for `winner`, larger the closer the win is to the root
pub fn win_score(winner: Side, depth: i32) -> i32 {
    match winner {
        Side::Black => WIN_SCORE + depth,
        Side::White => -(WIN_SCORE + depth),
    }
}

/// True for scores that encode a forced result
pub fn is_decisive(score: i32) -> bool {
    score.abs() >= WIN_SCORE
}

/// Static evaluation from Black's perspective, ignoring terminal states
pub fn evaluate_position(board: &Board, heuristics: &Heuristics) -> i32 {
    let w = heuristics.resolve(game_progress(board));
    let (b, wh) = (Side::Black, Side::White);

    let material = board.marble_count(b) as i32 - board.marble_count(wh) as i32;
    let center = center_count(board, b) - center_count(board, wh);
    let cohesion = cohesion(board, b) - cohesion(board, wh);
    let danger = edge_danger(board, b) - edge_danger(board, wh);
    let pushes = push_potential(board, b) - push_potential(board, wh);

    w.material * material + w.center * center + w.cohesion * cohesion - w.edge_danger * danger
        + w.push_potential * pushes
}

/// Evaluate position from Black's perspective
pub fn evaluate(board: &Board, heuristics: &Heuristics, loss_threshold: u8) -> i32 {
    evaluate_with_depth(board, heuristics, loss_threshold, 0)
}

/// Evaluate with depth bonus for preferring faster wins
pub fn evaluate_with_depth(board: &Board, heuristics: &Heuristics, loss_threshold: u8, depth: i32) -> i32 {
    match decided_by_material(board, loss_threshold) {
        Some(winner) => win_score(winner, depth),
        None => evaluate_position(board, heuristics),
    }
}
