//! Legal move generation and the legality predicate
//!
//! Generation and application both go through [`group_push_count`], so a
//! move is produced by [`Board::legal_moves`] exactly when
//! [`Board::apply_in_place`] accepts it.

use crate::board::{Board, Side};
use crate::error::MoveError;
use crate::geometry::{self, Cell, Direction, NUM_CELLS};
use crate::moves::{Move, MoveKind};

/// Upper bound on moves in any position, used to size buffers
pub const MAX_MOVES: usize = 160;

// ============================================================================
// LEGALITY
// ============================================================================

/// Axis a 2-3 marble group lies on, given its cells in ascending order
fn group_axis(cells: &[Cell]) -> Option<Direction> {
    Direction::AXES.into_iter().find(|&axis| {
        cells
            .windows(2)
            .all(|pair| geometry::neighbor(pair[0], axis) == Some(pair[1]))
    })
}

/// Validate moving `cells` (ascending order) for `side` and return how many
/// opposing marbles the move displaces.
pub fn group_push_count(
    board: &Board,
    cells: &[Cell],
    side: Side,
    dir: Direction,
    kind: MoveKind,
) -> Result<u8, MoveError> {
    if cells.is_empty() || cells.len() > 3 {
        return Err(MoveError::BadGroupSize(cells.len()));
    }
    for &cell in cells {
        if cell as usize >= NUM_CELLS {
            return Err(MoveError::InvalidCell(cell));
        }
        if board.occupant(cell) != Some(side) {
            return Err(MoveError::NotOwnMarble(cell));
        }
    }

    let axis = if cells.len() > 1 {
        Some(group_axis(cells).ok_or(MoveError::NotCollinear)?)
    } else {
        None
    };

    match kind {
        MoveKind::Inline => {
            if let Some(axis) = axis {
                if !dir.is_parallel(axis) {
                    return Err(MoveError::BadInline);
                }
            }
            let lead = if Direction::AXES.contains(&dir) {
                cells[cells.len() - 1]
            } else {
                cells[0]
            };
            inline_push_count(board, lead, cells.len(), side, dir)
        }
        MoveKind::SideStep => {
            let axis = axis.ok_or(MoveError::BadSideStep)?;
            if dir.is_parallel(axis) {
                return Err(MoveError::BadSideStep);
            }
            for &cell in cells {
                match geometry::neighbor(cell, dir) {
                    Some(dest) if board.is_empty(dest) => {}
                    _ => return Err(MoveError::SideStepBlocked),
                }
            }
            Ok(0)
        }
    }
}

/// Count the opposing chain ahead of `lead` and check the sumito rule
fn inline_push_count(
    board: &Board,
    lead: Cell,
    group: usize,
    side: Side,
    dir: Direction,
) -> Result<u8, MoveError> {
    let Some(target) = geometry::neighbor(lead, dir) else {
        return Err(MoveError::OffBoard);
    };

    match board.occupant(target) {
        None => Ok(0),
        Some(who) if who == side => Err(MoveError::BlockedByOwn),
        Some(_) => {
            let opponent = side.opponent();
            let mut opponents = 0usize;
            let mut cursor = Some(target);
            while let Some(cell) = cursor {
                if board.occupant(cell) != Some(opponent) {
                    break;
                }
                opponents += 1;
                cursor = geometry::neighbor(cell, dir);
            }

            if opponents >= group {
                return Err(MoveError::Outnumbered { group, opponents });
            }
            // cursor is the cell past the chain: empty, off-board, or our own
            match cursor {
                Some(cell) if board.occupant(cell) == Some(side) => Err(MoveError::BlockedByOwn),
                _ => Ok(opponents as u8),
            }
        }
    }
}

impl Board {
    /// Actual push count for `mv`, ignoring the count it claims
    pub fn push_count(&self, mv: &Move) -> Result<u8, MoveError> {
        group_push_count(self, mv.cells(), self.side_to_move(), mv.direction, mv.kind)
    }

    /// Full legality check for the side to move. Returns the push count.
    pub fn check_move(&self, mv: &Move) -> Result<u8, MoveError> {
        let actual = self.push_count(mv)?;
        if actual != mv.push_count {
            return Err(MoveError::PushCountMismatch {
                claimed: mv.push_count,
                actual,
            });
        }
        Ok(actual)
    }

    pub fn is_legal_move(&self, mv: &Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generate_moves(self.side_to_move())
    }

    /// Every move `side` could make if it were on move. Each group is found
    /// once, from its lowest cell, by walking the three increasing axes.
    pub fn generate_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(MAX_MOVES);

        for cell in self.marbles(side) {
            for dir in Direction::ALL {
                if let Ok(push) = group_push_count(self, &[cell], side, dir, MoveKind::Inline) {
                    moves.push(Move::from_sorted(&[cell], dir, MoveKind::Inline, push));
                }
            }

            for axis in Direction::AXES {
                let mut group = [cell; 3];
                let mut len = 1;
                while len < 3 {
                    match geometry::neighbor(group[len - 1], axis) {
                        Some(next) if self.occupant(next) == Some(side) => {
                            group[len] = next;
                            len += 1;
                        }
                        _ => break,
                    }
                    self.push_group_moves(&group[..len], axis, side, &mut moves);
                }
            }
        }

        moves
    }

    fn push_group_moves(&self, group: &[Cell], axis: Direction, side: Side, moves: &mut Vec<Move>) {
        for dir in Direction::ALL {
            let kind = if dir.is_parallel(axis) {
                MoveKind::Inline
            } else {
                MoveKind::SideStep
            };
            if let Ok(push) = group_push_count(self, group, side, dir, kind) {
                moves.push(Move::from_sorted(group, dir, kind, push));
            }
        }
    }
}
