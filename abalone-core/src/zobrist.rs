//! Zobrist position hashing

use crate::board::{Board, MoveDelta, Side};
use crate::geometry::{Cell, NUM_CELLS};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Seed used when no other is configured
pub const DEFAULT_ZOBRIST_SEED: u64 = 0xAB41_0E5E_ED00_0061;

/// Random keys per (cell, colour) plus one for White to move
#[derive(Clone, Debug)]
pub struct ZobristKeys {
    cells: [[u64; 2]; NUM_CELLS],
    white_to_move: u64,
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cells = [[0u64; 2]; NUM_CELLS];
        for pair in cells.iter_mut() {
            pair[0] = rng.gen();
            pair[1] = rng.gen();
        }
        Self {
            cells,
            white_to_move: rng.gen(),
        }
    }

    #[inline]
    pub fn cell_key(&self, cell: Cell, side: Side) -> u64 {
        self.cells[cell as usize][side.index()]
    }

    pub fn side_key(&self) -> u64 {
        self.white_to_move
    }

    /// Full hash of a position
    pub fn hash(&self, board: &Board) -> u64 {
        let mut h = 0u64;
        for side in [Side::Black, Side::White] {
            for cell in board.marbles(side) {
                h ^= self.cell_key(cell, side);
            }
        }
        if board.side_to_move() == Side::White {
            h ^= self.white_to_move;
        }
        h
    }

    /// Hash after the move recorded in `delta`, given the hash before it
    pub fn update(&self, mut hash: u64, delta: &MoveDelta) -> u64 {
        for (cell, old, new) in delta.writes() {
            if let Some(side) = old {
                hash ^= self.cell_key(cell, side);
            }
            if let Some(side) = new {
                hash ^= self.cell_key(cell, side);
            }
        }
        hash ^ self.white_to_move
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(DEFAULT_ZOBRIST_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    #[test]
    fn test_identical_positions_hash_equal() {
        let keys = ZobristKeys::new(1);
        let a = Board::from_layout(Layout::Standard);
        let b = Board::from_cells(
            &["C5", "C4", "C3", "B6", "B5", "B4", "B3", "B2", "B1", "A5", "A4", "A3", "A2", "A1"],
            &["G7", "G6", "G5", "H9", "H8", "H7", "H6", "H5", "H4", "I9", "I8", "I7", "I6", "I5"],
            Side::Black,
        );
        assert_eq!(keys.hash(&a), keys.hash(&b));
        assert_eq!(ZobristKeys::new(1).hash(&a), keys.hash(&a));
    }

    #[test]
    fn test_side_to_move_changes_hash() {
        let keys = ZobristKeys::default();
        let mut board = Board::from_layout(Layout::Standard);
        let black = keys.hash(&board);
        board.set_side_to_move(Side::White);
        assert_eq!(keys.hash(&board), black ^ keys.side_key());
    }

    #[test]
    fn test_distinct_positions_differ() {
        let keys = ZobristKeys::default();
        let mut seen = rustc_hash::FxHashSet::default();
        let board = Board::from_layout(Layout::BelgianDaisy);
        for mv in board.legal_moves() {
            let child = board.apply_move(&mv).unwrap();
            assert!(seen.insert(keys.hash(&child)));
        }
    }

    #[test]
    fn test_incremental_update_matches_full_hash() {
        let keys = ZobristKeys::default();
        let board = Board::from_cells(&["E2", "E3", "E4", "C3", "C4"], &["E1", "D5", "D6"], Side::Black);
        let before = keys.hash(&board);
        for mv in board.legal_moves() {
            let mut child = board.clone();
            let delta = child.apply_in_place(&mv).unwrap();
            assert_eq!(keys.update(before, &delta), keys.hash(&child), "{:?}", mv);
        }
    }
}
