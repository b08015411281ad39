//! Board state: occupancy, side to move, and move application

use crate::error::{BoardError, MoveError};
use crate::geometry::{self, Cell, Direction, NUM_CELLS};
use crate::moves::{Move, MoveKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Marbles each side starts with
pub const STARTING_MARBLES: u8 = 14;

/// Most occupancy writes a single move can make
const MAX_WRITES: usize = 8;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Black = 0,
    White = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// 'b' or 'w'
    pub fn to_char(self) -> char {
        match self {
            Side::Black => 'b',
            Side::White => 'w',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'b' => Some(Side::Black),
            'w' => Some(Side::White),
            _ => None,
        }
    }
}

/// One occupancy write, kept so it can be reverted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellWrite {
    cell: Cell,
    old: Option<Side>,
    new: Option<Side>,
}

/// Undo log for a move applied in place
#[derive(Clone, Copy, Debug)]
pub struct MoveDelta {
    writes: [CellWrite; MAX_WRITES],
    len: u8,
    prev_side: Side,
    pushed_off: bool,
}

impl MoveDelta {
    fn new(prev_side: Side) -> Self {
        Self {
            writes: [CellWrite {
                cell: 0,
                old: None,
                new: None,
            }; MAX_WRITES],
            len: 0,
            prev_side,
            pushed_off: false,
        }
    }

    fn push(&mut self, write: CellWrite) {
        self.writes[self.len as usize] = write;
        self.len += 1;
    }

    /// True if the move pushed an opposing marble off the board
    pub fn pushed_off(&self) -> bool {
        self.pushed_off
    }

    /// Recorded writes as (cell, old, new)
    pub fn writes(&self) -> impl Iterator<Item = (Cell, Option<Side>, Option<Side>)> + '_ {
        self.writes[..self.len as usize]
            .iter()
            .map(|w| (w.cell, w.old, w.new))
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Board position (clone to branch)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Side>; NUM_CELLS],
    side_to_move: Side,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, Black to move
    pub fn new() -> Self {
        Self {
            cells: [None; NUM_CELLS],
            side_to_move: Side::Black,
        }
    }

    /// Build from explicit marble lists given in notation
    pub fn from_cells(black: &[&str], white: &[&str], side_to_move: Side) -> Self {
        let mut board = Self::new();
        board.side_to_move = side_to_move;
        for name in black {
            board.place(name, Side::Black);
        }
        for name in white {
            board.place(name, Side::White);
        }
        board
    }

    /// Parse the side-to-move character and a comma separated `C5b,D5w,...`
    /// list. Tokens that cannot be read are skipped with a warning.
    pub fn load(side_to_move: char, cell_list: &str) -> Result<Self, BoardError> {
        let side = Side::from_char(side_to_move)
            .ok_or_else(|| BoardError::InvalidSide(side_to_move.to_string()))?;

        let mut board = Self::new();
        board.side_to_move = side;

        for token in cell_list.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let Some(colour) = token.chars().last() else {
                continue;
            };
            let Some(who) = Side::from_char(colour) else {
                tracing::warn!("token '{}' does not end in b/w, skipping", token);
                continue;
            };
            let notation = &token[..token.len() - colour.len_utf8()];
            board.place(notation, who);
        }

        Ok(board)
    }

    /// Parse the two-line position text: side to move, then the cell list.
    /// Blank lines are ignored.
    pub fn parse_position(text: &str) -> Result<Self, BoardError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let side_line = lines.next().ok_or(BoardError::MissingLine("side-to-move"))?;
        let mut chars = side_line.chars();
        let side_char = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(BoardError::InvalidSide(side_line.to_string())),
        };

        let cell_line = lines.next().ok_or(BoardError::MissingLine("marble list"))?;
        Self::load(side_char, cell_line)
    }

    fn place(&mut self, notation: &str, who: Side) {
        match geometry::notation_to_index(notation) {
            Some(cell) => self.cells[cell as usize] = Some(who),
            None => tracing::warn!("invalid cell notation '{}', skipping", notation),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn set_side_to_move(&mut self, side: Side) {
        self.side_to_move = side;
    }

    /// Occupant of a cell (`None` when empty)
    #[inline]
    pub fn occupant(&self, cell: Cell) -> Option<Side> {
        self.cells[cell as usize]
    }

    pub fn set_occupant(&mut self, cell: Cell, who: Option<Side>) {
        self.cells[cell as usize] = who;
    }

    #[inline]
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.cells[cell as usize].is_none()
    }

    /// Cells holding a marble of `side`, in index order
    pub fn marbles(&self, side: Side) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, occ)| **occ == Some(side))
            .map(|(cell, _)| cell as Cell)
    }

    pub fn marble_count(&self, side: Side) -> u8 {
        self.cells.iter().filter(|occ| **occ == Some(side)).count() as u8
    }

    /// Marbles missing relative to the starting count
    pub fn marbles_lost(&self, side: Side) -> u8 {
        STARTING_MARBLES.saturating_sub(self.marble_count(side))
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Occupied cells as `C5b,...`, Black first, each colour sorted by notation
    pub fn to_notation_string(&self) -> String {
        let mut parts = Vec::new();
        for side in [Side::Black, Side::White] {
            let mut cells: Vec<String> = self
                .marbles(side)
                .map(|cell| format!("{}{}", geometry::index_to_notation(cell), side.to_char()))
                .collect();
            cells.sort();
            parts.extend(cells);
        }
        parts.join(",")
    }

    /// Two-line position text, the inverse of [`Board::parse_position`]
    pub fn to_position_text(&self) -> String {
        format!("{}\n{}", self.side_to_move.to_char(), self.to_notation_string())
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Copy of this board with `mv` played
    pub fn apply_move(&self, mv: &Move) -> Result<Board, MoveError> {
        let mut child = self.clone();
        child.apply_in_place(mv)?;
        Ok(child)
    }

    /// Play `mv` on this board, returning the undo log
    pub fn apply_in_place(&mut self, mv: &Move) -> Result<MoveDelta, MoveError> {
        self.check_move(mv)?;
        Ok(self.make_move(mv))
    }

    /// Revert a move applied with [`Board::apply_in_place`]
    pub fn undo_move(&mut self, delta: &MoveDelta) {
        for write in delta.writes[..delta.len as usize].iter().rev() {
            self.cells[write.cell as usize] = write.old;
        }
        self.side_to_move = delta.prev_side;
    }

    /// Play a move already known to be legal
    pub(crate) fn make_move(&mut self, mv: &Move) -> MoveDelta {
        debug_assert!(self.is_legal_move(mv), "illegal move {:?}", mv);

        let mover = self.side_to_move;
        let mut delta = MoveDelta::new(mover);

        match mv.kind {
            MoveKind::Inline => self.shift_line(mv, &mut delta),
            MoveKind::SideStep => {
                for &cell in mv.cells() {
                    if let Some(dest) = geometry::neighbor(cell, mv.direction) {
                        self.write(&mut delta, dest, Some(mover));
                    }
                    self.write(&mut delta, cell, None);
                }
            }
        }

        self.side_to_move = mover.opponent();
        delta
    }

    /// Advance the group and any pushed marbles one step along the move
    /// direction, starting from the marble farthest ahead.
    fn shift_line(&mut self, mv: &Move, delta: &mut MoveDelta) {
        let dir = mv.direction;
        let mut line = [0 as Cell; 5];
        let mut len = 0;

        for cell in ordered_rear_to_front(mv) {
            line[len] = cell;
            len += 1;
        }
        let mut next = geometry::neighbor(line[len - 1], dir);
        for _ in 0..mv.push_count {
            let Some(cell) = next else { break };
            line[len] = cell;
            len += 1;
            next = geometry::neighbor(cell, dir);
        }

        for i in (0..len).rev() {
            let src = line[i];
            match geometry::neighbor(src, dir) {
                Some(dest) => {
                    let who = self.cells[src as usize];
                    self.write(delta, dest, who);
                }
                None => delta.pushed_off = true,
            }
        }
        self.write(delta, line[0], None);
    }

    fn write(&mut self, delta: &mut MoveDelta, cell: Cell, new: Option<Side>) {
        let old = self.cells[cell as usize];
        delta.push(CellWrite { cell, old, new });
        self.cells[cell as usize] = new;
    }
}

/// Group cells ordered from the rear to the front in the move direction
fn ordered_rear_to_front(mv: &Move) -> impl Iterator<Item = Cell> + '_ {
    let ascending = Direction::AXES.contains(&mv.direction);
    let cells = mv.cells();
    (0..cells.len()).map(move |i| {
        if ascending {
            cells[i]
        } else {
            cells[cells.len() - 1 - i]
        }
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::notation_to_index;

    fn cell(name: &str) -> Cell {
        notation_to_index(name).unwrap()
    }

    #[test]
    fn test_load_and_serialize() {
        let board = Board::load('w', "E5w, C5b,D4b ,zz9b,E6x,,A1b").unwrap();
        assert_eq!(board.side_to_move(), Side::White);
        assert_eq!(board.to_notation_string(), "A1b,C5b,D4b,E5w");
        assert_eq!(board.marble_count(Side::Black), 3);
        assert_eq!(board.marbles_lost(Side::White), 13);
    }

    #[test]
    fn test_load_rejects_bad_side() {
        assert_eq!(
            Board::load('x', "C5b"),
            Err(BoardError::InvalidSide("x".to_string()))
        );
    }

    #[test]
    fn test_parse_position() {
        let board = Board::parse_position("\n b \n\nC5b,D5w\n").unwrap();
        assert_eq!(board.side_to_move(), Side::Black);
        assert_eq!(board.to_position_text(), "b\nC5b,D5w");

        assert_eq!(
            Board::parse_position("b"),
            Err(BoardError::MissingLine("marble list"))
        );
        assert!(Board::parse_position("black\nC5b").is_err());
    }

    #[test]
    fn test_single_step() {
        let board = Board::from_cells(&["E5"], &[], Side::Black);
        let mv = Move::single(cell("E5"), Direction::W);
        let child = board.apply_move(&mv).unwrap();
        assert_eq!(child.to_notation_string(), "E4b");
        assert_eq!(child.side_to_move(), Side::White);
        // the original board is untouched
        assert_eq!(board.to_notation_string(), "E5b");
    }

    #[test]
    fn test_inline_push_moves_chain() {
        // C3 C4 C5 push C6 C7 east; C7 has no cell beyond it and drops off
        let mut board = Board::from_cells(&["C3", "C4", "C5"], &["C6", "C7"], Side::Black);
        let mv = Move::new(&[cell("C3"), cell("C4"), cell("C5")], Direction::E, MoveKind::Inline, 2).unwrap();
        let delta = board.apply_in_place(&mv).unwrap();
        assert!(delta.pushed_off());
        assert_eq!(board.to_notation_string(), "C4b,C5b,C6b,C7w");
    }

    #[test]
    fn test_push_toward_lower_indices() {
        // E4 E5 push E3 west into E2
        let board = Board::from_cells(&["E4", "E5"], &["E3"], Side::Black);
        let mv = Move::new(&[cell("E4"), cell("E5")], Direction::W, MoveKind::Inline, 1).unwrap();
        let child = board.apply_move(&mv).unwrap();
        assert_eq!(child.to_notation_string(), "E3b,E4b,E2w");
    }

    #[test]
    fn test_elimination_off_edge() {
        let board = Board::from_cells(&["E2", "E3"], &["E1", "I9"], Side::Black);
        let mv = Move::new(&[cell("E2"), cell("E3")], Direction::W, MoveKind::Inline, 1).unwrap();
        let child = board.apply_move(&mv).unwrap();
        assert_eq!(child.marble_count(Side::White), board.marble_count(Side::White) - 1);
        assert_eq!(child.marble_count(Side::Black), board.marble_count(Side::Black));
        assert_eq!(child.to_notation_string(), "E1b,E2b,I9w");
    }

    #[test]
    fn test_side_step() {
        let board = Board::from_cells(&["C3", "C4"], &[], Side::Black);
        let mv = Move::new(&[cell("C3"), cell("C4")], Direction::NE, MoveKind::SideStep, 0).unwrap();
        let child = board.apply_move(&mv).unwrap();
        assert_eq!(child.to_notation_string(), "D4b,D5b");
    }

    #[test]
    fn test_undo_restores_board() {
        let original = Board::from_cells(&["E2", "E3", "E4"], &["E1", "C5"], Side::Black);
        let moves = original.legal_moves();
        assert!(!moves.is_empty());
        for mv in moves {
            let mut board = original.clone();
            let delta = board.apply_in_place(&mv).unwrap();
            assert_ne!(board, original);
            board.undo_move(&delta);
            assert_eq!(board, original);
        }
    }

    #[test]
    fn test_illegal_moves_fail_without_mutation() {
        let mut board = Board::from_cells(&["E5", "E6"], &["E7", "E8"], Side::Black);
        let before = board.clone();

        let equal_push = Move::new(&[cell("E5"), cell("E6")], Direction::E, MoveKind::Inline, 2).unwrap();
        assert!(board.apply_in_place(&equal_push).is_err());

        let into_own = Move::single(cell("E5"), Direction::E);
        assert_eq!(board.apply_in_place(&into_own).unwrap_err(), MoveError::BlockedByOwn);

        let not_mine = Move::single(cell("E7"), Direction::NW);
        assert_eq!(board.apply_in_place(&not_mine).unwrap_err(), MoveError::NotOwnMarble(cell("E7")));

        assert_eq!(board, before);
    }
}
