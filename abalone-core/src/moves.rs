//! Move representation and notation

use crate::board::{Board, Side};
use crate::error::MoveError;
use crate::geometry::{self, Cell, Direction, NUM_CELLS};
use serde::{Deserialize, Serialize};

/// In-line moves travel along the group's axis (and may push);
/// side-steps shift every marble across it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Inline,
    SideStep,
}

impl MoveKind {
    pub fn to_char(self) -> char {
        match self {
            MoveKind::Inline => 'i',
            MoveKind::SideStep => 's',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'i' => Some(MoveKind::Inline),
            's' => Some(MoveKind::SideStep),
            _ => None,
        }
    }
}

/// A group of 1-3 marbles moved one step in a direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    cells: [Cell; 3],
    len: u8,
    pub direction: Direction,
    pub kind: MoveKind,
    /// Opposing marbles displaced by an in-line push
    pub push_count: u8,
}

impl Move {
    /// Build a move; cells are stored in ascending index order
    pub fn new(
        cells: &[Cell],
        direction: Direction,
        kind: MoveKind,
        push_count: u8,
    ) -> Result<Self, MoveError> {
        if cells.is_empty() || cells.len() > 3 {
            return Err(MoveError::BadGroupSize(cells.len()));
        }
        if let Some(&cell) = cells.iter().find(|&&c| c as usize >= NUM_CELLS) {
            return Err(MoveError::InvalidCell(cell));
        }
        let mut sorted = [0; 3];
        sorted[..cells.len()].copy_from_slice(cells);
        sorted[..cells.len()].sort_unstable();
        Ok(Self {
            cells: sorted,
            len: cells.len() as u8,
            direction,
            kind,
            push_count,
        })
    }

    /// Single marble step; `cell` must be on the board
    pub fn single(cell: Cell, direction: Direction) -> Self {
        Self {
            cells: [cell, 0, 0],
            len: 1,
            direction,
            kind: MoveKind::Inline,
            push_count: 0,
        }
    }

    /// Internal constructor for cells already in ascending order
    pub(crate) fn from_sorted(cells: &[Cell], direction: Direction, kind: MoveKind, push_count: u8) -> Self {
        let mut stored = [0; 3];
        stored[..cells.len()].copy_from_slice(cells);
        Self {
            cells: stored,
            len: cells.len() as u8,
            direction,
            kind,
            push_count,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_inline(&self) -> bool {
        self.kind == MoveKind::Inline
    }

    pub fn is_push(&self) -> bool {
        self.push_count > 0
    }

    /// `(b, C3 C4) i → NE`
    pub fn to_notation(&self, side: Side) -> String {
        let cells: Vec<String> = self.cells().iter().map(|&c| geometry::index_to_notation(c)).collect();
        format!(
            "({}, {}) {} → {}",
            side.to_char(),
            cells.join(" "),
            self.kind.to_char(),
            self.direction.name()
        )
    }
}

/// Parse move notation against `board`. The side in the text must be the
/// side to move, and the move must be legal; anything else yields `None`.
/// `->` is accepted in place of `→`.
pub fn parse_move(board: &Board, text: &str) -> Option<Move> {
    let text = text.trim();
    let inner_start = text.strip_prefix('(')?;
    let (inner, rest) = inner_start.split_once(')')?;

    let (side_text, cell_text) = inner.split_once(',')?;
    let mut side_chars = side_text.trim().chars();
    let side = Side::from_char(side_chars.next()?)?;
    if side_chars.next().is_some() || side != board.side_to_move() {
        return None;
    }

    let cells: Option<Vec<Cell>> = cell_text
        .split_whitespace()
        .map(geometry::notation_to_index)
        .collect();
    let cells = cells?;

    let mut tokens = rest.split_whitespace();
    let mut kind_chars = tokens.next()?.chars();
    let kind = MoveKind::from_char(kind_chars.next()?)?;
    if kind_chars.next().is_some() {
        return None;
    }
    let arrow = tokens.next()?;
    if arrow != "→" && arrow != "->" {
        return None;
    }
    let direction = Direction::from_name(tokens.next()?)?;
    if tokens.next().is_some() {
        return None;
    }

    let candidate = Move::new(&cells, direction, kind, 0).ok()?;
    let push_count = board.push_count(&candidate).ok()?;
    Some(Move {
        push_count,
        ..candidate
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::notation_to_index;

    fn cell(name: &str) -> Cell {
        notation_to_index(name).unwrap()
    }

    #[test]
    fn test_cells_are_sorted() {
        let mv = Move::new(&[cell("C5"), cell("C3"), cell("C4")], Direction::E, MoveKind::Inline, 0).unwrap();
        assert_eq!(mv.cells(), &[cell("C3"), cell("C4"), cell("C5")]);
        assert_eq!(mv.len(), 3);
    }

    #[test]
    fn test_bad_group_size() {
        assert_eq!(
            Move::new(&[], Direction::E, MoveKind::Inline, 0),
            Err(MoveError::BadGroupSize(0))
        );
        assert!(Move::new(&[1, 2, 3, 4], Direction::E, MoveKind::Inline, 0).is_err());
    }

    #[test]
    fn test_off_board_cells_rejected() {
        assert_eq!(
            Move::new(&[200], Direction::E, MoveKind::Inline, 0),
            Err(MoveError::InvalidCell(200))
        );
        assert_eq!(
            Move::new(&[cell("E5"), 61], Direction::E, MoveKind::Inline, 0),
            Err(MoveError::InvalidCell(61))
        );
        assert!(Move::new(&[60], Direction::W, MoveKind::Inline, 0).is_ok());
    }

    #[test]
    fn test_notation() {
        let mv = Move::new(&[cell("C3"), cell("C4")], Direction::NE, MoveKind::SideStep, 0).unwrap();
        assert_eq!(mv.to_notation(Side::Black), "(b, C3 C4) s → NE");
        assert_eq!(Move::single(cell("E5"), Direction::W).to_notation(Side::White), "(w, E5) i → W");
    }

    #[test]
    fn test_parse_round_trip() {
        let board = Board::from_cells(&["E2", "E3"], &["E1"], Side::Black);
        for mv in board.legal_moves() {
            let text = mv.to_notation(Side::Black);
            assert_eq!(parse_move(&board, &text), Some(mv), "{}", text);
        }
    }

    #[test]
    fn test_parse_fills_push_count() {
        let board = Board::from_cells(&["E2", "E3"], &["E1"], Side::Black);
        let mv = parse_move(&board, "(b, E2 E3) i -> W").unwrap();
        assert_eq!(mv.push_count, 1);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let board = Board::from_cells(&["E2", "E3"], &["E1"], Side::Black);
        for bad in [
            "",
            "(b, E2 E3) i",
            "(b, E2 E3 i → W",
            "b, E2 E3) i → W",
            "(w, E1) i → E",
            "(b, E2 Z9) i → W",
            "(b, E2 E3) x → W",
            "(b, E2 E3) i → N",
            "(b, E2 E3) i → W extra",
            "(b, E3) i → E1",
            // legal shape, illegal on this board
            "(b, E2) i → W",
        ] {
            assert_eq!(parse_move(&board, bad), None, "{:?}", bad);
        }
    }
}
