//! Hex board geometry: cell numbering, notation and neighbour tables
//!
//! The 61 cells are addressed by a dense index (A1 = 0 .. I9 = 60). Axial
//! coordinates are (column, row) with row 1 = `A` at the bottom of the board.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Number of playable cells
pub const NUM_CELLS: usize = 61;

/// Number of hex directions
pub const NUM_DIRECTIONS: usize = 6;

/// Dense cell index in `0..NUM_CELLS`
pub type Cell = u8;

/// Index of E5, the centre cell
pub const CENTER: Cell = 30;

/// E5, D5, F5, E4, E6
pub const CENTER_CELLS: [Cell; 5] = [30, 22, 38, 29, 31];

const ROW_LETTERS: &[u8; 9] = b"ABCDEFGHI";

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub col: i8,
    pub row: i8,
}

impl Coord {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    /// Check if this coordinate lies inside the hexagon
    pub fn is_valid(&self) -> bool {
        (1..=9).contains(&self.row)
            && self.col >= (self.row - 4).max(1)
            && self.col <= (self.row + 4).min(9)
    }

    /// Distance between two hexes (in single steps)
    pub fn distance_to(&self, other: Coord) -> i8 {
        let dc = self.col - other.col;
        let dr = self.row - other.row;
        dc.abs().max(dr.abs()).max((dc - dr).abs())
    }

    /// Get neighbour in direction (may be off the board)
    pub fn neighbor(&self, dir: Direction) -> Coord {
        let (dc, dr) = dir.delta();
        Coord::new(self.col + dc, self.row + dr)
    }
}

/// Hex directions, in the order used by move notation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    W = 0,
    E = 1,
    NW = 2,
    NE = 3,
    SW = 4,
    SE = 5,
}

impl Direction {
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::W,
        Direction::E,
        Direction::NW,
        Direction::NE,
        Direction::SW,
        Direction::SE,
    ];

    /// Axes along which cell indices increase. Groups are walked along these
    /// only, so each group is found exactly once from its lowest cell.
    pub const AXES: [Direction; 3] = [Direction::E, Direction::NW, Direction::NE];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::W => Direction::E,
            Direction::E => Direction::W,
            Direction::NW => Direction::SE,
            Direction::SE => Direction::NW,
            Direction::NE => Direction::SW,
            Direction::SW => Direction::NE,
        }
    }

    /// True if `other` runs along the same axis
    pub fn is_parallel(self, other: Direction) -> bool {
        self == other || self == other.opposite()
    }

    /// Axial delta (dcol, drow)
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::W => (-1, 0),
            Direction::E => (1, 0),
            Direction::NW => (0, 1),
            Direction::NE => (1, 1),
            Direction::SW => (-1, -1),
            Direction::SE => (0, -1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::W => "W",
            Direction::E => "E",
            Direction::NW => "NW",
            Direction::NE => "NE",
            Direction::SW => "SW",
            Direction::SE => "SE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Immutable cell tables shared by every board and search task
pub struct CoordMap {
    coords: [Coord; NUM_CELLS],
    lookup: FxHashMap<Coord, Cell>,
    neighbors: [[Option<Cell>; NUM_DIRECTIONS]; NUM_CELLS],
    edge: [bool; NUM_CELLS],
}

impl CoordMap {
    fn build() -> Self {
        let mut coords = [Coord::new(0, 0); NUM_CELLS];
        let mut lookup = FxHashMap::default();

        let mut next = 0usize;
        for row in 1..=9i8 {
            for col in 1..=9i8 {
                let coord = Coord::new(col, row);
                if coord.is_valid() {
                    coords[next] = coord;
                    lookup.insert(coord, next as Cell);
                    next += 1;
                }
            }
        }
        debug_assert_eq!(next, NUM_CELLS);

        let mut neighbors = [[None; NUM_DIRECTIONS]; NUM_CELLS];
        let mut edge = [false; NUM_CELLS];
        for (cell, coord) in coords.iter().enumerate() {
            for dir in Direction::ALL {
                let n = lookup.get(&coord.neighbor(dir)).copied();
                neighbors[cell][dir.index()] = n;
                if n.is_none() {
                    edge[cell] = true;
                }
            }
        }

        Self {
            coords,
            lookup,
            neighbors,
            edge,
        }
    }

    pub fn coord(&self, cell: Cell) -> Coord {
        self.coords[cell as usize]
    }

    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        self.lookup.get(&coord).copied()
    }

    #[inline]
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        self.neighbors[cell as usize][dir.index()]
    }

    pub fn neighbors(&self, cell: Cell) -> &[Option<Cell>; NUM_DIRECTIONS] {
        &self.neighbors[cell as usize]
    }

    pub fn is_edge(&self, cell: Cell) -> bool {
        self.edge[cell as usize]
    }
}

/// The process-wide coordinate map, built on first use
pub fn coord_map() -> &'static CoordMap {
    static MAP: OnceLock<CoordMap> = OnceLock::new();
    MAP.get_or_init(CoordMap::build)
}

/// Neighbour of `cell` in `dir`, `None` past the board edge
#[inline]
pub fn neighbor(cell: Cell, dir: Direction) -> Option<Cell> {
    coord_map().neighbor(cell, dir)
}

/// True if at least one neighbour of `cell` is off the board
pub fn is_edge(cell: Cell) -> bool {
    coord_map().is_edge(cell)
}

/// Step distance between two cells
pub fn distance(a: Cell, b: Cell) -> i8 {
    let map = coord_map();
    map.coord(a).distance_to(map.coord(b))
}

pub fn distance_to_center(cell: Cell) -> i8 {
    distance(cell, CENTER)
}

/// Parse "C5" style notation. Returns `None` for anything malformed or
/// outside the hexagon.
pub fn notation_to_index(text: &str) -> Option<Cell> {
    let bytes = text.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let letter = bytes[0].to_ascii_uppercase();
    if !(b'A'..=b'I').contains(&letter) || !(b'1'..=b'9').contains(&bytes[1]) {
        return None;
    }
    let row = (letter - b'A' + 1) as i8;
    let col = (bytes[1] - b'0') as i8;
    coord_map().cell(Coord::new(col, row))
}

/// Render a cell as "C5" style notation
pub fn index_to_notation(cell: Cell) -> String {
    let coord = coord_map().coord(cell);
    let mut s = String::with_capacity(2);
    s.push(ROW_LETTERS[(coord.row - 1) as usize] as char);
    s.push((b'0' + coord.col as u8) as char);
    s
}
