//! Starting positions

use crate::board::{Board, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named opening layout. Black moves first in all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Standard,
    BelgianDaisy,
    GermanDaisy,
}

const STANDARD_BLACK: [&str; 14] = [
    "A1", "A2", "A3", "A4", "A5", "B1", "B2", "B3", "B4", "B5", "B6", "C3", "C4", "C5",
];
const STANDARD_WHITE: [&str; 14] = [
    "I5", "I6", "I7", "I8", "I9", "H4", "H5", "H6", "H7", "H8", "H9", "G5", "G6", "G7",
];

const BELGIAN_BLACK: [&str; 14] = [
    "A1", "A2", "B1", "B2", "B3", "C2", "C3", "G7", "G8", "H7", "H8", "H9", "I8", "I9",
];
const BELGIAN_WHITE: [&str; 14] = [
    "A4", "A5", "B4", "B5", "B6", "C5", "C6", "G4", "G5", "H4", "H5", "H6", "I5", "I6",
];

const GERMAN_BLACK: [&str; 14] = [
    "B1", "B2", "C1", "C2", "C3", "D2", "D3", "F7", "F8", "G7", "G8", "G9", "H8", "H9",
];
const GERMAN_WHITE: [&str; 14] = [
    "B5", "B6", "C5", "C6", "C7", "D6", "D7", "F3", "F4", "G3", "G4", "G5", "H4", "H5",
];

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Standard, Layout::BelgianDaisy, Layout::GermanDaisy];

    pub fn name(self) -> &'static str {
        match self {
            Layout::Standard => "standard",
            Layout::BelgianDaisy => "belgian-daisy",
            Layout::GermanDaisy => "german-daisy",
        }
    }

    fn cells(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Layout::Standard => (&STANDARD_BLACK, &STANDARD_WHITE),
            Layout::BelgianDaisy => (&BELGIAN_BLACK, &BELGIAN_WHITE),
            Layout::GermanDaisy => (&GERMAN_BLACK, &GERMAN_WHITE),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Layout::ALL
            .into_iter()
            .find(|l| l.name() == wanted)
            .ok_or_else(|| format!("unknown layout '{}' (standard, belgian-daisy, german-daisy)", s))
    }
}

impl Board {
    pub fn from_layout(layout: Layout) -> Self {
        let (black, white) = layout.cells();
        Board::from_cells(black, white, Side::Black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_have_full_armies() {
        for layout in Layout::ALL {
            let board = Board::from_layout(layout);
            assert_eq!(board.marble_count(Side::Black), 14, "{}", layout);
            assert_eq!(board.marble_count(Side::White), 14, "{}", layout);
            assert_eq!(board.side_to_move(), Side::Black);
        }
    }

    #[test]
    fn test_layout_names() {
        for layout in Layout::ALL {
            assert_eq!(layout.name().parse::<Layout>(), Ok(layout));
        }
        assert_eq!("Belgian_Daisy".parse::<Layout>(), Ok(Layout::BelgianDaisy));
        assert!("dutch".parse::<Layout>().is_err());
    }
}
