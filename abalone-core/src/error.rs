//! Error types

use crate::geometry::Cell;

/// Reasons a move cannot be applied to a board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("group must hold 1 to 3 marbles, got {0}")]
    BadGroupSize(usize),

    #[error("cell {0} is not on the board")]
    InvalidCell(Cell),

    #[error("cell {0} does not hold a marble of the moving side")]
    NotOwnMarble(Cell),

    #[error("group is not a contiguous straight line")]
    NotCollinear,

    #[error("side-step moves need a group of at least two marbles moved across their axis")]
    BadSideStep,

    #[error("in-line moves must follow the group's axis")]
    BadInline,

    #[error("destination is blocked by the moving side's own marble")]
    BlockedByOwn,

    #[error("a marble cannot move off the board on its own")]
    OffBoard,

    #[error("cannot push {opponents} opposing marbles with {group}")]
    Outnumbered { group: usize, opponents: usize },

    #[error("side-step destination is not empty")]
    SideStepBlocked,

    #[error("move claims {claimed} pushed marbles but the board gives {actual}")]
    PushCountMismatch { claimed: u8, actual: u8 },
}

/// Errors in position text that cannot be skipped over
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("side to move must be 'b' or 'w', got {0:?}")]
    InvalidSide(String),

    #[error("position text is missing the {0} line")]
    MissingLine(&'static str),
}
