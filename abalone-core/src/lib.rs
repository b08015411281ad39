//! Abalone Core - Board model and search engine
//!
//! This crate provides the game logic for Abalone:
//! - Hex board geometry (61 cells, notation, neighbour tables)
//! - Board state, legal move generation and move application with undo
//! - Position evaluation with phase-interpolated weights
//! - Zobrist hashing and a shared transposition table
//! - Alpha-beta/PVS search with iterative deepening and root parallelism

pub mod geometry;
pub mod error;
pub mod board;
pub mod moves;
pub mod movegen;
pub mod layout;
pub mod eval;
pub mod zobrist;
pub mod tt;
pub mod ordering;
pub mod search;
pub mod game;
pub mod config;

// Re-exports for convenient access
pub use geometry::{index_to_notation, notation_to_index, Cell, Coord, Direction, CENTER, NUM_CELLS};
pub use error::{BoardError, MoveError};
pub use board::{Board, MoveDelta, Side, STARTING_MARBLES};
pub use moves::{parse_move, Move, MoveKind};
pub use layout::Layout;
pub use eval::{evaluate, Heuristics, PhaseWeight, WIN_SCORE};
pub use zobrist::ZobristKeys;
pub use tt::{Bound, TranspositionTable, TtEntry};
pub use search::{reference_minimax, Engine, SearchResult, SearchState};
pub use game::{game_result, GameResult};
pub use config::EngineConfig;
