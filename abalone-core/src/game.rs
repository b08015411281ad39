//! Game outcome and self-play

use crate::board::{Board, Side};
use crate::eval::decided_by_material;
use crate::moves::Move;
use crate::search::Engine;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
}

impl GameResult {
    pub fn winner(side: Side) -> Self {
        match side {
            Side::Black => GameResult::BlackWins,
            Side::White => GameResult::WhiteWins,
        }
    }
}

/// A side loses once `loss_threshold` of its marbles are off the board, or
/// when it is to move with no legal move.
pub fn game_result(board: &Board, loss_threshold: u8) -> GameResult {
    if let Some(winner) = decided_by_material(board, loss_threshold) {
        return GameResult::winner(winner);
    }
    if board.legal_moves().is_empty() {
        return GameResult::winner(board.side_to_move().opponent());
    }
    GameResult::Ongoing
}

impl Engine {
    /// Play the engine against itself from `initial` for at most `max_moves`
    /// plies
    pub fn play_game(&self, initial: Board, max_moves: usize) -> (Board, Vec<Move>) {
        let threshold = self.config().loss_threshold;
        let mut board = initial;
        let mut history = Vec::new();

        while history.len() < max_moves && game_result(&board, threshold) == GameResult::Ongoing {
            let Some(mv) = self.search(&board).best_move else {
                break;
            };
            match board.apply_move(&mv) {
                Ok(next) => {
                    tracing::debug!("ply {}: {}", history.len() + 1, mv.to_notation(board.side_to_move()));
                    board = next;
                    history.push(mv);
                }
                Err(err) => {
                    tracing::error!("engine produced an illegal move {:?}: {}", mv, err);
                    break;
                }
            }
        }

        (board, history)
    }
}
