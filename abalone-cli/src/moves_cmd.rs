//! Moves command - enumerate legal moves of a position file
//!
//! Writes one move per line to the move file and, on the same line number,
//! the board that move produces to the board file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use abalone_core::{Board, Move};

#[derive(Args)]
pub struct MovesArgs {
    /// Position file: side to move on the first line, marbles on the second
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Move output (default: input with a .move extension)
    #[arg(long, value_name = "FILE")]
    pub moves_out: Option<PathBuf>,

    /// Board output (default: input with a .board extension)
    #[arg(long, value_name = "FILE")]
    pub boards_out: Option<PathBuf>,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: MovesArgs) -> Result<()> {
    let board = load_position(&args.input)?;
    let moves = board.legal_moves();
    let children = apply_all(&board, &moves)?;

    let moves_out = args.moves_out.unwrap_or_else(|| args.input.with_extension("move"));
    let boards_out = args.boards_out.unwrap_or_else(|| args.input.with_extension("board"));
    write_outputs(&board, &moves, &children, &moves_out, &boards_out)?;

    println!("Generated {} possible moves.", moves.len());
    Ok(())
}

// ============================================================================
// STEPS
// ============================================================================

/// Read a two-line position file
pub fn load_position(path: &Path) -> Result<Board> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read position: {}", path.display()))?;
    Board::parse_position(&text).with_context(|| format!("Failed to parse position: {}", path.display()))
}

fn apply_all(board: &Board, moves: &[Move]) -> Result<Vec<Board>> {
    moves
        .iter()
        .map(|mv| board.apply_move(mv).with_context(|| format!("Generated move {:?} did not apply", mv)))
        .collect()
}

fn write_outputs(board: &Board, moves: &[Move], children: &[Board], moves_out: &Path, boards_out: &Path) -> Result<()> {
    let side = board.side_to_move();
    let move_lines: String = moves.iter().map(|mv| mv.to_notation(side) + "\n").collect();
    let board_lines: String = children.iter().map(|b| b.to_notation_string() + "\n").collect();

    fs::write(moves_out, move_lines).with_context(|| format!("Failed to write {}", moves_out.display()))?;
    fs::write(boards_out, board_lines).with_context(|| format!("Failed to write {}", boards_out.display()))?;

    tracing::info!(
        "Wrote {} moves to {} and {}",
        moves.len(),
        moves_out.display(),
        boards_out.display()
    );
    Ok(())
}
