//! Integration tests for the Abalone engine
//!
//! Tests the full stack: position text, move generation, search, self-play
//! and the `abalone` binary.

use abalone_core::{
    game_result, parse_move, Board, Engine, EngineConfig, GameResult, Layout, MoveKind, Side,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("abalone-it-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn abalone() -> Command {
    Command::new(env!("CARGO_BIN_EXE_abalone"))
}

fn quick_engine(depth: u32) -> Engine {
    Engine::new(EngineConfig::fixed_depth(depth).with_tt_size_mb(4).with_root_tasks(2))
}

// ============================================================================
// LIBRARY
// ============================================================================

#[test]
fn test_position_text_round_trip() {
    let board = Board::from_layout(Layout::GermanDaisy);
    let text = board.to_position_text();
    assert_eq!(Board::parse_position(&text).unwrap(), board);
}

#[test]
fn test_every_generated_move_parses_back() {
    for layout in Layout::ALL {
        let board = Board::from_layout(layout);
        for mv in board.legal_moves() {
            let text = mv.to_notation(Side::Black);
            assert_eq!(parse_move(&board, &text), Some(mv), "{}", text);
        }
    }
}

#[test]
fn test_random_games_stay_consistent() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut board = Board::from_layout(Layout::BelgianDaisy);

    for _ in 0..120 {
        if game_result(&board, 6) != GameResult::Ongoing {
            break;
        }
        let moves = board.legal_moves();
        let mv = *moves.choose(&mut rng).unwrap();

        let mut in_place = board.clone();
        let delta = in_place.apply_in_place(&mv).unwrap();
        let copied = board.apply_move(&mv).unwrap();
        assert_eq!(in_place, copied);

        let total_before = board.marble_count(Side::Black) + board.marble_count(Side::White);
        let total_after = copied.marble_count(Side::Black) + copied.marble_count(Side::White);
        assert_eq!(total_before - total_after, delta.pushed_off() as u8);
        if mv.kind == MoveKind::SideStep {
            assert!(!mv.is_push());
        }

        board = copied;
    }
}

#[test]
fn test_engine_plays_legal_opening() {
    let engine = quick_engine(3);
    for layout in Layout::ALL {
        let board = Board::from_layout(layout);
        let result = engine.find_best_move_iterative_deepening(&board, 3, None);
        let mv = result.best_move.unwrap();
        assert!(board.is_legal_move(&mv), "{} on {}", mv.to_notation(Side::Black), layout);
        assert_eq!(result.depth, 3);
    }
}

#[test]
fn test_engine_respects_time_budget() {
    let engine = Engine::new(EngineConfig::default().with_tt_size_mb(4));
    let board = Board::from_layout(Layout::Standard);
    let result = engine.find_best_move_iterative_deepening(&board, 20, Some(Duration::from_millis(200)));

    assert!(result.timed_out);
    assert!(result.best_move.is_some());
    assert!(result.elapsed < Duration::from_secs(5));
}

// ============================================================================
// BINARY
// ============================================================================

#[test]
fn test_moves_command_writes_outputs() {
    let dir = scratch_dir("moves");
    let input = dir.join("position.input");
    std::fs::write(&input, "b\nE5b\n").unwrap();

    let status = abalone().arg("moves").arg("--input").arg(&input).status().unwrap();
    assert!(status.success());

    let moves = std::fs::read_to_string(dir.join("position.move")).unwrap();
    let boards = std::fs::read_to_string(dir.join("position.board")).unwrap();
    assert_eq!(moves.lines().count(), 6);
    assert_eq!(boards.lines().count(), 6);

    let line = moves.lines().position(|l| l == "(b, E5) i → W").unwrap();
    assert_eq!(boards.lines().nth(line), Some("E4b"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_search_command_prints_move_and_board() {
    let dir = scratch_dir("search");
    let input = dir.join("capture.input");
    let black = "A1b,A2b,A3b,A4b,A5b,B1b,B2b,B3b,B4b,B5b,B6b,C1b,E2b,E3b";
    let white = "E1w,G5w,H4w,H5w,H6w,H7w,H8w,H9w,I5w,I6w,I7w,I8w,I9w";
    std::fs::write(&input, format!("b\n{},{}\n", black, white)).unwrap();

    let output = abalone()
        .args(["search", "--depth", "2", "--time-ms", "0", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("(b, E2 E3) i → W"));
    assert_eq!(
        lines.next(),
        Some("A1b,A2b,A3b,A4b,A5b,B1b,B2b,B3b,B4b,B5b,B6b,C1b,E1b,E2b,G5w,H4w,H5w,H6w,H7w,H8w,H9w,I5w,I6w,I7w,I8w,I9w")
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_search_command_rejects_missing_file() {
    let output = abalone()
        .args(["search", "--input", "/nonexistent/abalone.input"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read position"));
}

#[test]
fn test_play_command_random_game() {
    let output = abalone()
        .args(["--seed", "7", "play", "--mode", "random", "--max-moves", "30"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("=== Game Over ==="));
}
