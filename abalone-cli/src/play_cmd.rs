//! Play command - run a game from a starting layout
//!
//! The engine can play itself, a random mover can play itself, or the engine
//! (Black) can face a random mover (White).

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use abalone_core::{game_result, Board, Engine, EngineConfig, GameResult, Layout, Move, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlayMode {
    /// Engine against itself
    Ai,
    /// Uniformly random legal moves for both sides
    Random,
    /// Engine as Black, random mover as White
    AiVsRandom,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Starting layout (standard, belgian-daisy, german-daisy)
    #[arg(long, default_value = "standard")]
    pub layout: Layout,

    #[arg(long, value_enum, default_value = "ai")]
    pub mode: PlayMode,

    /// Maximum search depth
    #[arg(long, default_value = "4")]
    pub depth: u32,

    /// Time budget per move in milliseconds (0 = unlimited)
    #[arg(long, default_value = "2000")]
    pub time_ms: u64,

    /// Lost marbles that end the game
    #[arg(long, default_value = "6")]
    pub threshold: u8,

    /// Maximum plies before the game is abandoned
    #[arg(long, default_value = "200")]
    pub max_moves: usize,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = EngineConfig::default()
        .with_max_depth(args.depth)
        .with_time_limit_ms((args.time_ms > 0).then_some(args.time_ms))
        .with_loss_threshold(args.threshold);
    let engine = Engine::new(config);
    let mut rng = create_rng(seed);

    tracing::info!("Starting {:?} game on the {} layout", args.mode, args.layout);

    let initial = Board::from_layout(args.layout);
    let (board, moves) = match args.mode {
        PlayMode::Ai => engine.play_game(initial, args.max_moves),
        PlayMode::Random => play_loop(initial, &args, |_| None, &mut rng)?,
        PlayMode::AiVsRandom => play_loop(
            initial,
            &args,
            |board| (board.side_to_move() == Side::Black).then(|| engine.search(board).best_move),
            &mut rng,
        )?,
    };

    report(&board, &moves, &args);
    Ok(())
}

// ============================================================================
// STEPS
// ============================================================================

/// Play until the game ends or `max_moves` is reached. `choose` returns
/// `Some(choice)` to pick the move itself, `None` to defer to the RNG.
fn play_loop(
    initial: Board,
    args: &PlayArgs,
    choose: impl Fn(&Board) -> Option<Option<Move>>,
    rng: &mut ChaCha8Rng,
) -> Result<(Board, Vec<Move>)> {
    let mut board = initial;
    let mut moves = Vec::new();

    while moves.len() < args.max_moves && game_result(&board, args.threshold) == GameResult::Ongoing {
        let mv = match choose(&board) {
            Some(choice) => choice,
            None => board.legal_moves().choose(rng).copied(),
        };
        let Some(mv) = mv else { break };

        tracing::info!("{:>3}. {}", moves.len() + 1, mv.to_notation(board.side_to_move()));
        board = board
            .apply_move(&mv)
            .with_context(|| format!("Illegal move {:?}", mv))?;
        moves.push(mv);
    }

    Ok((board, moves))
}

fn report(board: &Board, moves: &[Move], args: &PlayArgs) {
    let result = game_result(board, args.threshold);
    println!("\n=== Game Over ===");
    println!("Plies:        {}", moves.len());
    println!("Result:       {:?}", result);
    println!("Black lost:   {}", board.marbles_lost(Side::Black));
    println!("White lost:   {}", board.marbles_lost(Side::White));
    println!("Final board:  {}", board.to_notation_string());
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
