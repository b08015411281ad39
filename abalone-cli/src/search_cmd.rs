//! Search command - choose the engine's move for a position file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use abalone_core::{Engine, EngineConfig};

use crate::moves_cmd::load_position;

#[derive(Args)]
pub struct SearchArgs {
    /// Position file: side to move on the first line, marbles on the second
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Engine config JSON (command-line flags override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Time budget in milliseconds (0 = unlimited)
    #[arg(long)]
    pub time_ms: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let config = build_config(&args)?;
    let board = load_position(&args.input)?;

    tracing::info!(
        "Searching {} to depth {} (time limit {:?})",
        args.input.display(),
        config.max_depth,
        config.time_limit()
    );

    let engine = Engine::new(config);
    let result = engine.search(&board);
    let side = board.side_to_move();

    let Some(mv) = result.best_move else {
        println!("No legal move for {}", side.to_char());
        return Ok(());
    };
    let child = board.apply_move(&mv).context("Engine returned an illegal move")?;

    if args.json {
        let report = serde_json::json!({
            "move": mv.to_notation(side),
            "board": child.to_notation_string(),
            "score": result.score,
            "depth": result.depth,
            "nodes": result.nodes,
            "prunes": result.prunes,
            "elapsed_ms": result.elapsed.as_millis() as u64,
            "timed_out": result.timed_out,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", mv.to_notation(side));
        println!("{}", child.to_notation_string());
    }
    Ok(())
}

fn build_config(args: &SearchArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(depth) = args.depth {
        config = config.with_max_depth(depth);
    }
    if let Some(ms) = args.time_ms {
        config = config.with_time_limit_ms((ms > 0).then_some(ms));
    }
    Ok(config)
}
