//! Abalone CLI - Command-line interface
//!
//! Commands:
//! - moves: List every legal move of a position and the boards they lead to
//! - search: Pick the engine's move for a position
//! - play: Run a self-play game

mod moves_cmd;
mod play_cmd;
mod search_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abalone")]
#[command(about = "Abalone move generator and search engine")]
struct Cli {
    /// Seed for random play
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write all legal moves and resulting boards for a position file
    Moves(moves_cmd::MovesArgs),
    /// Search a position file for the best move
    Search(search_cmd::SearchArgs),
    /// Play a game from a starting layout
    Play(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves(args) => moves_cmd::run(args),
        Commands::Search(args) => search_cmd::run(args),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
    }
}
