//! HEXFRONT CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the authoritative game server
//! - play: Run one AI-vs-AI battle and report it
//! - match: Run many AI-vs-AI battles and aggregate the results

mod match_cmd;
mod play;
mod selfplay;
mod server;
mod stats;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexfront")]
#[command(about = "HEXFRONT tactical hex battles")]
struct Cli {
    /// Seed for the AI resolvers (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the game server
    Serve(server::ServerArgs),
    /// Play a single AI-vs-AI battle
    Play(play::PlayArgs),
    /// Play a series of AI-vs-AI battles
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexfront=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
    }
}
