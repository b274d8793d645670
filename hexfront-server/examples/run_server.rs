//! Example to run the HEXFRONT server standalone
//!
//! Run with: cargo run -p hexfront-server --example run_server

use hexfront_server::{run_server, ServerConfig, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    println!("Starting HEXFRONT server on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Start a game with: curl -X POST http://localhost:{}/api/game/start", config.port);

    run_server(config, ServerState::new()).await
}
