//! HEXFRONT Server - Authoritative game over HTTP
//!
//! This crate provides the web backend:
//! - REST API for deployment, actions and AI turns
//! - Snapshots of the authoritative game after every change
//! - Static file serving for a browser client

mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub use state::{GameSession, ServerState};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8003,
            static_dir: "hexfront/static".to_string(),
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Unit catalog
        .route("/api/units", get(routes::units::get_units))
        // Board geometry
        .route("/api/board", get(routes::board::get_board))
        // Game API
        .route("/api/game/start", post(routes::game::start_game))
        .route("/api/game/state", get(routes::game::get_state))
        .route("/api/game/deploy", post(routes::game::deploy))
        .route("/api/game/begin", post(routes::game::begin_battle))
        .route("/api/game/action", post(routes::game::apply_action))
        .route("/api/game/ai-turn", post(routes::game::ai_turn))
        .route("/api/game/finish", post(routes::game::finish_game))
        .route("/api/game/path", get(routes::game::preview_path))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig, state: ServerState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = create_router(&config, Arc::new(state));

    tracing::info!("HEXFRONT Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
