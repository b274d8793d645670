//! Board geometry endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use hexfront_core::{Board, Tile, DIRECTIONS};
use serde::Serialize;

use super::ApiError;
use crate::state::ServerState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInfo {
    pub columns: u32,
    pub rows: u32,
    pub tiles: Vec<Tile>,
    pub directions: Vec<[i32; 2]>,
    pub map: Vec<String>,
}

impl BoardInfo {
    fn from_board(board: &Board) -> Self {
        Self {
            columns: board.columns(),
            rows: board.rows(),
            tiles: board.sorted_tiles(),
            directions: DIRECTIONS.iter().map(|&(dq, dr)| [dq, dr]).collect(),
            map: board.render().lines().map(str::to_string).collect(),
        }
    }
}

/// Board of the running game, or of the default scenario
pub async fn get_board(State(state): State<Arc<ServerState>>) -> Result<Json<BoardInfo>, ApiError> {
    if let Some(session) = state.session().as_ref() {
        return Ok(Json(BoardInfo::from_board(session.game.board())));
    }
    let board = state
        .default_scenario
        .board()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(BoardInfo::from_board(&board)))
}
