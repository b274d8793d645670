//! Unit catalog endpoint
//!
//! Returns the unit types of the running game, or of the default scenario
//! when no game has been started.

use std::sync::Arc;

use axum::{extract::State, Json};
use hexfront_core::UnitTemplate;

use crate::state::ServerState;

pub async fn get_units(State(state): State<Arc<ServerState>>) -> Json<Vec<UnitTemplate>> {
    let session = state.session();
    let catalog = match session.as_ref() {
        Some(session) => session.game.roster().catalog().clone(),
        None => state.default_scenario.catalog(),
    };
    Json(catalog.templates().into_iter().cloned().collect())
}
