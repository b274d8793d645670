//! Game API routes
//!
//! The server holds the authoritative game. Every mutating route answers
//! with a fresh snapshot.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use hexfront_core::{
    ActionOutcome, ActionRequest, AiResolver, GameSnapshot, Hex, IllegalAction, PathResult,
    Scenario, Side, UnitId,
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::{GameSession, ServerState};

const DEFAULT_SEED: u64 = 42;

/// Snapshot of the running game
#[derive(Serialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub snapshot: GameSnapshot,
}

impl SnapshotResponse {
    fn from_session(session: &GameSession) -> Json<Self> {
        Json(Self {
            success: true,
            snapshot: session.snapshot(),
        })
    }
}

/// Outcomes of applied actions plus the resulting snapshot
#[derive(Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub outcomes: Vec<ActionOutcome>,
    pub snapshot: GameSnapshot,
}

fn with_session<T>(
    state: &ServerState,
    f: impl FnOnce(&mut GameSession) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut guard = state.session_mut();
    let session = guard.as_mut().ok_or(ApiError::NoGame)?;
    f(session)
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Start request; both fields optional
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub scenario: Option<Scenario>,
    pub seed: Option<u64>,
}

/// Start a new game, replacing any running one
pub async fn start_game(
    State(state): State<Arc<ServerState>>,
    req: Option<Json<StartRequest>>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let scenario = req
        .scenario
        .unwrap_or_else(|| state.default_scenario.clone());

    let session = GameSession::new(scenario, req.seed.unwrap_or(DEFAULT_SEED))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let response = SnapshotResponse::from_session(&session);
    *state.session_mut() = Some(session);
    Ok(response)
}

pub async fn get_state(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let guard = state.session();
    let session = guard.as_ref().ok_or(ApiError::NoGame)?;
    Ok(SnapshotResponse::from_session(session))
}

/// Place one unit, or let the engine place all remaining ones
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub side: Side,
    pub unit_id: Option<UnitId>,
    pub to: Option<Hex>,
    #[serde(default)]
    pub auto: bool,
}

pub async fn deploy(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<DeployRequest>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    with_session(&state, |session| {
        if req.auto {
            session.ai.deploy(&mut session.game, req.side)?;
        } else {
            let (Some(unit_id), Some(to)) = (req.unit_id, req.to) else {
                return Err(ApiError::BadRequest(
                    "deploy needs unitId and to, or auto".to_string(),
                ));
            };
            session.game.place_unit(req.side, unit_id, to)?;
        }
        Ok(SnapshotResponse::from_session(session))
    })
}

/// Close deployment and start the battle
pub async fn begin_battle(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    with_session(&state, |session| {
        session.game.start_battle()?;
        Ok(SnapshotResponse::from_session(session))
    })
}

/// End the battle now and score it by damage dealt
pub async fn finish_game(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    with_session(&state, |session| {
        session.game.request_finish()?;
        Ok(SnapshotResponse::from_session(session))
    })
}

// ============================================================================
// BATTLE
// ============================================================================

/// Apply one action
pub async fn apply_action(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    with_session(&state, |session| {
        let outcome = session.game.apply(req)?;
        tracing::debug!("{:?} applied {:?}", req.acting_side, req.action);
        Ok(Json(ActionResponse {
            success: true,
            outcomes: vec![outcome],
            snapshot: session.snapshot(),
        }))
    })
}

#[derive(Deserialize)]
pub struct AiTurnRequest {
    pub side: Side,
}

/// Let the AI play `side`'s whole turn
pub async fn ai_turn(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<AiTurnRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    with_session(&state, |session| {
        let outcomes = session.ai.commit_turn(&mut session.game, req.side)?;
        Ok(Json(ActionResponse {
            success: true,
            outcomes,
            snapshot: session.snapshot(),
        }))
    })
}

#[derive(Deserialize)]
pub struct PathParams {
    pub unit: u32,
    pub q: i32,
    pub r: i32,
}

#[derive(Serialize)]
pub struct PathResponse {
    pub success: bool,
    pub path: PathResult,
}

/// Preview the path a move order would take
pub async fn preview_path(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PathParams>,
) -> Result<Json<PathResponse>, ApiError> {
    let guard = state.session();
    let session = guard.as_ref().ok_or(ApiError::NoGame)?;
    let unit_id = UnitId(params.unit);
    let target = Hex::new(params.q, params.r);

    let path = session
        .game
        .preview_move(unit_id, target)
        .ok_or_else(|| {
            ApiError::Rejected(match session.game.unit(unit_id) {
                None => IllegalAction::UnknownUnit(unit_id),
                Some(unit) if !unit.is_alive() => IllegalAction::UnitDestroyed(unit_id),
                Some(_) => IllegalAction::NotDeployed(unit_id),
            })
        })?;
    Ok(Json(PathResponse {
        success: true,
        path,
    }))
}
