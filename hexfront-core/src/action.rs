//! Action protocol: the closed set of battle commands
//!
//! Payloads are validated at the boundary by serde, so the engine only ever
//! sees well-formed actions.

use serde::{Deserialize, Serialize};

use crate::board::Hex;
use crate::combat::AttackOutcome;
use crate::pathfinding::PathResult;
use crate::units::{Side, UnitId};

/// A battle command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    Move { unit_id: UnitId, to: Hex },
    #[serde(rename_all = "camelCase")]
    Attack { unit_id: UnitId, target_id: UnitId },
    EndTurn,
}

/// An action together with the side claiming to perform it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub acting_side: Side,
    #[serde(flatten)]
    pub action: Action,
}

impl ActionRequest {
    pub fn new(acting_side: Side, action: Action) -> Self {
        Self { acting_side, action }
    }
}

/// What an accepted action did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionOutcome {
    Moved { unit: UnitId, path: PathResult },
    Attacked(AttackOutcome),
    #[serde(rename_all = "camelCase")]
    TurnEnded { active_side: Side, round: u32 },
}
