//! Authoritative game snapshots
//!
//! A snapshot carries everything needed to rebuild a `Game`: tiles, units,
//! turn counter and status. The active side is sent as a player id, so
//! rebuilding needs to know which side the local player is on.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Hex, Tile};
use crate::config::GameConfig;
use crate::error::SyncError;
use crate::game::{Game, Phase, TurnState};
use crate::units::{Side, UnitCatalog, UnitId, UnitRoster};
use crate::victory::{self, GameResult};

/// Lifecycle status as reported by the authority
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
    Paused,
}

impl GameStatus {
    pub fn from_phase(phase: Phase) -> Self {
        match phase {
            Phase::Deployment => GameStatus::NotStarted,
            Phase::Battle => GameStatus::InProgress,
            Phase::Finished => GameStatus::Finished,
        }
    }

    /// Paused games resume in battle
    pub fn phase(self) -> Phase {
        match self {
            GameStatus::NotStarted => Phase::Deployment,
            GameStatus::Finished => Phase::Finished,
            GameStatus::InProgress | GameStatus::Paused => Phase::Battle,
        }
    }
}

/// One unit as it appears in a snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUnit {
    pub instance_id: UnitId,
    pub owner: Side,
    pub template_id: String,
    pub current_hp: u32,
    pub position: Option<Hex>,
}

/// Complete point-in-time game state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board_tiles: Vec<Tile>,
    pub turn_number: u32,
    pub current_player: String,
    pub status: GameStatus,
    pub units: Vec<SnapshotUnit>,
    #[serde(default)]
    pub acted: Vec<UnitId>,
    #[serde(default)]
    pub moved: Vec<UnitId>,
    #[serde(default)]
    pub result: Option<GameResult>,
}

/// Player ids the authority uses for each side
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIds {
    pub a: String,
    pub b: String,
}

impl PlayerIds {
    pub fn id(&self, side: Side) -> &str {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

impl Default for PlayerIds {
    fn default() -> Self {
        Self {
            a: "player-a".to_string(),
            b: "player-b".to_string(),
        }
    }
}

/// Who the local player is, for reading `current_player`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncContext {
    pub local_player: String,
    pub local_side: Side,
}

impl SyncContext {
    pub fn new(local_player: impl Into<String>, local_side: Side) -> Self {
        Self {
            local_player: local_player.into(),
            local_side,
        }
    }

    pub fn for_side(players: &PlayerIds, side: Side) -> Self {
        Self::new(players.id(side), side)
    }

    /// The current player is us, or else it's the other side
    pub fn active_side(&self, current_player: &str) -> Side {
        if current_player == self.local_player {
            self.local_side
        } else {
            self.local_side.opponent()
        }
    }
}

impl Game {
    /// Capture the full game state
    pub fn snapshot(&self, players: &PlayerIds) -> GameSnapshot {
        let mut acted: Vec<UnitId> = self.turn().acted.iter().copied().collect();
        let mut moved: Vec<UnitId> = self.turn().moved.iter().copied().collect();
        acted.sort();
        moved.sort();

        GameSnapshot {
            board_tiles: self.board().sorted_tiles(),
            turn_number: self.round(),
            current_player: players.id(self.active_side()).to_string(),
            status: GameStatus::from_phase(self.phase()),
            units: self
                .roster()
                .all()
                .iter()
                .map(|u| SnapshotUnit {
                    instance_id: u.id,
                    owner: u.owner,
                    template_id: u.template_id().to_string(),
                    current_hp: u.current_hp,
                    position: u.position,
                })
                .collect(),
            acted,
            moved,
            result: self.result().is_decided().then(|| self.result().clone()),
        }
    }

    /// Rebuild a game from an authoritative snapshot.
    ///
    /// Unknown template ids get placeholder stats. Structural problems
    /// (duplicate tiles or unit ids, units off the board or stacked) are
    /// rejected and the caller keeps its previous state.
    pub fn from_snapshot(
        snapshot: &GameSnapshot,
        context: &SyncContext,
        catalog: UnitCatalog,
        config: GameConfig,
    ) -> Result<Game, SyncError> {
        let board = Board::new(snapshot.board_tiles.iter().copied())
            .map_err(|e| SyncError::InvalidSnapshot(e.to_string()))?;

        let mut roster = UnitRoster::new(catalog);
        let mut seen_ids = FxHashSet::default();
        let mut occupied = FxHashSet::default();
        for unit in &snapshot.units {
            if !seen_ids.insert(unit.instance_id) {
                return Err(SyncError::InvalidSnapshot(format!(
                    "duplicate unit id {}",
                    unit.instance_id
                )));
            }
            if let Some(hex) = unit.position {
                if board.tile_at(hex).is_none() {
                    return Err(SyncError::InvalidSnapshot(format!(
                        "unit {} is off the board at {}",
                        unit.instance_id, hex
                    )));
                }
                if unit.current_hp > 0 && !occupied.insert(hex) {
                    return Err(SyncError::InvalidSnapshot(format!(
                        "more than one unit at {}",
                        hex
                    )));
                }
            }
            roster.restore(
                unit.instance_id,
                &unit.template_id,
                unit.owner,
                unit.position,
                unit.current_hp,
            );
        }

        let phase = snapshot.status.phase();
        let active_side = context.active_side(&snapshot.current_player);

        // Turn flags only make sense for the active side's live units
        let keep = |id: UnitId| {
            phase == Phase::Battle
                && roster
                    .get(id)
                    .is_some_and(|u| u.owner == active_side && u.is_alive())
        };
        let turn = TurnState {
            phase,
            active_side,
            round: snapshot.turn_number.max(1),
            acted: snapshot.acted.iter().copied().filter(|&id| keep(id)).collect(),
            moved: snapshot.moved.iter().copied().filter(|&id| keep(id)).collect(),
        };

        let result = match (&snapshot.result, phase) {
            (Some(result), Phase::Finished) if result.is_decided() => result.clone(),
            (_, Phase::Finished) => {
                tracing::warn!("Finished snapshot without a result, scoring by points");
                victory::resolve_by_points(&roster, "finished by authority")
            }
            _ => GameResult::ongoing(),
        };

        Ok(Game::from_parts(Arc::new(board), roster, turn, result, config))
    }
}
