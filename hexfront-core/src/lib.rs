//! HEXFRONT Core - Tactical combat engine
//!
//! This crate provides the rules engine for HEXFRONT:
//! - Board geometry (axial hex grid with terrain costs)
//! - Cost-bounded pathfinding
//! - Unit catalog and the two-army roster
//! - Deployment, turn flow, combat and victory
//! - Snapshots and a client-side mirror of an authoritative game
//! - A greedy reference AI

pub mod action;
pub mod ai;
pub mod board;
pub mod combat;
pub mod config;
pub mod error;
pub mod game;
pub mod pathfinding;
pub mod scenario;
pub mod selection;
pub mod snapshot;
pub mod sync;
pub mod units;
pub mod victory;

// Re-exports for convenient access
pub use action::{Action, ActionOutcome, ActionRequest};
pub use ai::{AiResolver, GreedyAi};
pub use board::{Board, Hex, Terrain, Tile, DIRECTIONS};
pub use combat::{resolve_attack, AttackKind, AttackOutcome};
pub use config::{GameConfig, TurnPolicy};
pub use error::{BoardError, IllegalAction, SyncError};
pub use game::{Game, Phase, TurnState};
pub use pathfinding::{find_path, reachable_tiles, PathResult};
pub use scenario::Scenario;
pub use selection::{ClickOutcome, Selection};
pub use snapshot::{GameSnapshot, GameStatus, PlayerIds, SnapshotUnit, SyncContext};
pub use sync::{ClientMirror, GameTransport, LocalTransport, Outcome, StatsRecorder, StatsReport};
pub use units::{Side, UnitCatalog, UnitId, UnitInstance, UnitRoster, UnitTemplate};
pub use victory::{GameResult, VictoryConfig, Winner};
