//! Error types
//!
//! `IllegalAction` is the rejection reason for any move, attack, deployment
//! or turn request. Rejections never mutate game state.

use crate::board::Hex;
use crate::game::Phase;
use crate::units::{Side, UnitId};

/// An action the rules do not allow right now
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    #[error("game is over")]
    GameFinished,

    #[error("action not allowed during {actual:?} phase (needs {expected:?})")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("it is not {0:?}'s turn")]
    NotYourTurn(Side),

    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("unit {unit} does not belong to {side:?}")]
    NotOwner { unit: UnitId, side: Side },

    #[error("unit {0} has been destroyed")]
    UnitDestroyed(UnitId),

    #[error("unit {0} has not been deployed")]
    NotDeployed(UnitId),

    #[error("unit {0} has already moved this turn")]
    AlreadyMoved(UnitId),

    #[error("unit {0} has already attacked this turn")]
    AlreadyActed(UnitId),

    #[error("column {column} is outside the deployment zone")]
    OutsideDeploymentZone { column: i32 },

    #[error("tile {0} is occupied")]
    TileOccupied(Hex),

    #[error("tile {0} is impassable")]
    Impassable(Hex),

    #[error("no path toward {0} within movement budget")]
    Unreachable(Hex),

    #[error("{remaining} unit(s) still waiting to be deployed")]
    DeploymentIncomplete { remaining: usize },

    #[error("cannot attack a friendly unit")]
    FriendlyTarget,

    #[error("target is {distance} away but range is {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("unit cannot deal damage at this range")]
    NoDamageAtRange,
}

/// Failure to reach or apply an authoritative snapshot
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("rejected by authority: {0}")]
    Rejected(IllegalAction),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("another action is still awaiting the authority")]
    InFlight,
}

impl From<IllegalAction> for SyncError {
    fn from(err: IllegalAction) -> Self {
        SyncError::Rejected(err)
    }
}

/// Malformed board input
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("more than one tile at {0}")]
    DuplicateTile(Hex),

    #[error("tile {0} has zero movement cost")]
    ZeroCost(Hex),

    #[error("unknown map glyph {glyph:?} at {at}")]
    UnknownGlyph { glyph: char, at: Hex },
}
