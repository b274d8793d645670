//! Server state management
//!
//! One authoritative game session, shared by all handlers.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hexfront_core::{BoardError, Game, GameSnapshot, GreedyAi, PlayerIds, Scenario};

/// The authoritative game and the resolver that plays AI turns
pub struct GameSession {
    pub scenario: Scenario,
    pub game: Game,
    pub players: PlayerIds,
    pub ai: GreedyAi,
}

impl GameSession {
    pub fn new(scenario: Scenario, seed: u64) -> Result<Self, BoardError> {
        let game = scenario.to_game()?;
        tracing::info!("Started game from scenario {:?} (seed {})", scenario.name, seed);
        Ok(Self {
            scenario,
            game,
            players: PlayerIds::default(),
            ai: GreedyAi::with_seed(seed),
        })
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot(&self.players)
    }
}

/// Server-wide shared state
pub struct ServerState {
    pub default_scenario: Scenario,
    current_game: RwLock<Option<GameSession>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::with_scenario(Scenario::default())
    }

    /// Use `scenario` when a start request doesn't bring its own
    pub fn with_scenario(default_scenario: Scenario) -> Self {
        Self {
            default_scenario,
            current_game: RwLock::new(None),
        }
    }

    // Actions and AI turns are all-or-nothing, so a poisoned lock still
    // guards a consistent game.
    pub fn session(&self) -> RwLockReadGuard<'_, Option<GameSession>> {
        self.current_game
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_mut(&self) -> RwLockWriteGuard<'_, Option<GameSession>> {
        self.current_game
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
