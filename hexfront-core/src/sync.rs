//! Client-side mirror of an authoritative game
//!
//! The mirror checks and applies each action locally as a prediction, then
//! sends it to the authority. Whatever snapshot comes back replaces the local
//! state wholesale. On any sync failure the last authoritative state is kept.

use serde::{Deserialize, Serialize};

use crate::action::{ActionOutcome, ActionRequest};
use crate::ai::{AiResolver, GreedyAi};
use crate::config::GameConfig;
use crate::error::SyncError;
use crate::game::Game;
use crate::snapshot::{GameSnapshot, PlayerIds, SyncContext};
use crate::units::{Side, UnitCatalog, UnitId};
use crate::victory::Winner;

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Round-trips actions to whoever holds the authoritative game
pub trait GameTransport {
    /// Apply one action and return the resulting state
    fn apply_action(&mut self, request: &ActionRequest) -> Result<GameSnapshot, SyncError>;

    /// Have the authority play `side`'s whole turn
    fn request_ai_turn(&mut self, side: Side) -> Result<GameSnapshot, SyncError>;
}

/// Receives the final result of a game
pub trait StatsRecorder {
    fn record_result(&mut self, report: &StatsReport) -> anyhow::Result<()>;
}

/// Result from one side's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Per-unit line of a stats report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub instance_id: UnitId,
    pub owner: Side,
    pub template_id: String,
    pub current_hp: u32,
    pub max_hp: u32,
    pub survived: bool,
}

/// Final result handed to a `StatsRecorder`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub side: Side,
    pub outcome: Outcome,
    pub reason: String,
    pub rounds: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub units: Vec<UnitSummary>,
}

impl StatsReport {
    /// Summarize a finished game for `side`
    pub fn from_game(game: &Game, side: Side) -> Self {
        let outcome = match game.result().winner {
            Winner::Side(winner) if winner == side => Outcome::Win,
            Winner::Side(_) => Outcome::Loss,
            Winner::Draw | Winner::Ongoing => Outcome::Draw,
        };
        let roster = game.roster();
        Self {
            side,
            outcome,
            reason: game.result().reason.clone(),
            rounds: game.round(),
            damage_dealt: roster.damage_dealt_by(side),
            damage_taken: roster.damage_dealt_by(side.opponent()),
            units: roster
                .all()
                .iter()
                .map(|u| UnitSummary {
                    instance_id: u.id,
                    owner: u.owner,
                    template_id: u.template_id().to_string(),
                    current_hp: u.current_hp,
                    max_hp: u.template().max_hp,
                    survived: u.is_alive(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// LOCAL TRANSPORT
// ============================================================================

/// In-process authority: owns the real game and a resolver for AI turns
pub struct LocalTransport<A: AiResolver = GreedyAi> {
    game: Game,
    players: PlayerIds,
    ai: A,
}

impl LocalTransport<GreedyAi> {
    pub fn new(game: Game) -> Self {
        Self::with_ai(game, GreedyAi::new())
    }
}

impl<A: AiResolver> LocalTransport<A> {
    pub fn with_ai(game: Game, ai: A) -> Self {
        Self {
            game,
            players: PlayerIds::default(),
            ai,
        }
    }

    pub fn players(&self) -> &PlayerIds {
        &self.players
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot(&self.players)
    }
}

impl<A: AiResolver> GameTransport for LocalTransport<A> {
    fn apply_action(&mut self, request: &ActionRequest) -> Result<GameSnapshot, SyncError> {
        self.game.apply(*request)?;
        Ok(self.snapshot())
    }

    fn request_ai_turn(&mut self, side: Side) -> Result<GameSnapshot, SyncError> {
        self.ai.commit_turn(&mut self.game, side)?;
        Ok(self.snapshot())
    }
}

// ============================================================================
// CLIENT MIRROR
// ============================================================================

/// Local copy of the game
#[derive(Clone, Debug)]
pub enum Replica {
    /// Last state confirmed by the authority
    Authoritative(Game),
    /// Locally applied action still awaiting the authority
    Predicted {
        confirmed: Game,
        predicted: Game,
        pending: ActionRequest,
    },
}

impl Replica {
    /// The state to show: the prediction if there is one
    pub fn game(&self) -> &Game {
        match self {
            Replica::Authoritative(game) => game,
            Replica::Predicted { predicted, .. } => predicted,
        }
    }

    pub fn confirmed(&self) -> &Game {
        match self {
            Replica::Authoritative(game) => game,
            Replica::Predicted { confirmed, .. } => confirmed,
        }
    }
}

/// Client view of a game held by a remote authority
pub struct ClientMirror<T: GameTransport> {
    transport: T,
    context: SyncContext,
    catalog: UnitCatalog,
    config: GameConfig,
    replica: Replica,
    recorder: Option<Box<dyn StatsRecorder + Send>>,
    reported: bool,
}

impl<T: GameTransport> ClientMirror<T> {
    /// Start from an authoritative snapshot
    pub fn new(
        transport: T,
        context: SyncContext,
        catalog: UnitCatalog,
        config: GameConfig,
        initial: &GameSnapshot,
    ) -> Result<Self, SyncError> {
        let game = Game::from_snapshot(initial, &context, catalog.clone(), config.clone())?;
        let mut mirror = Self {
            transport,
            context,
            catalog,
            config,
            replica: Replica::Authoritative(game),
            recorder: None,
            reported: false,
        };
        mirror.delegate_ai_turn()?;
        Ok(mirror)
    }

    /// Attach a stats sink; a game that is already over is reported now
    pub fn with_recorder(mut self, recorder: Box<dyn StatsRecorder + Send>) -> Self {
        self.recorder = Some(recorder);
        self.report_if_finished();
        self
    }

    pub fn game(&self) -> &Game {
        self.replica.game()
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn is_predicted(&self) -> bool {
        matches!(self.replica, Replica::Predicted { .. })
    }

    pub fn local_side(&self) -> Side {
        self.context.local_side
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Apply an action locally without contacting the authority.
    ///
    /// Only one action can be in flight; a second prediction is refused
    /// until the first is confirmed or dropped.
    pub fn predict(&mut self, request: ActionRequest) -> Result<ActionOutcome, SyncError> {
        let Replica::Authoritative(confirmed) = &self.replica else {
            return Err(SyncError::InFlight);
        };
        let mut predicted = confirmed.clone();
        let outcome = predicted.apply(request)?;
        self.replica = Replica::Predicted {
            confirmed: confirmed.clone(),
            predicted,
            pending: request,
        };
        Ok(outcome)
    }

    /// Send the pending prediction and adopt the authority's answer
    pub fn confirm(&mut self) -> Result<&Game, SyncError> {
        let Replica::Predicted { pending, .. } = &self.replica else {
            return Ok(self.replica.game());
        };
        let pending = *pending;

        match self.transport.apply_action(&pending) {
            Ok(snapshot) => self.apply_snapshot(&snapshot)?,
            Err(err) => {
                tracing::warn!("Sync failed, dropping prediction: {}", err);
                self.rollback();
                return Err(err);
            }
        }
        Ok(self.replica.game())
    }

    /// Predict, send and reconcile one action
    pub fn submit(&mut self, request: ActionRequest) -> Result<&Game, SyncError> {
        self.predict(request)?;
        self.confirm()
    }

    /// Replace local state with an authoritative snapshot, dropping any
    /// prediction. An unreadable snapshot leaves the last confirmed state.
    ///
    /// If the snapshot hands control to the AI side, its turn is requested
    /// from the authority straight away.
    pub fn apply_snapshot(&mut self, snapshot: &GameSnapshot) -> Result<(), SyncError> {
        self.adopt(snapshot)?;
        self.delegate_ai_turn()
    }

    fn adopt(&mut self, snapshot: &GameSnapshot) -> Result<(), SyncError> {
        let game = match Game::from_snapshot(
            snapshot,
            &self.context,
            self.catalog.clone(),
            self.config.clone(),
        ) {
            Ok(game) => game,
            Err(err) => {
                self.rollback();
                return Err(err);
            }
        };
        self.replica = Replica::Authoritative(game);
        self.report_if_finished();
        Ok(())
    }

    fn rollback(&mut self) {
        if let Replica::Predicted { confirmed, .. } = &self.replica {
            self.replica = Replica::Authoritative(confirmed.clone());
        }
    }

    /// Hand the turn to the authority's AI when it is the AI side's move
    fn delegate_ai_turn(&mut self) -> Result<(), SyncError> {
        let game = self.replica.game();
        let Some(ai_side) = self.config.ai_side else {
            return Ok(());
        };
        if game.is_finished() || game.active_side() != ai_side {
            return Ok(());
        }

        tracing::debug!("Requesting AI turn for {:?}", ai_side);
        let snapshot = self.transport.request_ai_turn(ai_side)?;
        self.adopt(&snapshot)?;

        let game = self.replica.game();
        if !game.is_finished() && game.active_side() == ai_side {
            tracing::warn!("Authority left {:?} to move after its AI turn", ai_side);
        }
        Ok(())
    }

    /// Report the result once a recorder is attached; recorder failures
    /// are only logged
    fn report_if_finished(&mut self) {
        if self.reported || self.recorder.is_none() || !self.replica.game().is_finished() {
            return;
        }
        self.reported = true;

        let report = StatsReport::from_game(self.replica.game(), self.context.local_side);
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(err) = recorder.record_result(&report) {
                tracing::warn!("Failed to record game result: {:#}", err);
            }
        }
    }
}
