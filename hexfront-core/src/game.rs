//! Game state: deployment, turn flow and action application
//!
//! `Game` owns the roster and turn state. Every mutation goes through its
//! methods, and a rejected action leaves the state untouched.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionOutcome, ActionRequest};
use crate::board::{Board, Hex};
use crate::combat::{resolve_attack, AttackOutcome};
use crate::config::{GameConfig, TurnPolicy};
use crate::error::IllegalAction;
use crate::pathfinding::{find_path, reachable_tiles, PathResult};
use crate::units::{Side, UnitId, UnitInstance, UnitRoster};
use crate::victory::{self, GameResult};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game lifecycle; `Finished` is terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Deployment,
    Battle,
    Finished,
}

/// Whose turn it is and what each unit has already done
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnState {
    pub phase: Phase,
    pub active_side: Side,
    /// Increments after both sides have had a turn
    pub round: u32,
    pub acted: FxHashSet<UnitId>,
    pub moved: FxHashSet<UnitId>,
}

impl TurnState {
    fn deployment(leading_side: Side) -> Self {
        Self {
            phase: Phase::Deployment,
            active_side: leading_side,
            round: 1,
            acted: FxHashSet::default(),
            moved: FxHashSet::default(),
        }
    }

    fn clear_actions(&mut self) {
        self.acted.clear();
        self.moved.clear();
    }
}

// ============================================================================
// GAME
// ============================================================================

/// A single game session
#[derive(Clone, Debug)]
pub struct Game {
    board: Arc<Board>,
    roster: UnitRoster,
    turn: TurnState,
    result: GameResult,
    config: GameConfig,
}

impl Game {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Start a game in deployment with all units off the board
    pub fn new(board: Arc<Board>, roster: UnitRoster, config: GameConfig) -> Self {
        tracing::info!(
            "New game: {}x{} board, {} vs {} units, {:?}",
            board.columns(),
            board.rows(),
            roster.units_of(Side::A).count(),
            roster.units_of(Side::B).count(),
            config.victory
        );
        Self {
            turn: TurnState::deployment(config.leading_side),
            board,
            roster,
            result: GameResult::ongoing(),
            config,
        }
    }

    /// Reassemble a game from already-validated parts
    pub(crate) fn from_parts(
        board: Arc<Board>,
        roster: UnitRoster,
        turn: TurnState,
        result: GameResult,
        config: GameConfig,
    ) -> Self {
        Self {
            board,
            roster,
            turn,
            result,
            config,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn shared_board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn roster(&self) -> &UnitRoster {
        &self.roster
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    pub fn active_side(&self) -> Side {
        self.turn.active_side
    }

    pub fn round(&self) -> u32 {
        self.turn.round
    }

    pub fn result(&self) -> &GameResult {
        &self.result
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn roster_mut(&mut self) -> &mut UnitRoster {
        &mut self.roster
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitInstance> {
        self.roster.get(id)
    }

    pub fn is_finished(&self) -> bool {
        self.turn.phase == Phase::Finished
    }

    // ========================================================================
    // DEPLOYMENT
    // ========================================================================

    /// Is `hex` inside `side`'s deployment columns?
    pub fn in_deployment_zone(&self, side: Side, hex: Hex) -> bool {
        let column = self.board.column_index(hex);
        let width = self.config.deployment_columns as i32;
        let columns = self.board.columns() as i32;
        match side {
            Side::A => (0..width).contains(&column),
            Side::B => (columns - width..columns).contains(&column),
        }
    }

    /// Place (or re-place) one of the deploying side's units
    pub fn place_unit(&mut self, side: Side, unit_id: UnitId, hex: Hex) -> Result<(), IllegalAction> {
        self.ensure_phase(Phase::Deployment)?;
        if side != self.turn.active_side {
            return Err(IllegalAction::NotYourTurn(side));
        }
        let unit = self.owned_unit(side, unit_id)?;
        if !unit.is_alive() {
            return Err(IllegalAction::UnitDestroyed(unit_id));
        }

        if !self.board.is_passable(hex) {
            return Err(IllegalAction::Impassable(hex));
        }
        if !self.in_deployment_zone(side, hex) {
            return Err(IllegalAction::OutsideDeploymentZone {
                column: self.board.column_index(hex),
            });
        }
        if self.roster.occupied_tiles(Some(unit_id)).contains(&hex) {
            return Err(IllegalAction::TileOccupied(hex));
        }

        if let Some(unit) = self.roster.get_mut(unit_id) {
            unit.position = Some(hex);
        }
        tracing::debug!("Deployed {} at {}", unit_id, hex);
        Ok(())
    }

    /// Place every unplaced unit of the deploying side on the first free
    /// tiles of its zone, working inward from its board edge.
    /// Returns how many units were placed.
    pub fn auto_deploy(&mut self, side: Side) -> Result<usize, IllegalAction> {
        self.ensure_phase(Phase::Deployment)?;
        if side != self.turn.active_side {
            return Err(IllegalAction::NotYourTurn(side));
        }

        let pending: Vec<UnitId> = self
            .roster
            .units_of(side)
            .filter(|u| u.is_alive() && u.position.is_none())
            .map(|u| u.id)
            .collect();

        let occupied = self.roster.occupied_tiles(None);
        let free_tiles: Vec<Hex> = self
            .zone_tiles(side)
            .into_iter()
            .filter(|hex| self.board.is_passable(*hex) && !occupied.contains(hex))
            .collect();

        let mut placed = 0;
        for (unit_id, hex) in pending.iter().zip(free_tiles) {
            if let Some(unit) = self.roster.get_mut(*unit_id) {
                unit.position = Some(hex);
                placed += 1;
            }
        }
        if placed < pending.len() {
            tracing::warn!(
                "Deployment zone full, {} unit(s) left unplaced",
                pending.len() - placed
            );
        }
        Ok(placed)
    }

    /// Zone tiles ordered column by column from the side's edge
    fn zone_tiles(&self, side: Side) -> Vec<Hex> {
        let mut tiles: Vec<Hex> = self
            .board
            .tiles()
            .map(|t| t.coord)
            .filter(|&hex| self.in_deployment_zone(side, hex))
            .collect();
        match side {
            Side::A => tiles.sort_by_key(|h| (h.q, h.r)),
            Side::B => tiles.sort_by_key(|h| (-h.q, h.r)),
        }
        tiles
    }

    /// Finish deployment: mirror the trailing army and open the battle
    pub fn start_battle(&mut self) -> Result<(), IllegalAction> {
        self.ensure_phase(Phase::Deployment)?;
        let leading = self.config.leading_side;

        let remaining = self
            .roster
            .units_of(leading)
            .filter(|u| u.is_alive() && u.position.is_none())
            .count();
        if remaining > 0 {
            return Err(IllegalAction::DeploymentIncomplete { remaining });
        }

        self.mirror_deployment(leading);

        self.turn.phase = Phase::Battle;
        self.turn.active_side = leading;
        self.turn.round = 1;
        self.turn.clear_actions();
        tracing::info!("Battle started, {:?} moves first", leading);

        self.check_victory();
        Ok(())
    }

    /// Place trailing unit i at the column mirror of leading unit i.
    ///
    /// Pairing is by roster order only. Unmatched units, and units whose
    /// mirrored tile is unusable, stay off the board.
    fn mirror_deployment(&mut self, leading: Side) {
        let leader_positions: Vec<Option<Hex>> = self
            .roster
            .units_of(leading)
            .map(|u| u.position)
            .collect();
        let trailing: Vec<UnitId> = self
            .roster
            .units_of(leading.opponent())
            .map(|u| u.id)
            .collect();

        if leader_positions.len() != trailing.len() {
            tracing::warn!(
                "Mirroring {} leading units onto {} trailing units; unmatched units are skipped",
                leader_positions.len(),
                trailing.len()
            );
        }

        for (i, unit_id) in trailing.into_iter().enumerate() {
            if let Some(unit) = self.roster.get_mut(unit_id) {
                unit.position = None;
            }
            let Some(Some(source)) = leader_positions.get(i).copied() else {
                continue;
            };

            let target = Hex::new(self.board.mirror_q(source.q), source.r);
            if !self.board.is_passable(target) || self.roster.unit_at(target).is_some() {
                tracing::warn!("Mirrored tile {} unusable, {} stays in reserve", target, unit_id);
                continue;
            }
            if let Some(unit) = self.roster.get_mut(unit_id) {
                unit.position = Some(target);
            }
        }
    }

    // ========================================================================
    // BATTLE ACTIONS
    // ========================================================================

    /// Apply one battle action on behalf of `request.acting_side`
    pub fn apply(&mut self, request: ActionRequest) -> Result<ActionOutcome, IllegalAction> {
        self.ensure_phase(Phase::Battle)?;
        if request.acting_side != self.turn.active_side {
            return Err(IllegalAction::NotYourTurn(request.acting_side));
        }

        let outcome = match request.action {
            Action::Move { unit_id, to } => {
                let path = self.move_unit(unit_id, to)?;
                ActionOutcome::Moved { unit: unit_id, path }
            }
            Action::Attack { unit_id, target_id } => {
                ActionOutcome::Attacked(self.attack(unit_id, target_id)?)
            }
            Action::EndTurn => {
                self.end_turn();
                return Ok(ActionOutcome::TurnEnded {
                    active_side: self.turn.active_side,
                    round: self.turn.round,
                });
            }
        };

        self.check_victory();
        if !self.is_finished() && self.turn_exhausted() {
            tracing::debug!("{:?} has no actions left, ending turn", self.turn.active_side);
            self.end_turn();
        }
        Ok(outcome)
    }

    fn move_unit(&mut self, unit_id: UnitId, to: Hex) -> Result<PathResult, IllegalAction> {
        let unit = self.owned_unit(self.turn.active_side, unit_id)?;
        if !unit.is_alive() {
            return Err(IllegalAction::UnitDestroyed(unit_id));
        }
        let from = unit.position.ok_or(IllegalAction::NotDeployed(unit_id))?;
        if self.turn.moved.contains(&unit_id) {
            return Err(IllegalAction::AlreadyMoved(unit_id));
        }
        if self.config.turn_policy == TurnPolicy::SingleAction && self.turn.acted.contains(&unit_id) {
            return Err(IllegalAction::AlreadyActed(unit_id));
        }

        if !self.board.is_passable(to) {
            return Err(IllegalAction::Impassable(to));
        }
        let blocked = self.roster.occupied_tiles(Some(unit_id));
        if blocked.contains(&to) {
            return Err(IllegalAction::TileOccupied(to));
        }

        let path = find_path(&self.board, from, to, &blocked, unit.template().speed)
            .filter(|p| !p.is_trivial())
            .ok_or(IllegalAction::Unreachable(to))?;

        let destination = path.destination().ok_or(IllegalAction::Unreachable(to))?;
        if let Some(unit) = self.roster.get_mut(unit_id) {
            unit.position = Some(destination);
        }
        self.turn.moved.insert(unit_id);
        tracing::debug!("{} moved {} -> {} (cost {})", unit_id, from, destination, path.cost);
        Ok(path)
    }

    fn attack(&mut self, unit_id: UnitId, target_id: UnitId) -> Result<AttackOutcome, IllegalAction> {
        let attacker = self.owned_unit(self.turn.active_side, unit_id)?;
        if self.turn.acted.contains(&unit_id) {
            return Err(IllegalAction::AlreadyActed(unit_id));
        }
        if self.config.turn_policy == TurnPolicy::SingleAction && self.turn.moved.contains(&unit_id) {
            return Err(IllegalAction::AlreadyMoved(unit_id));
        }
        let defender = self
            .roster
            .get(target_id)
            .ok_or(IllegalAction::UnknownUnit(target_id))?;

        let outcome = resolve_attack(attacker, defender)?;

        if let Some(defender) = self.roster.get_mut(target_id) {
            defender.current_hp -= outcome.damage;
        }
        self.turn.acted.insert(unit_id);
        tracing::debug!(
            "{} attacked {} ({:?}) for {}{}",
            unit_id,
            target_id,
            outcome.kind,
            outcome.damage,
            if outcome.defender_destroyed { ", destroyed" } else { "" }
        );
        Ok(outcome)
    }

    fn end_turn(&mut self) {
        self.turn.clear_actions();
        self.turn.active_side = self.turn.active_side.opponent();
        if self.turn.active_side == self.config.leading_side {
            self.turn.round += 1;
        }
        tracing::debug!(
            "Turn passes to {:?} (round {})",
            self.turn.active_side,
            self.turn.round
        );
        self.check_victory();
    }

    /// Single-action turns end once every living unit has acted
    fn turn_exhausted(&self) -> bool {
        self.config.turn_policy == TurnPolicy::SingleAction
            && self
                .roster
                .active_units(self.turn.active_side)
                .all(|u| self.has_spent_turn(u.id))
    }

    /// End the battle now and score it by damage dealt
    pub fn request_finish(&mut self) -> Result<&GameResult, IllegalAction> {
        self.ensure_phase(Phase::Battle)?;
        let result = victory::resolve_by_points(&self.roster, "battle ended on request");
        self.finish(result);
        Ok(&self.result)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Can this unit still move this turn?
    pub fn can_move(&self, unit_id: UnitId) -> bool {
        self.turn.phase == Phase::Battle
            && self.unit_ready(unit_id)
            && !self.turn.moved.contains(&unit_id)
            && !(self.config.turn_policy == TurnPolicy::SingleAction
                && self.turn.acted.contains(&unit_id))
    }

    /// Can this unit still attack this turn?
    pub fn can_attack(&self, unit_id: UnitId) -> bool {
        self.turn.phase == Phase::Battle
            && self.unit_ready(unit_id)
            && !self.turn.acted.contains(&unit_id)
            && !(self.config.turn_policy == TurnPolicy::SingleAction
                && self.turn.moved.contains(&unit_id))
    }

    fn unit_ready(&self, unit_id: UnitId) -> bool {
        self.roster
            .get(unit_id)
            .is_some_and(|u| u.owner == self.turn.active_side && u.is_active())
    }

    fn has_spent_turn(&self, unit_id: UnitId) -> bool {
        self.turn.acted.contains(&unit_id) || self.turn.moved.contains(&unit_id)
    }

    /// The path a move order would take, without applying it
    pub fn preview_move(&self, unit_id: UnitId, to: Hex) -> Option<PathResult> {
        let unit = self.roster.get(unit_id).filter(|u| u.is_alive())?;
        let from = unit.position?;
        let blocked = self.roster.occupied_tiles(Some(unit_id));
        find_path(&self.board, from, to, &blocked, unit.template().speed)
    }

    /// Every tile the unit could end its move on, with the cost to get there
    pub fn reachable(&self, unit_id: UnitId) -> FxHashMap<Hex, u32> {
        let Some(unit) = self.roster.get(unit_id).filter(|u| u.is_alive()) else {
            return FxHashMap::default();
        };
        let Some(from) = unit.position else {
            return FxHashMap::default();
        };
        let blocked = self.roster.occupied_tiles(Some(unit_id));
        reachable_tiles(&self.board, from, &blocked, unit.template().speed)
    }

    /// Enemy units this unit could attack from where it stands
    pub fn attack_targets(&self, unit_id: UnitId) -> Vec<UnitId> {
        let Some(attacker) = self.roster.get(unit_id) else {
            return Vec::new();
        };
        self.roster
            .active_units(attacker.owner.opponent())
            .filter(|defender| resolve_attack(attacker, defender).is_ok())
            .map(|defender| defender.id)
            .collect()
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn ensure_phase(&self, expected: Phase) -> Result<(), IllegalAction> {
        match self.turn.phase {
            Phase::Finished => Err(IllegalAction::GameFinished),
            actual if actual != expected => Err(IllegalAction::WrongPhase { expected, actual }),
            _ => Ok(()),
        }
    }

    fn owned_unit(&self, side: Side, unit_id: UnitId) -> Result<&UnitInstance, IllegalAction> {
        let unit = self
            .roster
            .get(unit_id)
            .ok_or(IllegalAction::UnknownUnit(unit_id))?;
        if unit.owner != side {
            return Err(IllegalAction::NotOwner { unit: unit_id, side });
        }
        Ok(unit)
    }

    fn check_victory(&mut self) {
        if self.result.is_decided() || self.turn.phase != Phase::Battle {
            return;
        }
        if let Some(result) = victory::evaluate(self.config.victory, &self.roster, self.turn.round) {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: GameResult) {
        tracing::info!("Game over: {:?} ({})", result.winner, result.reason);
        self.result = result;
        self.turn.phase = Phase::Finished;
        self.turn.clear_actions();
    }
}

// ============================================================================
// TESTS
// ============================================================================
