//! Computer-controlled turns
//!
//! An `AiResolver` plays a whole turn for one side. `GreedyAi` is the
//! reference resolver: it fights whatever it can reach and walks toward the
//! nearest enemy otherwise.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::action::{Action, ActionOutcome, ActionRequest};
use crate::board::Hex;
use crate::error::IllegalAction;
use crate::game::{Game, Phase};
use crate::units::{Side, UnitId};

// ============================================================================
// RESOLVER TRAIT
// ============================================================================

/// Decides and applies an entire turn for one side
pub trait AiResolver {
    /// Place the side's units during deployment
    fn deploy(&mut self, game: &mut Game, side: Side) -> Result<(), IllegalAction>;

    /// Play `side`'s turn to completion, ending it unless the game ends first
    fn play_turn(&mut self, game: &mut Game, side: Side) -> Result<Vec<ActionOutcome>, IllegalAction>;

    /// Play the turn on a copy and keep it only if every step succeeded.
    /// On error `game` is exactly as it was.
    fn commit_turn(
        &mut self,
        game: &mut Game,
        side: Side,
    ) -> Result<Vec<ActionOutcome>, IllegalAction> {
        let mut next = game.clone();
        let outcomes = self.play_turn(&mut next, side)?;
        *game = next;
        Ok(outcomes)
    }
}

// ============================================================================
// GREEDY AI
// ============================================================================

/// Attack the weakest enemy in range, else close on the nearest one.
/// Ties are broken by a seeded RNG so games are reproducible.
pub struct GreedyAi {
    rng: ChaCha8Rng,
}

impl GreedyAi {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pick uniformly among the candidates sharing the lowest key
    fn pick_min<T: Copy, K: Ord>(&mut self, candidates: &[T], key: impl Fn(&T) -> K) -> Option<T> {
        let best = candidates.iter().map(&key).min()?;
        let tied: Vec<T> = candidates
            .iter()
            .filter(|&c| key(c) == best)
            .copied()
            .collect();
        tied.choose(&mut self.rng).copied()
    }

    fn weakest_target(&mut self, game: &Game, unit_id: UnitId) -> Option<UnitId> {
        let mut targets = game.attack_targets(unit_id);
        targets.sort();
        self.pick_min(&targets, |id| {
            game.unit(*id).map(|u| u.current_hp).unwrap_or(u32::MAX)
        })
    }

    /// Reachable tile that best closes on the nearest enemy, if any improves
    /// on standing still
    fn advance_tile(&mut self, game: &Game, unit_id: UnitId) -> Option<Hex> {
        let unit = game.unit(unit_id)?;
        let from = unit.position?;
        let range = unit.template().attack_range;

        let mut enemies: Vec<Hex> = game
            .roster()
            .active_units(unit.owner.opponent())
            .filter_map(|u| u.position)
            .collect();
        enemies.sort();
        let goal = self.pick_min(&enemies, |hex| from.manhattan_distance(*hex))?;

        // Distance still to cover before the goal is within attack range
        let shortfall = |hex: Hex| hex.manhattan_distance(goal).saturating_sub(range);

        let mut options: Vec<(Hex, u32)> = game.reachable(unit_id).into_iter().collect();
        options.sort();
        let (tile, _) = self.pick_min(&options, |&(hex, cost)| (shortfall(hex), cost))?;

        (shortfall(tile) < shortfall(from)).then_some(tile)
    }

    fn still_our_turn(game: &Game, side: Side) -> bool {
        game.phase() == Phase::Battle && game.active_side() == side
    }
}

impl Default for GreedyAi {
    fn default() -> Self {
        Self::new()
    }
}

impl AiResolver for GreedyAi {
    fn deploy(&mut self, game: &mut Game, side: Side) -> Result<(), IllegalAction> {
        game.auto_deploy(side)?;
        Ok(())
    }

    fn play_turn(&mut self, game: &mut Game, side: Side) -> Result<Vec<ActionOutcome>, IllegalAction> {
        if game.is_finished() {
            return Err(IllegalAction::GameFinished);
        }
        if game.active_side() != side {
            return Err(IllegalAction::NotYourTurn(side));
        }

        let units: Vec<UnitId> = game.roster().active_units(side).map(|u| u.id).collect();
        let mut outcomes = Vec::new();

        for unit_id in units {
            if !Self::still_our_turn(game, side) {
                return Ok(outcomes);
            }

            if game.can_attack(unit_id) {
                if let Some(target_id) = self.weakest_target(game, unit_id) {
                    let action = Action::Attack { unit_id, target_id };
                    outcomes.push(game.apply(ActionRequest::new(side, action))?);
                    continue;
                }
            }

            if !game.can_move(unit_id) {
                continue;
            }
            let Some(to) = self.advance_tile(game, unit_id) else {
                continue;
            };
            outcomes.push(game.apply(ActionRequest::new(side, Action::Move { unit_id, to }))?);

            if Self::still_our_turn(game, side) && game.can_attack(unit_id) {
                if let Some(target_id) = self.weakest_target(game, unit_id) {
                    let action = Action::Attack { unit_id, target_id };
                    outcomes.push(game.apply(ActionRequest::new(side, action))?);
                }
            }
        }

        if Self::still_our_turn(game, side) {
            outcomes.push(game.apply(ActionRequest::new(side, Action::EndTurn))?);
        }
        tracing::debug!("AI played {} action(s) for {:?}", outcomes.len(), side);
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::{GameConfig, TurnPolicy};
    use crate::units::{UnitCatalog, UnitRoster};
    use std::sync::Arc;

    fn ai_game(config: GameConfig, army: &[&str]) -> Game {
        let army: Vec<String> = army.iter().map(|s| s.to_string()).collect();
        let roster = UnitRoster::with_armies(UnitCatalog::standard(), &army, &army);
        let mut game = Game::new(Arc::new(Board::rectangular(7, 5)), roster, config);
        GreedyAi::new().deploy(&mut game, Side::A).unwrap();
        game.start_battle().unwrap();
        game
    }

    /// Moves its first unit, then gives up mid-turn
    struct Stumbling;

    impl AiResolver for Stumbling {
        fn deploy(&mut self, game: &mut Game, side: Side) -> Result<(), IllegalAction> {
            game.auto_deploy(side).map(|_| ())
        }

        fn play_turn(&mut self, game: &mut Game, side: Side) -> Result<Vec<ActionOutcome>, IllegalAction> {
            let to = Hex::new(2, 0);
            game.apply(ActionRequest::new(side, Action::Move { unit_id: UnitId(1), to }))?;
            Err(IllegalAction::Unreachable(to))
        }
    }

    #[test]
    fn test_failed_turn_commits_nothing() {
        let mut game = ai_game(GameConfig::default(), &["infantry"]);
        let before = game.unit(UnitId(1)).unwrap().position;

        let err = Stumbling.commit_turn(&mut game, Side::A).unwrap_err();
        assert_eq!(err, IllegalAction::Unreachable(Hex::new(2, 0)));
        assert_eq!(game.unit(UnitId(1)).unwrap().position, before);
        assert!(game.can_move(UnitId(1)));
    }

    #[test]
    fn test_committed_turn_is_kept() {
        let mut game = ai_game(GameConfig::default(), &["infantry"]);

        let outcomes = GreedyAi::new().commit_turn(&mut game, Side::A).unwrap();
        assert!(matches!(outcomes.last(), Some(ActionOutcome::TurnEnded { .. })));
        assert_eq!(game.active_side(), Side::B);
    }

    #[test]
    fn test_ai_advances_and_ends_turn() {
        let mut game = ai_game(GameConfig::default(), &["infantry"]);
        let before = game.unit(UnitId(1)).unwrap().position.unwrap();
        let enemy = game.unit(UnitId(2)).unwrap().position.unwrap();

        let outcomes = GreedyAi::new().play_turn(&mut game, Side::A).unwrap();
        assert!(matches!(outcomes.last(), Some(ActionOutcome::TurnEnded { .. })));
        assert_eq!(game.active_side(), Side::B);

        let after = game.unit(UnitId(1)).unwrap().position.unwrap();
        assert!(after.manhattan_distance(enemy) < before.manhattan_distance(enemy));
    }

    #[test]
    fn test_ai_attacks_weakest_in_range() {
        let mut game = ai_game(GameConfig::default(), &["archers", "infantry", "infantry"]);
        // Put the two B infantry within archer range, one already hurt
        let archer = game.unit(UnitId(1)).unwrap().position.unwrap();
        let near = Hex::new(archer.q + 2, archer.r);
        let far = Hex::new(archer.q + 3, archer.r);
        {
            let roster = game.roster_mut();
            let hurt = roster.get_mut(UnitId(5)).unwrap();
            hurt.position = Some(near);
            hurt.current_hp = 12;
            roster.get_mut(UnitId(6)).unwrap().position = Some(far);
        }

        let outcomes = GreedyAi::with_seed(7).play_turn(&mut game, Side::A).unwrap();
        let first = outcomes.first().unwrap();
        assert!(matches!(first, ActionOutcome::Attacked(a) if a.attacker == UnitId(1) && a.defender == UnitId(5)));
    }

    #[test]
    fn test_ai_rejects_wrong_side() {
        let mut game = ai_game(GameConfig::default(), &["infantry"]);
        assert_eq!(
            GreedyAi::new().play_turn(&mut game, Side::B).unwrap_err(),
            IllegalAction::NotYourTurn(Side::B)
        );
    }

    #[test]
    fn test_ai_single_action_hands_over_turn() {
        let config = GameConfig::default().with_turn_policy(TurnPolicy::SingleAction);
        let mut game = ai_game(config, &["infantry", "light_cavalry"]);
        GreedyAi::new().play_turn(&mut game, Side::A).unwrap();
        assert_eq!(game.active_side(), Side::B);
        assert_eq!(game.round(), 1);
    }

    #[test]
    fn test_ai_self_play_terminates() {
        let mut game = ai_game(GameConfig::default(), &["infantry", "archers", "heavy_cavalry"]);
        let mut ai = GreedyAi::with_seed(3);
        for _ in 0..200 {
            if game.is_finished() {
                break;
            }
            let side = game.active_side();
            ai.play_turn(&mut game, side).unwrap();
        }
        assert!(game.is_finished());
        assert!(game.result().is_decided());
    }
}
