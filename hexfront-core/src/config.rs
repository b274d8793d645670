//! Game configuration

use serde::{Deserialize, Serialize};

use crate::units::Side;
use crate::victory::VictoryConfig;

/// Deployment columns per side unless configured otherwise
pub const DEFAULT_DEPLOYMENT_COLUMNS: u32 = 3;

/// Per-unit action budget within a turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnPolicy {
    /// Each unit may move once and attack once, in either order
    #[default]
    MoveAndAttack,
    /// Legacy rules: one action (move or attack) per unit, and the turn
    /// ends by itself once every living unit has acted
    SingleAction,
}

/// Rules for one game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub victory: VictoryConfig,
    pub turn_policy: TurnPolicy,
    /// Deploys first, moves first; the other side is mirrored from it
    pub leading_side: Side,
    /// Width of each side's deployment zone, counted from its board edge
    pub deployment_columns: u32,
    /// Side whose turns are delegated to an AI resolver, if any
    pub ai_side: Option<Side>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            victory: VictoryConfig::default(),
            turn_policy: TurnPolicy::default(),
            leading_side: Side::A,
            deployment_columns: DEFAULT_DEPLOYMENT_COLUMNS,
            ai_side: Some(Side::B),
        }
    }
}

impl GameConfig {
    pub fn with_victory(mut self, victory: VictoryConfig) -> Self {
        self.victory = victory;
        self
    }

    pub fn with_turn_policy(mut self, turn_policy: TurnPolicy) -> Self {
        self.turn_policy = turn_policy;
        self
    }

    pub fn with_leading_side(mut self, side: Side) -> Self {
        self.leading_side = side;
        self
    }

    pub fn with_ai_side(mut self, side: Option<Side>) -> Self {
        self.ai_side = side;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.turn_policy, TurnPolicy::MoveAndAttack);
        assert_eq!(config.leading_side, Side::A);
        assert_eq!(config.deployment_columns, 3);
        assert_eq!(config.victory, VictoryConfig::Elimination);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"turnPolicy": "singleAction", "aiSide": null}"#).unwrap();
        assert_eq!(config.turn_policy, TurnPolicy::SingleAction);
        assert_eq!(config.ai_side, None);
        assert_eq!(config.deployment_columns, DEFAULT_DEPLOYMENT_COLUMNS);
    }

    #[test]
    fn test_builders() {
        let config = GameConfig::default()
            .with_victory(VictoryConfig::Points)
            .with_leading_side(Side::B)
            .with_ai_side(None);
        assert_eq!(config.victory, VictoryConfig::Points);
        assert_eq!(config.leading_side, Side::B);
        assert!(config.ai_side.is_none());
    }
}
