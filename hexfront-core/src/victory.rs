//! Victory policies and final results

use serde::{Deserialize, Serialize};

use crate::units::{Side, UnitRoster};

/// How the battle is decided, fixed once deployment ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum VictoryConfig {
    /// Ends only on request, scored by damage dealt
    Points,
    /// Last army standing
    #[default]
    Elimination,
    /// Scored by damage dealt once the round limit has passed
    TurnLimit {
        #[serde(rename = "turnLimit")]
        turn_limit: u32,
    },
}

/// Winner of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    Ongoing,
    Side(Side),
    Draw,
}

/// Game result. Once the winner is decided it never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Winner,
    pub reason: String,
}

impl GameResult {
    pub fn ongoing() -> Self {
        Self {
            winner: Winner::Ongoing,
            reason: String::new(),
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner != Winner::Ongoing
    }
}

impl Default for GameResult {
    fn default() -> Self {
        Self::ongoing()
    }
}

/// Check whether the battle has ended on its own.
///
/// Points mode never ends here; it waits for [`resolve_by_points`].
pub fn evaluate(config: VictoryConfig, roster: &UnitRoster, round: u32) -> Option<GameResult> {
    match config {
        VictoryConfig::Points => None,
        VictoryConfig::Elimination => check_elimination(roster),
        VictoryConfig::TurnLimit { turn_limit } => check_elimination(roster).or_else(|| {
            (round > turn_limit)
                .then(|| resolve_by_points(roster, &format!("turn limit {} reached", turn_limit)))
        }),
    }
}

fn check_elimination(roster: &UnitRoster) -> Option<GameResult> {
    // Units left undeployed (unmatched by mirroring) can't fight and don't count
    let alive_a = roster.active_units(Side::A).count();
    let alive_b = roster.active_units(Side::B).count();

    let winner = match (alive_a, alive_b) {
        (0, 0) => Winner::Draw,
        (0, _) => Winner::Side(Side::B),
        (_, 0) => Winner::Side(Side::A),
        _ => return None,
    };

    let reason = match winner {
        Winner::Side(side) => format!(
            "elimination: side {:?} destroyed ({})",
            side.opponent(),
            score_line(roster)
        ),
        _ => format!("elimination: both armies destroyed ({})", score_line(roster)),
    };
    Some(GameResult { winner, reason })
}

/// Decide by cumulative damage dealt; equal scores draw
pub fn resolve_by_points(roster: &UnitRoster, cause: &str) -> GameResult {
    let score_a = roster.damage_dealt_by(Side::A);
    let score_b = roster.damage_dealt_by(Side::B);

    let winner = match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => Winner::Side(Side::A),
        std::cmp::Ordering::Less => Winner::Side(Side::B),
        std::cmp::Ordering::Equal => Winner::Draw,
    };

    GameResult {
        winner,
        reason: format!("{}: {}", cause, score_line(roster)),
    }
}

fn score_line(roster: &UnitRoster) -> String {
    format!(
        "damage dealt A {} - B {}",
        roster.damage_dealt_by(Side::A),
        roster.damage_dealt_by(Side::B)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Hex;
    use crate::units::{UnitCatalog, UnitId};

    #[test]
    fn test_default_mode_is_elimination() {
        assert_eq!(VictoryConfig::default(), VictoryConfig::Elimination);
        let json = serde_json::to_value(VictoryConfig::default()).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "elimination"}));
    }

    /// One deployed infantry (30 HP) per side
    fn roster_with_hp(hp_a: u32, hp_b: u32) -> UnitRoster {
        let mut roster = UnitRoster::new(UnitCatalog::standard());
        let a = roster.add("infantry", Side::A);
        let b = roster.add("infantry", Side::B);
        roster.get_mut(a).unwrap().position = Some(Hex::new(0, 0));
        roster.get_mut(b).unwrap().position = Some(Hex::new(4, 0));
        set_hp(&mut roster, a, hp_a);
        set_hp(&mut roster, b, hp_b);
        roster
    }

    fn set_hp(roster: &mut UnitRoster, id: UnitId, hp: u32) {
        roster.get_mut(id).unwrap().current_hp = hp;
    }

    #[test]
    fn test_undeployed_units_do_not_hold_the_field() {
        let mut roster = roster_with_hp(30, 30);
        let reserve = roster.add("archers", Side::B);
        let b = UnitId(2);
        set_hp(&mut roster, b, 0);
        assert!(roster.get(reserve).unwrap().is_alive());
        let result = evaluate(VictoryConfig::Elimination, &roster, 1).unwrap();
        assert_eq!(result.winner, Winner::Side(Side::A));
    }

    #[test]
    fn test_elimination_last_unit_lost() {
        let roster = roster_with_hp(0, 12);
        let result = evaluate(VictoryConfig::Elimination, &roster, 3).unwrap();
        assert_eq!(result.winner, Winner::Side(Side::B));
        assert!(result.reason.starts_with("elimination"));
    }

    #[test]
    fn test_elimination_mutual_wipe_is_draw() {
        let roster = roster_with_hp(0, 0);
        let result = evaluate(VictoryConfig::Elimination, &roster, 3).unwrap();
        assert_eq!(result.winner, Winner::Draw);
    }

    #[test]
    fn test_elimination_continues_while_both_alive() {
        let roster = roster_with_hp(1, 1);
        assert!(evaluate(VictoryConfig::Elimination, &roster, 99).is_none());
    }

    #[test]
    fn test_points_never_auto_ends() {
        let roster = roster_with_hp(0, 30);
        assert!(evaluate(VictoryConfig::Points, &roster, 500).is_none());
    }

    #[test]
    fn test_points_resolution() {
        // A dealt 30, B dealt 10
        let mut roster = UnitRoster::new(UnitCatalog::standard());
        let a = roster.add("infantry", Side::A);
        let b1 = roster.add("infantry", Side::B);
        let b2 = roster.add("infantry", Side::B);
        set_hp(&mut roster, a, 20); // B dealt 10
        set_hp(&mut roster, b1, 10); // A dealt 20
        set_hp(&mut roster, b2, 20); // A dealt 10 more
        let result = resolve_by_points(&roster, "finished");
        assert_eq!(result.winner, Winner::Side(Side::A));
        assert_eq!(result.reason, "finished: damage dealt A 30 - B 10");
    }

    #[test]
    fn test_points_tie_is_draw() {
        let roster = roster_with_hp(25, 25);
        assert_eq!(resolve_by_points(&roster, "finished").winner, Winner::Draw);
    }

    #[test]
    fn test_turn_limit() {
        let config = VictoryConfig::TurnLimit { turn_limit: 5 };
        let roster = roster_with_hp(30, 22);
        assert!(evaluate(config, &roster, 5).is_none());
        let result = evaluate(config, &roster, 6).unwrap();
        assert_eq!(result.winner, Winner::Side(Side::A));
        assert!(result.reason.starts_with("turn limit 5 reached"));
    }

    #[test]
    fn test_config_serde_shape() {
        let json = serde_json::to_value(VictoryConfig::TurnLimit { turn_limit: 12 }).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "turnLimit", "turnLimit": 12}));
        let parsed: VictoryConfig = serde_json::from_str(r#"{"mode":"points"}"#).unwrap();
        assert_eq!(parsed, VictoryConfig::Points);
    }
}
