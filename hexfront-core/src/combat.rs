//! Attack legality and damage
//!
//! Turn bookkeeping (whose turn, who already attacked) belongs to the game;
//! this module only looks at the two units involved.

use serde::{Deserialize, Serialize};

use crate::error::IllegalAction;
use crate::units::{UnitId, UnitInstance};

/// Which attack stat was used
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Melee,
    Ranged,
}

/// Result of a resolved attack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub kind: AttackKind,
    pub damage: u32,
    pub defender_destroyed: bool,
}

/// Work out an attack between two units without applying it.
///
/// Ranged attack is used beyond distance 1 when the attacker has one,
/// melee otherwise. Damage never exceeds the defender's remaining HP.
pub fn resolve_attack(
    attacker: &UnitInstance,
    defender: &UnitInstance,
) -> Result<AttackOutcome, IllegalAction> {
    if !attacker.is_alive() {
        return Err(IllegalAction::UnitDestroyed(attacker.id));
    }
    if !defender.is_alive() {
        return Err(IllegalAction::UnitDestroyed(defender.id));
    }
    if attacker.owner == defender.owner {
        return Err(IllegalAction::FriendlyTarget);
    }

    let from = attacker
        .position
        .ok_or(IllegalAction::NotDeployed(attacker.id))?;
    let to = defender
        .position
        .ok_or(IllegalAction::NotDeployed(defender.id))?;

    let stats = attacker.template();
    let distance = from.manhattan_distance(to);
    if distance > stats.attack_range {
        return Err(IllegalAction::OutOfRange {
            distance,
            range: stats.attack_range,
        });
    }

    let (kind, attack) = if distance > 1 && stats.ranged_attack > 0 {
        (AttackKind::Ranged, stats.ranged_attack)
    } else {
        (AttackKind::Melee, stats.melee_attack)
    };
    if attack == 0 {
        return Err(IllegalAction::NoDamageAtRange);
    }

    let damage = attack.min(defender.current_hp);
    Ok(AttackOutcome {
        attacker: attacker.id,
        defender: defender.id,
        kind,
        damage,
        defender_destroyed: damage == defender.current_hp,
    })
}
