//! Click-driven unit selection
//!
//! Turns board clicks into battle actions: clicking a friendly unit selects
//! it, clicking an enemy with a unit selected attacks, and clicking an empty
//! tile with a unit selected moves there.

use crate::action::{Action, ActionOutcome, ActionRequest};
use crate::board::Hex;
use crate::error::IllegalAction;
use crate::game::{Game, Phase};
use crate::pathfinding::PathResult;
use crate::units::{Side, UnitId};

/// What a click did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(UnitId),
    Deselected,
    Moved(ActionOutcome),
    Attacked(ActionOutcome),
    /// Nothing to do for this click
    Ignored,
}

/// Selection state for one player's view of the board
#[derive(Clone, Debug, Default)]
pub struct Selection {
    selected: Option<UnitId>,
    preview: Option<PathResult>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    /// Path shown for the last hovered tile
    pub fn preview(&self) -> Option<&PathResult> {
        self.preview.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.preview = None;
    }

    /// Handle a click on `hex` by `side`.
    ///
    /// A rejected move or attack keeps the selection so the player can try
    /// another target.
    pub fn click(&mut self, game: &mut Game, side: Side, hex: Hex) -> Result<ClickOutcome, IllegalAction> {
        if game.phase() != Phase::Battle {
            self.clear();
            return Ok(ClickOutcome::Ignored);
        }

        // Forget units that died since they were selected
        if let Some(id) = self.selected {
            if !game.unit(id).is_some_and(|u| u.is_active()) {
                self.clear();
            }
        }

        let clicked = game.roster().unit_at(hex).map(|u| (u.id, u.owner));
        match (clicked, self.selected) {
            (Some((id, owner)), selected) if owner == side => {
                self.preview = None;
                if selected == Some(id) {
                    self.selected = None;
                    Ok(ClickOutcome::Deselected)
                } else {
                    self.selected = Some(id);
                    Ok(ClickOutcome::Selected(id))
                }
            }
            (Some((target_id, _)), Some(unit_id)) => {
                let outcome =
                    game.apply(ActionRequest::new(side, Action::Attack { unit_id, target_id }))?;
                self.preview = None;
                Ok(ClickOutcome::Attacked(outcome))
            }
            (None, Some(unit_id)) => {
                let outcome = game.apply(ActionRequest::new(side, Action::Move { unit_id, to: hex }))?;
                self.preview = None;
                Ok(ClickOutcome::Moved(outcome))
            }
            _ => Ok(ClickOutcome::Ignored),
        }
    }

    /// Update the path preview for the tile under the cursor
    pub fn hover(&mut self, game: &Game, hex: Hex) -> Option<&PathResult> {
        self.preview = self
            .selected
            .filter(|&id| game.can_move(id))
            .and_then(|id| game.preview_move(id, hex))
            .filter(|path| !path.is_trivial());
        self.preview.as_ref()
    }
}
