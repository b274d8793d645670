//! Scenario files: board, armies and rules for one game

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::BoardError;
use crate::game::Game;
use crate::units::{UnitCatalog, UnitRoster, UnitTemplate};

/// Everything needed to set up a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    /// ASCII map, one string per row (see `Board::parse`)
    pub map: Vec<String>,
    /// Custom unit types; the standard catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<UnitTemplate>>,
    pub army_a: Vec<String>,
    pub army_b: Vec<String>,
    #[serde(default)]
    pub config: GameConfig,
}

impl Scenario {
    pub fn board(&self) -> Result<Board, BoardError> {
        Board::parse(&self.map.join("\n"))
    }

    pub fn catalog(&self) -> UnitCatalog {
        match &self.catalog {
            Some(templates) => UnitCatalog::new(templates.iter().cloned()),
            None => UnitCatalog::standard(),
        }
    }

    /// A fresh game in deployment
    pub fn to_game(&self) -> Result<Game, BoardError> {
        let board = self.board()?;
        let roster = UnitRoster::with_armies(self.catalog(), &self.army_a, &self.army_b);
        Ok(Game::new(Arc::new(board), roster, self.config.clone()))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        scenario
            .board()
            .with_context(|| format!("scenario {} has a bad map", scenario.name))?;
        Ok(scenario)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing scenario {}", path.display()))?;
        Ok(())
    }
}

impl Default for Scenario {
    /// 9x7 skirmish across a river, five units a side
    fn default() -> Self {
        let map = [
            ".F.....F.",
            "...H.H...",
            "..S.~.S..",
            "====B====",
            "..S.~.S..",
            "...H.H...",
            ".F.....F.",
        ];
        let army = ["infantry", "infantry", "spearmen", "archers", "light_cavalry"];
        Self {
            name: "skirmish".to_string(),
            map: map.iter().map(|row| row.to_string()).collect(),
            catalog: None,
            army_a: army.iter().map(|id| id.to_string()).collect(),
            army_b: army.iter().map(|id| id.to_string()).collect(),
            config: GameConfig::default(),
        }
    }
}
