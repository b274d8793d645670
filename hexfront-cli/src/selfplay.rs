//! Shared AI-vs-AI battle runner for the play and match commands

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use hexfront_core::{AiResolver, Game, GreedyAi, Scenario, Side, StatsReport, Winner};

/// One finished battle
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game_number: usize,
    pub seed: u64,
    pub winner: Winner,
    pub reason: String,
    pub rounds: u32,
    /// True when the round cap cut the battle short
    pub capped: bool,
    pub reports: Vec<StatsReport>,
}

/// Load a scenario file, or the built-in skirmish when none is given
pub fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario: {}", path.display())),
        None => Ok(Scenario::default()),
    }
}

/// Seed from the command line, or a random one
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Deploy, fight, and summarize one battle with a greedy AI on both sides.
///
/// A battle still running after `max_rounds` rounds is ended on request and
/// scored by damage dealt.
pub fn play_single_game(
    scenario: &Scenario,
    game_number: usize,
    seed: u64,
    max_rounds: u32,
) -> Result<GameRecord> {
    let mut game = scenario
        .to_game()
        .with_context(|| format!("scenario {} has a bad map", scenario.name))?;
    let mut ai = GreedyAi::with_seed(seed);

    let leading = game.config().leading_side;
    ai.deploy(&mut game, leading)?;
    game.start_battle()?;

    let capped = fight(&mut game, &mut ai, max_rounds)?;

    Ok(GameRecord {
        game_number,
        seed,
        winner: game.result().winner,
        reason: game.result().reason.clone(),
        rounds: game.round(),
        capped,
        reports: vec![
            StatsReport::from_game(&game, Side::A),
            StatsReport::from_game(&game, Side::B),
        ],
    })
}

/// Alternate AI turns until the game ends; returns whether the cap hit
fn fight(game: &mut Game, ai: &mut impl AiResolver, max_rounds: u32) -> Result<bool> {
    while !game.is_finished() {
        if game.round() > max_rounds {
            tracing::debug!("Round cap {} reached, scoring by points", max_rounds);
            game.request_finish()?;
            return Ok(true);
        }
        let side = game.active_side();
        ai.play_turn(game, side)?;
    }
    Ok(false)
}
