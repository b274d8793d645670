//! Match command - play a series of AI-vs-AI battles on one scenario
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), record_all(), report_results()
//! - Level 3: compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use hexfront_core::{Scenario, Side, Winner};

use crate::play::{record_stats, winner_label};
use crate::selfplay::{load_scenario, play_single_game, resolve_seed, GameRecord};
use crate::stats::JsonlRecorder;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Scenario JSON file (built-in skirmish when omitted)
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Rounds before a battle is scored by damage dealt
    #[arg(long, default_value = "100")]
    pub max_rounds: u32,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Append per-side results to this JSON-lines file
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Aggregated match results
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    draws: usize,
    capped: usize,
    avg_rounds: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Load the scenario
/// 2. Play the match (multiple games)
/// 3. Record stats if asked
/// 4. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let scenario = load_scenario(args.scenario.as_deref())?;
    let base_seed = resolve_seed(seed);

    tracing::info!(
        "Starting match on {:?} ({} games, base seed {})",
        scenario.name,
        args.games,
        base_seed
    );

    let results = play_match(&scenario, &args, base_seed)?;

    if let Some(path) = &args.stats {
        record_all(&results, path)?;
    }

    report_results(&results, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games; game i uses seed `base_seed + i`
fn play_match(scenario: &Scenario, args: &MatchArgs, base_seed: u64) -> Result<MatchResults> {
    let progress = create_progress_bar(args.games as u64, args.json)?;

    let play = |i: usize| -> Result<GameRecord> {
        let record = play_single_game(
            scenario,
            i + 1,
            base_seed.wrapping_add(i as u64),
            args.max_rounds,
        )?;
        tracing::debug!(
            "Game {}: {} ({} rounds)",
            record.game_number,
            winner_label(record.winner),
            record.rounds
        );
        progress.inc(1);
        Ok(record)
    };

    let games = if args.parallel {
        (0..args.games)
            .into_par_iter()
            .map(play)
            .collect::<Result<Vec<_>>>()?
    } else {
        (0..args.games).map(play).collect::<Result<Vec<_>>>()?
    };
    progress.finish_and_clear();

    Ok(compute_match_statistics(games))
}

fn record_all(results: &MatchResults, path: &Path) -> Result<()> {
    let mut recorder = JsonlRecorder::open(path)?;
    for record in &results.games {
        record_stats(record, &mut recorder)?;
    }
    tracing::info!("Stats for {} games appended to {}", results.games.len(), path.display());
    Ok(())
}

fn report_results(results: &MatchResults, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let wins_for = |side: Side| {
        games
            .iter()
            .filter(|g| g.winner == Winner::Side(side))
            .count()
    };
    let a_wins = wins_for(Side::A);
    let b_wins = wins_for(Side::B);
    let draws = games.iter().filter(|g| g.winner == Winner::Draw).count();
    let capped = games.iter().filter(|g| g.capped).count();

    let total_rounds: u32 = games.iter().map(|g| g.rounds).sum();
    let avg_rounds = if games.is_empty() {
        0.0
    } else {
        total_rounds as f32 / games.len() as f32
    };

    MatchResults {
        games,
        a_wins,
        b_wins,
        draws,
        capped,
        avg_rounds,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Progress bar on stderr; hidden when stdout carries JSON
fn create_progress_bar(total: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} games")?,
    );
    Ok(progress)
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!(
        "Side A wins: {} ({:.1}%)",
        results.a_wins,
        percent(results.a_wins, total)
    );
    println!(
        "Side B wins: {} ({:.1}%)",
        results.b_wins,
        percent(results.b_wins, total)
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!("Capped:      {}", results.capped);
    println!("Avg rounds:  {:.1}", results.avg_rounds);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(games: usize, parallel: bool) -> MatchArgs {
        MatchArgs {
            scenario: None,
            games,
            max_rounds: 100,
            parallel,
            stats: None,
            json: true,
        }
    }

    fn record(game_number: usize, winner: Winner, rounds: u32) -> GameRecord {
        GameRecord {
            game_number,
            seed: game_number as u64,
            winner,
            reason: String::new(),
            rounds,
            capped: false,
            reports: Vec::new(),
        }
    }

    #[test]
    fn test_compute_statistics() {
        let results = compute_match_statistics(vec![
            record(1, Winner::Side(Side::A), 4),
            record(2, Winner::Side(Side::B), 6),
            record(3, Winner::Draw, 8),
            record(4, Winner::Side(Side::A), 2),
        ]);

        assert_eq!(results.a_wins, 2);
        assert_eq!(results.b_wins, 1);
        assert_eq!(results.draws, 1);
        assert!((results.avg_rounds - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_match() {
        let results = compute_match_statistics(Vec::new());
        assert_eq!(results.avg_rounds, 0.0);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scenario = Scenario::default();
        let sequential = play_match(&scenario, &args(4, false), 10).unwrap();
        let parallel = play_match(&scenario, &args(4, true), 10).unwrap();

        assert_eq!(sequential.games.len(), 4);
        for (s, p) in sequential.games.iter().zip(&parallel.games) {
            assert_eq!(s.game_number, p.game_number);
            assert_eq!(s.winner, p.winner);
            assert_eq!(s.rounds, p.rounds);
        }
    }

    #[test]
    fn test_record_all_writes_two_lines_per_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.jsonl");
        let results = play_match(&Scenario::default(), &args(2, false), 1).unwrap();

        record_all(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
