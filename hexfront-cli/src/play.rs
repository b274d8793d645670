//! Play command - run one AI-vs-AI battle
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_scenario(), play_single_game(), record_stats(), report_game()
//! - Level 3: (battle loop in selfplay)
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use hexfront_core::{Side, StatsRecorder, Winner};

use crate::selfplay::{load_scenario, play_single_game, resolve_seed, GameRecord};
use crate::stats::JsonlRecorder;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Scenario JSON file (built-in skirmish when omitted)
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Rounds before the battle is scored by damage dealt
    #[arg(long, default_value = "100")]
    pub max_rounds: u32,

    /// Append per-side results to this JSON-lines file
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Output the record as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Load the scenario
/// 2. Play the battle
/// 3. Record stats if asked
/// 4. Report the result
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let scenario = load_scenario(args.scenario.as_deref())?;
    let seed = resolve_seed(seed);

    tracing::info!("Playing {:?} (seed {})", scenario.name, seed);

    let record = play_single_game(&scenario, 1, seed, args.max_rounds)?;

    if let Some(path) = &args.stats {
        let mut recorder = JsonlRecorder::open(path)?;
        record_stats(&record, &mut recorder)?;
        tracing::info!("Stats appended to {}", path.display());
    }

    report_game(&record, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Hand both sides' reports to the recorder
pub fn record_stats(record: &GameRecord, recorder: &mut dyn StatsRecorder) -> Result<()> {
    for report in &record.reports {
        recorder.record_result(report)?;
    }
    Ok(())
}

fn report_game(record: &GameRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_text_record(record);
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

pub fn winner_label(winner: Winner) -> &'static str {
    match winner {
        Winner::Side(Side::A) => "Side A",
        Winner::Side(Side::B) => "Side B",
        Winner::Draw => "Draw",
        Winner::Ongoing => "Unfinished",
    }
}

fn print_text_record(record: &GameRecord) {
    println!("\n=== Battle Result ===");
    println!("Winner:  {}", winner_label(record.winner));
    println!("Reason:  {}", record.reason);
    println!("Rounds:  {}{}", record.rounds, if record.capped { " (capped)" } else { "" });
    println!("Seed:    {}", record.seed);
    for report in &record.reports {
        let survivors = report
            .units
            .iter()
            .filter(|u| u.owner == report.side && u.survived)
            .count();
        println!(
            "Side {:?}: {:?}, dealt {} damage, {} units standing",
            report.side, report.outcome, report.damage_dealt, survivors
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hexfront_core::{Scenario, StatsReport};

    #[derive(Default)]
    struct Collect(Vec<StatsReport>);

    impl StatsRecorder for Collect {
        fn record_result(&mut self, report: &StatsReport) -> Result<()> {
            self.0.push(report.clone());
            Ok(())
        }
    }

    #[test]
    fn test_record_stats_reports_both_sides() {
        let record = play_single_game(&Scenario::default(), 1, 5, 100).unwrap();
        let mut sink = Collect::default();

        record_stats(&record, &mut sink).unwrap();

        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0].side, Side::A);
        assert_eq!(sink.0[1].side, Side::B);
    }

    #[test]
    fn test_winner_labels() {
        assert_eq!(winner_label(Winner::Side(Side::B)), "Side B");
        assert_eq!(winner_label(Winner::Draw), "Draw");
    }
}
