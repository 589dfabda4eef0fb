//! Per-mode performance summary over the decision log.
//!
//! Pure aggregation; rendering (tables, colors) belongs to the CLI.

use serde::Serialize;

use crate::decision_log::DecisionRecord;
use crate::session::Mode;

/// Aggregates for one mode block.
#[derive(Debug, Clone, Serialize)]
pub struct ModeSummary {
    pub mode: Mode,
    pub decisions: usize,
    pub correct: usize,
    /// Percentage of correct decisions
    pub accuracy_pct: f64,
    /// Mean reaction time in seconds
    pub mean_reaction_secs: f64,
    /// Threat present, participant rejected
    pub hits: usize,
    /// Threat present, participant cleared
    pub misses: usize,
    /// No threat, participant rejected
    pub false_alarms: usize,
    /// No threat, participant cleared
    pub correct_clears: usize,
}

/// Whole-session summary across both mode blocks.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub total_decisions: usize,
    pub total_correct: usize,
    /// One entry per mode that has records, protocol order
    pub modes: Vec<ModeSummary>,
}

/// Summarize a decision log.
pub fn summarize(records: &[DecisionRecord]) -> SessionReport {
    let modes = Mode::ALL
        .iter()
        .filter_map(|&mode| {
            let block: Vec<&DecisionRecord> =
                records.iter().filter(|r| r.mode == mode).collect();
            if block.is_empty() {
                return None;
            }
            Some(summarize_mode(mode, &block))
        })
        .collect();

    SessionReport {
        total_decisions: records.len(),
        total_correct: records.iter().filter(|r| r.correct).count(),
        modes,
    }
}

fn summarize_mode(mode: Mode, block: &[&DecisionRecord]) -> ModeSummary {
    let decisions = block.len();
    let correct = block.iter().filter(|r| r.correct).count();
    let total_time: f64 = block.iter().map(|r| r.reaction_time_secs).sum();

    let hits = block
        .iter()
        .filter(|r| r.ground_truth_threat && r.user_rejected)
        .count();
    let misses = block
        .iter()
        .filter(|r| r.ground_truth_threat && !r.user_rejected)
        .count();
    let false_alarms = block
        .iter()
        .filter(|r| !r.ground_truth_threat && r.user_rejected)
        .count();
    let correct_clears = block
        .iter()
        .filter(|r| !r.ground_truth_threat && !r.user_rejected)
        .count();

    ModeSummary {
        mode,
        decisions,
        correct,
        accuracy_pct: correct as f64 / decisions as f64 * 100.0,
        mean_reaction_secs: total_time / decisions as f64,
        hits,
        misses,
        false_alarms,
        correct_clears,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mode: Mode, threat: bool, rejected: bool, time: f64) -> DecisionRecord {
        DecisionRecord {
            round: 1,
            mode,
            ground_truth_threat: threat,
            user_rejected: rejected,
            correct: rejected == threat,
            reaction_time_secs: time,
        }
    }

    #[test]
    fn test_empty_log_has_no_mode_entries() {
        let report = summarize(&[]);
        assert_eq!(report.total_decisions, 0);
        assert!(report.modes.is_empty());
    }

    #[test]
    fn test_single_mode_aggregates() {
        let records = vec![
            record(Mode::Manual, true, true, 1.0),   // hit
            record(Mode::Manual, true, false, 2.0),  // miss
            record(Mode::Manual, false, true, 3.0),  // false alarm
            record(Mode::Manual, false, false, 2.0), // correct clear
        ];
        let report = summarize(&records);
        assert_eq!(report.modes.len(), 1);

        let manual = &report.modes[0];
        assert_eq!(manual.mode, Mode::Manual);
        assert_eq!(manual.decisions, 4);
        assert_eq!(manual.correct, 2);
        assert_eq!(manual.accuracy_pct, 50.0);
        assert_eq!(manual.mean_reaction_secs, 2.0);
        assert_eq!(
            (manual.hits, manual.misses, manual.false_alarms, manual.correct_clears),
            (1, 1, 1, 1)
        );
    }

    #[test]
    fn test_modes_reported_in_protocol_order() {
        let records = vec![
            record(Mode::AiAssist, true, true, 1.0),
            record(Mode::Manual, false, false, 1.0),
        ];
        let report = summarize(&records);
        let order: Vec<Mode> = report.modes.iter().map(|m| m.mode).collect();
        assert_eq!(order, vec![Mode::Manual, Mode::AiAssist]);
        assert_eq!(report.total_correct, 2);
    }
}
