//! Decision log - one immutable record per completed trial.
//!
//! Append-only within a session. The log accumulates across both mode
//! blocks so the end-of-session report can compare Manual against
//! AI-assisted performance.

use serde::{Deserialize, Serialize};

use crate::session::Mode;

/// One completed trial-and-decision cycle.
///
/// Records are never mutated after append. `correct` is derived at append
/// time as `user_rejected == ground_truth_threat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Round within its mode block, 1-based
    pub round: u32,
    /// Mode the block was run in
    pub mode: Mode,
    /// Ground truth assigned at trial generation
    pub ground_truth_threat: bool,
    /// The participant's decision (true = reported a threat)
    pub user_rejected: bool,
    /// Whether the decision matched ground truth
    pub correct: bool,
    /// Wall-clock seconds from trial display to decision, clamped at zero
    pub reaction_time_secs: f64,
}

/// Append-only store of decision records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionLog {
    records: Vec<DecisionRecord>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. There is no removal or mutation path.
    pub fn append(&mut self, record: DecisionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records belonging to one mode block, in append order.
    pub fn for_mode(&self, mode: Mode) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter().filter(move |r| r.mode == mode)
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u32, mode: Mode, correct: bool) -> DecisionRecord {
        DecisionRecord {
            round,
            mode,
            ground_truth_threat: true,
            user_rejected: correct,
            correct,
            reaction_time_secs: 0.5,
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut log = DecisionLog::new();
        for i in 1..=5 {
            log.append(record(i, Mode::Manual, true));
        }
        let rounds: Vec<u32> = log.records().iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_for_mode_filters_blocks() {
        let mut log = DecisionLog::new();
        log.append(record(1, Mode::Manual, true));
        log.append(record(1, Mode::AiAssist, false));
        log.append(record(2, Mode::Manual, false));

        assert_eq!(log.for_mode(Mode::Manual).count(), 2);
        assert_eq!(log.for_mode(Mode::AiAssist).count(), 1);
        assert_eq!(log.correct_count(), 1);
    }
}
