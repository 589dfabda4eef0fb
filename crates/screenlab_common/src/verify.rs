//! Verification harness - batch audit of the assistant simulator.
//!
//! Runs synthetic (ground truth, advisory) draws with no session state and
//! aggregates how often the advisory matched. For large runs the empirical
//! reliability must sit within a tight band of the configured target; the
//! default 10,000-trial run makes the ±2 point tolerance a multi-sigma
//! margin. Progress is reported through a callback so the harness stays
//! UI-agnostic.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::advisory::advise;
use crate::error::StudyError;

/// Callback cadence, in trials.
pub const PROGRESS_INTERVAL: usize = 1_000;

/// Acceptance band around each target rate.
pub const TOLERANCE: f64 = 0.02;

/// Aggregate outcome of one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Synthetic trials run
    pub trials: usize,
    /// Configured assistant reliability
    pub target_reliability: f64,
    /// Configured threat probability
    pub target_threat_rate: f64,
    /// Fraction of trials where the advisory matched ground truth
    pub empirical_reliability: f64,
    /// Fraction of trials with a threat ground truth
    pub empirical_threat_rate: f64,
    /// Both empirical rates within [`TOLERANCE`] of their targets
    pub within_tolerance: bool,
}

/// Run `trial_count` independent synthetic trials.
///
/// `progress(done, total)` fires every [`PROGRESS_INTERVAL`] trials and once
/// at completion.
pub fn run_verification<R, F>(
    rng: &mut R,
    trial_count: usize,
    threat_probability: f64,
    reliability: f64,
    mut progress: F,
) -> Result<VerificationReport, StudyError>
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize),
{
    if trial_count == 0 {
        return Err(StudyError::Configuration(
            "verification needs at least one trial".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&threat_probability) {
        return Err(StudyError::Configuration(format!(
            "threat_probability {} outside [0,1]",
            threat_probability
        )));
    }
    if !(0.0..=1.0).contains(&reliability) {
        return Err(StudyError::Configuration(format!(
            "reliability {} outside [0,1]",
            reliability
        )));
    }

    let mut threats = 0usize;
    let mut advisory_correct = 0usize;

    for i in 0..trial_count {
        let ground_truth = rng.gen_bool(threat_probability);
        if ground_truth {
            threats += 1;
        }

        let advisory = advise(rng, ground_truth, reliability);
        if advisory.predicted_threat == ground_truth {
            advisory_correct += 1;
        }

        let done = i + 1;
        if done % PROGRESS_INTERVAL == 0 || done == trial_count {
            progress(done, trial_count);
        }
    }

    let empirical_reliability = advisory_correct as f64 / trial_count as f64;
    let empirical_threat_rate = threats as f64 / trial_count as f64;
    let within_tolerance = (empirical_reliability - reliability).abs() <= TOLERANCE
        && (empirical_threat_rate - threat_probability).abs() <= TOLERANCE;

    Ok(VerificationReport {
        trials: trial_count,
        target_reliability: reliability,
        target_threat_rate: threat_probability,
        empirical_reliability,
        empirical_threat_rate,
        within_tolerance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_progress_fires_every_thousand_trials() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut calls = Vec::new();
        run_verification(&mut rng, 3_500, 0.40, 0.85, |done, total| {
            calls.push((done, total));
        })
        .unwrap();
        assert_eq!(
            calls,
            vec![(1000, 3500), (2000, 3500), (3000, 3500), (3500, 3500)]
        );
    }

    #[test]
    fn test_perfect_reliability_reports_exactly_one() {
        let mut rng = StdRng::seed_from_u64(42);
        let report = run_verification(&mut rng, 2_000, 0.40, 1.0, |_, _| {}).unwrap();
        assert_eq!(report.empirical_reliability, 1.0);
    }

    #[test]
    fn test_zero_trials_is_configuration_error() {
        let mut rng = StdRng::seed_from_u64(43);
        let err = run_verification(&mut rng, 0, 0.40, 0.85, |_, _| {}).unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
    }

    #[test]
    fn test_bad_rates_are_configuration_errors() {
        let mut rng = StdRng::seed_from_u64(44);
        assert!(run_verification(&mut rng, 100, 1.4, 0.85, |_, _| {}).is_err());
        assert!(run_verification(&mut rng, 100, 0.40, -0.2, |_, _| {}).is_err());
    }
}
