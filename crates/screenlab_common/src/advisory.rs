//! Assistant simulator - the possibly-wrong advisory shown in AI-assist mode.
//!
//! There is no model behind this: the advisory is the ground truth flipped
//! with probability `1 - reliability`. Confidence is cosmetic and carries no
//! information about correctness; the verification harness checks that
//! realized accuracy converges to `reliability` alone.
//!
//! An advisory is generated once per trial entry and cached on the session
//! for the trial's lifetime. Render paths must read the cache, never call
//! [`advise`] again for the same trial.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Displayed confidence range, inclusive.
pub const CONFIDENCE_MIN: u8 = 80;
pub const CONFIDENCE_MAX: u8 = 99;

/// The assistant's prediction for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantAdvisory {
    /// The (possibly wrong) threat prediction
    pub predicted_threat: bool,
    /// Cosmetic confidence, uniform in [80,99]
    pub confidence: u8,
}

/// Produce an advisory for a trial's ground truth.
///
/// `reliability` must be within [0,1]; it is validated where it enters the
/// system (config load, harness arguments).
pub fn advise<R: Rng + ?Sized>(
    rng: &mut R,
    ground_truth: bool,
    reliability: f64,
) -> AssistantAdvisory {
    let correct = rng.gen_bool(reliability);
    let predicted_threat = if correct { ground_truth } else { !ground_truth };
    let confidence = rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX);

    AssistantAdvisory {
        predicted_threat,
        confidence,
    }
}
