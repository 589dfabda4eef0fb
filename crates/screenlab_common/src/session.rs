//! Session state machine for the screening protocol.
//!
//! Phases: Consent -> Menu -> Trial -> Summary, with Summary -> Menu as the
//! only back-edge. Each mode block is a full run of `rounds_per_block`
//! trials; round and score reset per block, history accumulates across
//! blocks for the cross-mode comparison.
//!
//! All session mutable state lives on the owning [`Session`] value. The
//! presentation layer observes it through accessors and drives it through
//! the four transition methods; a transition either fully applies or fully
//! rejects with a typed error.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advisory::{advise, AssistantAdvisory};
use crate::config::StudyConfig;
use crate::decision_log::{DecisionLog, DecisionRecord};
use crate::error::StudyError;
use crate::trial::{generate_trial, Trial};

/// Protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Consent,
    Menu,
    Trial,
    Summary,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Consent => "Consent",
            Phase::Menu => "Menu",
            Phase::Trial => "Trial",
            Phase::Summary => "Summary",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation mode of a trial block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Manual,
    #[serde(rename = "AI_Assist")]
    AiAssist,
}

impl Mode {
    /// Both modes in protocol order.
    pub const ALL: [Mode; 2] = [Mode::Manual, Mode::AiAssist];

    /// The export/display spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Manual => "Manual",
            Mode::AiAssist => "AI_Assist",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Manual" => Ok(Mode::Manual),
            "AI_Assist" => Ok(Mode::AiAssist),
            other => Err(StudyError::Export(format!("unknown mode '{}'", other))),
        }
    }
}

/// The acknowledgements a participant must give before the menu unlocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentFlags {
    /// Confirms being 18 or older
    pub adult: bool,
    /// Confirms voluntary participation
    pub voluntary: bool,
    /// Agrees to anonymous use of the exported data
    pub data_use: bool,
}

impl ConsentFlags {
    /// All acknowledgements given.
    pub fn all() -> Self {
        Self {
            adult: true,
            voluntary: true,
            data_use: true,
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.adult {
            missing.push("age confirmation");
        }
        if !self.voluntary {
            missing.push("voluntary participation");
        }
        if !self.data_use {
            missing.push("data use agreement");
        }
        missing
    }
}

/// One interactive session, exclusively owned by its runner.
///
/// Generic over the random source so tests drive it with a seeded
/// [`rand::rngs::StdRng`] while binaries pass [`rand::thread_rng`].
#[derive(Debug)]
pub struct Session<R: Rng> {
    config: StudyConfig,
    rng: R,
    session_id: Uuid,
    started_at: DateTime<Utc>,
    phase: Phase,
    mode: Mode,
    round: u32,
    score: u32,
    current_trial: Option<Trial>,
    current_advisory: Option<AssistantAdvisory>,
    trial_started_at: Option<DateTime<Utc>>,
    history: DecisionLog,
    completed_modes: Vec<Mode>,
}

impl<R: Rng> Session<R> {
    /// Create a fresh session in the Consent phase.
    ///
    /// The configuration is validated up front so trial generation cannot
    /// hit a catalog error mid-block.
    pub fn new(config: StudyConfig, rng: R) -> Result<Self, StudyError> {
        config.validate()?;
        let session_id = Uuid::new_v4();
        info!(%session_id, "session created");

        Ok(Self {
            config,
            rng,
            session_id,
            started_at: Utc::now(),
            phase: Phase::Consent,
            mode: Mode::Manual,
            round: 0,
            score: 0,
            current_trial: None,
            current_advisory: None,
            trial_started_at: None,
            history: DecisionLog::new(),
            completed_modes: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Completed rounds within the current mode block.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn rounds_per_block(&self) -> u32 {
        self.config.session.rounds_per_block
    }

    /// The trial being displayed, present only in the Trial phase.
    pub fn current_trial(&self) -> Option<&Trial> {
        self.current_trial.as_ref()
    }

    /// The cached advisory for the current trial.
    ///
    /// Generated once at trial entry; re-reading never recomputes it, so a
    /// re-rendered Trial phase always shows the same advice.
    pub fn current_advisory(&self) -> Option<AssistantAdvisory> {
        self.current_advisory
    }

    pub fn history(&self) -> &DecisionLog {
        &self.history
    }

    /// Modes whose block has been completed this session.
    pub fn completed_modes(&self) -> &[Mode] {
        &self.completed_modes
    }

    /// Both mode blocks done - the intended full protocol.
    pub fn protocol_complete(&self) -> bool {
        Mode::ALL.iter().all(|m| self.completed_modes.contains(m))
    }

    /// Consent -> Menu, guarded by all acknowledgements being given.
    ///
    /// On failure the phase stays Consent and the error names the missing
    /// acknowledgements so the presentation layer can re-prompt.
    pub fn accept_consent(&mut self, flags: ConsentFlags) -> Result<(), StudyError> {
        self.expect_phase(Phase::Consent)?;

        let missing = flags.missing();
        if !missing.is_empty() {
            return Err(StudyError::Validation(missing.join(", ")));
        }

        self.phase = Phase::Menu;
        info!(session_id = %self.session_id, "consent accepted");
        Ok(())
    }

    /// Menu -> Trial: begin a mode block.
    ///
    /// Round and score reset to zero; history is NOT cleared, it accumulates
    /// across blocks for the cross-mode comparison. Returns the first trial.
    pub fn start_mode(&mut self, mode: Mode) -> Result<Trial, StudyError> {
        self.expect_phase(Phase::Menu)?;

        self.mode = mode;
        self.round = 0;
        self.score = 0;
        self.phase = Phase::Trial;
        let trial = self.advance_trial()?;
        info!(session_id = %self.session_id, mode = %mode, "mode block started");
        Ok(trial)
    }

    /// Record the participant's decision for the current trial.
    ///
    /// The single point where score, round, and history change together:
    /// either the whole update applies and the session moves to the next
    /// trial (or to Summary at the block boundary), or nothing changes.
    pub fn submit_decision(&mut self, user_rejected: bool) -> Result<DecisionRecord, StudyError> {
        self.expect_phase(Phase::Trial)?;

        let ground_truth = self
            .current_trial
            .as_ref()
            .ok_or_else(|| StudyError::Internal("Trial phase with no current trial".to_string()))?
            .has_threat;
        let started = self.trial_started_at.ok_or_else(|| {
            StudyError::Internal("Trial phase with no start timestamp".to_string())
        })?;

        let correct = user_rejected == ground_truth;

        // Wall-clock delta; a negative value is a clock anomaly, logged and
        // clamped rather than failing the session.
        let elapsed_ms = (Utc::now() - started).num_milliseconds();
        if elapsed_ms < 0 {
            warn!(elapsed_ms, "negative reaction time, clamping to zero");
        }
        let reaction_time_secs = elapsed_ms.max(0) as f64 / 1000.0;

        let record = DecisionRecord {
            round: self.round + 1,
            mode: self.mode,
            ground_truth_threat: ground_truth,
            user_rejected,
            correct,
            reaction_time_secs,
        };

        // Pre-generate the next trial so no fallible step remains once the
        // accounting commits.
        let next = if self.round + 1 < self.config.session.rounds_per_block {
            Some(self.next_bundle()?)
        } else {
            None
        };

        self.round += 1;
        if correct {
            self.score += 10;
        }
        self.history.append(record.clone());
        debug!(
            round = self.round,
            correct, reaction_time_secs, "decision recorded"
        );

        match next {
            Some((trial, advisory)) => self.install_trial(trial, advisory),
            None => {
                self.clear_trial();
                if !self.completed_modes.contains(&self.mode) {
                    self.completed_modes.push(self.mode);
                }
                self.phase = Phase::Summary;
                info!(
                    session_id = %self.session_id,
                    mode = %self.mode,
                    score = self.score,
                    "mode block complete"
                );
            }
        }

        Ok(record)
    }

    /// Summary -> Menu: clear block state, keep history.
    pub fn reset(&mut self) -> Result<(), StudyError> {
        self.expect_phase(Phase::Summary)?;

        self.round = 0;
        self.score = 0;
        self.clear_trial();
        self.phase = Phase::Menu;
        Ok(())
    }

    /// Generate and install the next trial with a fresh cached advisory.
    fn advance_trial(&mut self) -> Result<Trial, StudyError> {
        let (trial, advisory) = self.next_bundle()?;
        self.install_trial(trial.clone(), advisory);
        Ok(trial)
    }

    /// Draw the next trial and its advisory without touching session state.
    fn next_bundle(&mut self) -> Result<(Trial, AssistantAdvisory), StudyError> {
        let trial = generate_trial(
            &mut self.rng,
            &self.config.catalog,
            self.config.session.threat_probability,
            self.config.session.bag_size,
        )?;
        let advisory = advise(
            &mut self.rng,
            trial.has_threat,
            self.config.session.assistant_reliability,
        );
        Ok((trial, advisory))
    }

    fn install_trial(&mut self, trial: Trial, advisory: AssistantAdvisory) {
        self.current_advisory = Some(advisory);
        self.trial_started_at = Some(Utc::now());
        self.current_trial = Some(trial);
    }

    fn clear_trial(&mut self) {
        self.current_trial = None;
        self.current_advisory = None;
        self.trial_started_at = None;
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), StudyError> {
        if self.phase != expected {
            return Err(StudyError::Phase {
                expected: expected.as_str(),
                actual: self.phase.as_str(),
            });
        }
        Ok(())
    }

    /// Backdate or forward-date the current trial's start timestamp.
    #[cfg(test)]
    pub(crate) fn set_trial_started_at(&mut self, at: DateTime<Utc>) {
        self.trial_started_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session<StdRng> {
        Session::new(StudyConfig::default(), StdRng::seed_from_u64(31)).unwrap()
    }

    #[test]
    fn test_new_session_starts_in_consent() {
        let s = session();
        assert_eq!(s.phase(), Phase::Consent);
        assert_eq!(s.round(), 0);
        assert_eq!(s.score(), 0);
        assert!(s.current_trial().is_none());
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_consent_requires_every_flag() {
        let mut s = session();
        let partial = ConsentFlags {
            adult: true,
            voluntary: true,
            data_use: false,
        };
        let err = s.accept_consent(partial).unwrap_err();
        assert!(matches!(err, StudyError::Validation(_)));
        assert_eq!(s.phase(), Phase::Consent);

        s.accept_consent(ConsentFlags::all()).unwrap();
        assert_eq!(s.phase(), Phase::Menu);
    }

    #[test]
    fn test_consent_cannot_be_accepted_twice() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        let err = s.accept_consent(ConsentFlags::all()).unwrap_err();
        assert!(matches!(err, StudyError::Phase { .. }));
    }

    #[test]
    fn test_start_mode_enters_trial_with_cached_advisory() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        let trial = s.start_mode(Mode::AiAssist).unwrap();

        assert_eq!(s.phase(), Phase::Trial);
        assert_eq!(s.mode(), Mode::AiAssist);
        assert_eq!(s.current_trial(), Some(&trial));
        assert!(s.current_advisory().is_some());
    }

    #[test]
    fn test_advisory_is_stable_across_reads() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        s.start_mode(Mode::AiAssist).unwrap();

        // A re-rendered Trial phase reads the cache; the advice never moves.
        let first = s.current_advisory().unwrap();
        for _ in 0..10 {
            assert_eq!(s.current_advisory().unwrap(), first);
        }
    }

    #[test]
    fn test_decision_outside_trial_phase_is_rejected() {
        let mut s = session();
        let err = s.submit_decision(true).unwrap_err();
        assert!(matches!(err, StudyError::Phase { .. }));
    }

    #[test]
    fn test_block_runs_exactly_ten_rounds() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        s.start_mode(Mode::Manual).unwrap();

        for i in 1..=10 {
            let record = s.submit_decision(false).unwrap();
            assert_eq!(record.round, i);
            assert_eq!(s.round(), i);
        }
        assert_eq!(s.phase(), Phase::Summary);
        assert!(s.current_trial().is_none());
        assert!(s.current_advisory().is_none());
        assert_eq!(s.history().len(), 10);
        assert_eq!(s.completed_modes(), &[Mode::Manual]);

        // Eleventh decision has no trial to act on.
        assert!(s.submit_decision(false).is_err());
        assert_eq!(s.history().len(), 10);
    }

    #[test]
    fn test_score_is_ten_per_correct_decision() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        s.start_mode(Mode::Manual).unwrap();

        let mut correct = 0u32;
        while s.phase() == Phase::Trial {
            let reject = s.current_trial().unwrap().has_threat;
            let record = s.submit_decision(reject).unwrap();
            assert!(record.correct);
            correct += 1;
        }
        assert_eq!(s.score(), 10 * correct);
        assert_eq!(s.score(), 100);
    }

    #[test]
    fn test_reset_keeps_history_for_cross_mode_comparison() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();

        s.start_mode(Mode::Manual).unwrap();
        while s.phase() == Phase::Trial {
            s.submit_decision(false).unwrap();
        }
        s.reset().unwrap();
        assert_eq!(s.phase(), Phase::Menu);
        assert_eq!(s.round(), 0);
        assert_eq!(s.score(), 0);
        assert_eq!(s.history().len(), 10);

        s.start_mode(Mode::AiAssist).unwrap();
        while s.phase() == Phase::Trial {
            s.submit_decision(true).unwrap();
        }
        assert_eq!(s.history().len(), 20);
        assert!(s.protocol_complete());
    }

    #[test]
    fn test_reset_outside_summary_is_rejected() {
        let mut s = session();
        assert!(s.reset().is_err());
    }

    #[test]
    fn test_future_start_timestamp_clamps_reaction_time() {
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        s.start_mode(Mode::Manual).unwrap();

        s.set_trial_started_at(Utc::now() + chrono::Duration::seconds(60));
        let record = s.submit_decision(false).unwrap();
        assert_eq!(record.reaction_time_secs, 0.0);
    }

    #[test]
    fn test_manual_mode_still_generates_advisory_but_ui_hides_it() {
        // The cache is filled in both modes; showing it only in AI-assist
        // mode is the presentation layer's call.
        let mut s = session();
        s.accept_consent(ConsentFlags::all()).unwrap();
        s.start_mode(Mode::Manual).unwrap();
        assert!(s.current_advisory().is_some());
    }
}
