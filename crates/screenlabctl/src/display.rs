//! Terminal rendering for each protocol phase.
//!
//! Read-only over the session: everything here observes state and prints.
//! The advisory banner reads the session's cached advisory, it never
//! generates one.

use console::Term;
use owo_colors::OwoColorize;
use rand::Rng;
use screenlab_common::{
    AssistantAdvisory, Mode, ModeSummary, Phase, Session, SessionReport, StudyConfig, Trial,
    VerificationReport,
};

pub fn title_banner() {
    println!();
    println!("{}", "=== Baggage Inspection Task ===".bright_white().bold());
    println!();
}

pub fn consent_sheet() {
    println!("{}", "Participant Information & Consent".bright_cyan().bold());
    println!();
    println!("   You will perform simulated baggage checks in two modes: one");
    println!("   manual, one with an AI assistant of limited reliability. Your");
    println!("   decisions and reaction times are logged to an anonymous CSV");
    println!("   file that you export yourself at the end. No personally");
    println!("   identifying information is collected. You may stop at any");
    println!("   time by quitting the program.");
    println!();
    println!("{}", "   Please acknowledge each statement:".yellow());
    println!();
}

pub fn briefing(config: &StudyConfig) {
    println!();
    println!("{}", "Mission Briefing".bright_cyan().bold());
    println!(
        "   Role: Security Screening Officer | Objective: detect prohibited items."
    );
    println!(
        "   Each block is {} bags. Both speed and accuracy are tracked.",
        config.session.rounds_per_block
    );
    println!();
    let glyphs: Vec<String> = config.catalog.threat.iter().map(|i| i.glyph.clone()).collect();
    println!("   {}  {}", "TARGET THREATS:".red().bold(), glyphs.join("  "));
    println!();
}

pub fn menu() {
    println!("{}", "Select operation".bright_white().bold());
    println!("   {}  Start Manual mode", "[1]".cyan());
    println!("   {}  Start AI-assisted mode", "[2]".cyan());
    println!("   {}  Run system verification", "[3]".cyan());
    println!("   {}  Quit", "[4]".cyan());
    println!();
}

/// Render the current trial. Reads the cached advisory only.
pub fn trial_view<R: Rng>(session: &Session<R>) {
    debug_assert_eq!(session.phase(), Phase::Trial);

    // Full re-render per bag; stale bags must not stay on screen.
    let _ = Term::stdout().clear_screen();

    let bag_number = session.round() + 1;
    println!();
    println!(
        "{}",
        format!("--- Bag {}/{} ---", bag_number, session.rounds_per_block())
            .bright_white()
            .bold()
    );

    if let Some(trial) = session.current_trial() {
        println!();
        println!("   {}", render_bag(trial));
        println!();
    }

    match session.mode() {
        Mode::AiAssist => {
            if let Some(advisory) = session.current_advisory() {
                advisory_banner(advisory);
            }
        }
        Mode::Manual => offline_banner(),
    }
    println!();
}

fn render_bag(trial: &Trial) -> String {
    trial
        .items
        .iter()
        .map(|i| i.glyph.clone())
        .collect::<Vec<_>>()
        .join("  ")
}

fn advisory_banner(advisory: AssistantAdvisory) {
    if advisory.predicted_threat {
        println!(
            "   {}  AI ALERT: Threat detected (confidence {}%)",
            "⚠".red().bold(),
            advisory.confidence
        );
    } else {
        println!(
            "   {}  AI SCAN: Bag clear (confidence {}%)",
            "✔".green().bold(),
            advisory.confidence
        );
    }
}

fn offline_banner() {
    println!(
        "   {}  AI SYSTEM OFFLINE: manual inspection required",
        "●".yellow().bold()
    );
}

pub fn block_summary<R: Rng>(session: &Session<R>) {
    println!();
    println!(
        "{}",
        format!("Block complete. Score: {}", session.score())
            .bright_green()
            .bold()
    );
    println!();
    report_table(&screenlab_common::summarize(session.history().records()));

    if !session.protocol_complete() {
        println!(
            "   {}",
            "One mode block remains - return to the menu to run it.".yellow()
        );
        println!();
    }
}

pub fn report_table(report: &SessionReport) {
    if report.modes.is_empty() {
        println!("   {}", "No decisions recorded yet.".dimmed());
        return;
    }

    println!("{}", "Performance Report".bright_cyan().bold());
    println!(
        "   {:<10} {:>9} {:>9} {:>9} {:>5} {:>7} {:>7} {:>7}",
        "Mode", "Decisions", "Accuracy", "Mean RT", "Hits", "Misses", "FAlarm", "Clears"
    );
    for mode in &report.modes {
        print_mode_row(mode);
    }
    println!(
        "   {:<10} {:>9} {:>8.1}%",
        "Overall",
        report.total_decisions,
        report.total_correct as f64 / report.total_decisions as f64 * 100.0
    );
    println!();
}

fn print_mode_row(summary: &ModeSummary) {
    println!(
        "   {:<10} {:>9} {:>8.1}% {:>8.3}s {:>5} {:>7} {:>7} {:>7}",
        summary.mode.as_str(),
        summary.decisions,
        summary.accuracy_pct,
        summary.mean_reaction_secs,
        summary.hits,
        summary.misses,
        summary.false_alarms,
        summary.correct_clears
    );
}

pub fn verification_metrics(report: &VerificationReport) {
    println!();
    println!("{}", "System Verification Report".bright_cyan().bold());
    println!("   Total trials:          {}", report.trials);
    println!(
        "   Assistant reliability: {:.2}% (target {:.2}%)",
        report.empirical_reliability * 100.0,
        report.target_reliability * 100.0
    );
    println!(
        "   Threat rate:           {:.2}% (target {:.2}%)",
        report.empirical_threat_rate * 100.0,
        report.target_threat_rate * 100.0
    );
    if report.within_tolerance {
        println!("   {}", "Within tolerance.".green().bold());
    } else {
        println!("   {}", "OUTSIDE tolerance band.".red().bold());
    }
    println!();
}
